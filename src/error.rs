use polars::error::PolarsError;
use thiserror::Error;

/// Failure kinds of a forecast request
///
/// `Validation` is raised before any data is touched. `Data` and `Compute`
/// come out of the pipeline and are reported identically at the service
/// boundary.
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Data(String),

    #[error("{0}")]
    Compute(String),
}

impl ForecastError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ForecastError::Validation(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        ForecastError::Data(msg.into())
    }

    pub fn compute(msg: impl Into<String>) -> Self {
        ForecastError::Compute(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ForecastError::Validation(_))
    }
}

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::Data(err.to_string())
    }
}

impl From<std::io::Error> for ForecastError {
    fn from(err: std::io::Error) -> Self {
        ForecastError::Data(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
