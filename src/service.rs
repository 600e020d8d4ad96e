// External crates
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// Internal modules
use crate::error::{ForecastError, Result};
use crate::pipeline::step_8_forecast::ForecastPath;
use crate::pipeline::{run_pipeline, ForecastConfig};
use crate::registry::{MaterialEntry, MaterialRegistry};
use crate::source::{load_inputs, SeriesSource};

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Body of a forecast request; both fields are required
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastRequest {
    pub material: Option<String>,
    pub region: Option<String>,
}

impl ForecastRequest {
    pub fn new(material: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            material: Some(material.into()),
            region: Some(region.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionEntry {
    pub date: String,
    pub predicted_price: f64,
}

#[derive(Debug, Serialize)]
struct PredictionsBody {
    predictions: Vec<PredictionEntry>,
}

/// Status code plus JSON body, independent of any transport
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: Value,
}

impl ServiceResponse {
    fn ok<T: Serialize>(body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self {
                status: STATUS_OK,
                body,
            },
            Err(e) => Self::server_error(&format!("Failed to encode response: {}", e)),
        }
    }

    fn client_error(message: &str) -> Self {
        Self {
            status: STATUS_BAD_REQUEST,
            body: json!({ "error": message }),
        }
    }

    fn server_error(message: &str) -> Self {
        Self {
            status: STATUS_INTERNAL_ERROR,
            body: json!({ "error": message }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    /// Text of the `error` field, if any
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

impl From<&ForecastError> for ServiceResponse {
    fn from(err: &ForecastError) -> Self {
        if err.is_validation() {
            Self::client_error(&err.to_string())
        } else {
            Self::server_error(&err.to_string())
        }
    }
}

/// Prediction entries with ISO dates, one per forecast month
pub fn prediction_entries(path: &ForecastPath) -> Vec<PredictionEntry> {
    path.points()
        .iter()
        .map(|p| PredictionEntry {
            date: p.date.format("%Y-%m-%d").to_string(),
            predicted_price: p.value,
        })
        .collect()
}

/// The two request-response operations: list materials and forecast
pub struct ForecastService<S: SeriesSource> {
    registry: MaterialRegistry,
    source: S,
    config: ForecastConfig,
}

impl<S: SeriesSource> ForecastService<S> {
    pub fn new(registry: MaterialRegistry, source: S, config: ForecastConfig) -> Self {
        Self {
            registry,
            source,
            config,
        }
    }

    pub fn registry(&self) -> &MaterialRegistry {
        &self.registry
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Registry listing: `{material: [source file, [regions]]}`
    pub fn list_materials(&self) -> ServiceResponse {
        ServiceResponse::ok(&self.registry.listing())
    }

    /// Forecast for a raw JSON request body
    pub fn forecast_json(&self, body: &str) -> ServiceResponse {
        match serde_json::from_str::<ForecastRequest>(body) {
            Ok(request) => self.forecast(&request),
            Err(e) => {
                warn!("Rejected malformed forecast request: {}", e);
                ServiceResponse::client_error(&format!("Invalid request body: {}", e))
            }
        }
    }

    /// Validates the request, then runs the full pipeline
    ///
    /// Validation failures answer 400 before any data is read. Every pipeline
    /// failure answers 500 with the failure's message.
    pub fn forecast(&self, request: &ForecastRequest) -> ServiceResponse {
        let (entry, region) = match self.validate(request) {
            Ok(resolved) => resolved,
            Err(e) => return ServiceResponse::from(&e),
        };

        info!("Forecast requested for {} in {}", entry.name, region);
        match self.run(entry, region) {
            Ok(path) => ServiceResponse::ok(&PredictionsBody {
                predictions: prediction_entries(&path),
            }),
            Err(e) => {
                error!("Forecast for {} in {} failed: {}", entry.name, region, e);
                ServiceResponse::from(&e)
            }
        }
    }

    fn validate<'a>(&'a self, request: &'a ForecastRequest) -> Result<(&'a MaterialEntry, &'a str)> {
        let material = request.material.as_deref().filter(|m| !m.is_empty());
        let region = request.region.as_deref().filter(|r| !r.is_empty());

        match (material, region) {
            (Some(material), Some(region)) => {
                let entry = self.registry.resolve(material, region)?;
                Ok((entry, region))
            }
            _ => Err(ForecastError::validation(
                "Material and region must be provided",
            )),
        }
    }

    fn run(&self, entry: &MaterialEntry, region: &str) -> Result<ForecastPath> {
        let inputs = load_inputs(&self.source, entry, region)?;
        run_pipeline(&inputs, &self.config)
    }
}
