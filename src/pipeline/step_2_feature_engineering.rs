// External crates
use chrono::{Datelike, NaiveDate};
use ndarray::{Array1, Array2};
use polars::prelude::*;

// Internal modules
use super::step_1_dataset_alignment::{date_of_period, AlignedTable};
use crate::constants::{
    FUEL_PRICE_COLUMN, FUEL_PRICE_DIFF_COLUMN, MONTH_COLUMN, PERIOD_COLUMN, PREDICTOR_COLUMNS,
    PRICE_INDEX_COLUMN, PRICE_INDEX_ROLLING_MEAN_COLUMN, QUARTER_COLUMN, ROLLING_MEAN_WINDOW,
    TARGET_COLUMN,
};
use crate::error::{ForecastError, Result};

/// Aligned table extended with derived columns; every row is complete
#[derive(Debug, Clone)]
pub struct FeatureTable {
    frame: DataFrame,
}

/// Rolling mean over `window` rows; the first `window - 1` entries are null
pub fn rolling_mean(series: &Series, window: usize) -> PolarsResult<Series> {
    if series.len() < window {
        return Err(PolarsError::ComputeError(
            format!(
                "Not enough data points ({}) for rolling window ({})",
                series.len(),
                window
            )
            .into(),
        ));
    }

    series.rolling_mean(RollingOptionsFixedWindow {
        window_size: window,
        min_periods: window,
        center: false,
        weights: None,
        fn_params: None,
    })
}

/// Difference to the previous row; the first entry is null
pub fn first_difference(series: &Series) -> PolarsResult<Series> {
    let previous = series.shift(1);
    series - &previous
}

/// Month-of-year and quarter-of-year for each date
pub fn calendar_columns(dates: &[NaiveDate]) -> (Series, Series) {
    let months: Vec<i64> = dates.iter().map(|d| d.month() as i64).collect();
    let quarters: Vec<i64> = dates.iter().map(|d| d.month0() as i64 / 3 + 1).collect();
    (
        Series::new(MONTH_COLUMN.into(), months),
        Series::new(QUARTER_COLUMN.into(), quarters),
    )
}

/// Derives the engineered columns and drops rows without full lookback
///
/// Adds the 3-month rolling mean of the price index, the first difference of
/// the fuel price, and month/quarter integers. The leading rows whose rolling
/// mean is undefined are removed.
pub fn engineer_features(aligned: &AlignedTable) -> Result<FeatureTable> {
    if aligned.height() < ROLLING_MEAN_WINDOW {
        return Err(ForecastError::data(format!(
            "Need at least {} aligned months to derive features, found {}",
            ROLLING_MEAN_WINDOW,
            aligned.height()
        )));
    }

    let mut frame = aligned.frame().clone();

    let price_index = frame.column(PRICE_INDEX_COLUMN)?.as_materialized_series().clone();
    let fuel_price = frame.column(FUEL_PRICE_COLUMN)?.as_materialized_series().clone();

    let price_index_mean = rolling_mean(&price_index, ROLLING_MEAN_WINDOW)?
        .with_name(PRICE_INDEX_ROLLING_MEAN_COLUMN.into());
    let fuel_price_diff = first_difference(&fuel_price)?.with_name(FUEL_PRICE_DIFF_COLUMN.into());
    let (months, quarters) = calendar_columns(&aligned.dates()?);

    frame.with_column(price_index_mean)?;
    frame.with_column(fuel_price_diff)?;
    frame.with_column(months)?;
    frame.with_column(quarters)?;

    let frame = frame.drop_nulls::<String>(None)?;
    if frame.height() == 0 {
        return Err(ForecastError::data(
            "No rows left after deriving rolling and difference features",
        ));
    }

    Ok(FeatureTable { frame })
}

impl FeatureTable {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        column_values(&self.frame, PERIOD_COLUMN)?
            .into_iter()
            .map(|p| date_of_period(p as i64))
            .collect()
    }

    /// Predictor block as a `rows x PREDICTOR_COLUMNS.len()` matrix
    pub fn predictor_matrix(&self) -> Result<Array2<f64>> {
        let n_rows = self.height();
        let mut matrix = Array2::<f64>::zeros((n_rows, PREDICTOR_COLUMNS.len()));

        for (j, name) in PREDICTOR_COLUMNS.iter().enumerate() {
            let values = column_values(&self.frame, name)?;
            for (i, value) in values.into_iter().enumerate() {
                matrix[[i, j]] = value;
            }
        }

        Ok(matrix)
    }

    pub fn target_vector(&self) -> Result<Array1<f64>> {
        Ok(Array1::from(column_values(&self.frame, TARGET_COLUMN)?))
    }
}

fn column_values(frame: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = frame.column(name)?.cast(&DataType::Float64)?;
    column
        .f64()?
        .into_iter()
        .map(|v| v.ok_or_else(|| ForecastError::data(format!("Column '{}' has missing values", name))))
        .collect()
}
