// External crates
use chrono::{Datelike, NaiveDate};
use log::debug;
use polars::prelude::*;

// Internal modules
use crate::constants::{
    EXCHANGE_RATE_COLUMN, FUEL_PRICE_COLUMN, INTEREST_RATE_COLUMN, PERIOD_COLUMN,
    PRICE_INDEX_COLUMN, TARGET_COLUMN,
};
use crate::error::{ForecastError, Result};

/// Month key used to join series: `year * 12 + month0`
pub fn period_of(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

/// First day of the month identified by `period`
pub fn date_of_period(period: i64) -> Result<NaiveDate> {
    let year = period.div_euclid(12) as i32;
    let month = period.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ForecastError::data(format!("Period {} is not a valid month", period)))
}

/// Monthly series of (date, value) pairs with strictly increasing months
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    points: Vec<(NaiveDate, f64)>,
}

impl TimeSeries {
    /// Builds a series, rejecting repeated or out-of-order months
    pub fn new(points: Vec<(NaiveDate, f64)>) -> Result<Self> {
        for pair in points.windows(2) {
            if period_of(pair[1].0) <= period_of(pair[0].0) {
                return Err(ForecastError::data(format!(
                    "Timestamps must be strictly increasing by month ({} follows {})",
                    pair[1].0, pair[0].0
                )));
            }
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|(d, _)| *d).collect()
    }

    /// Two-column frame: the month key and the values under `value_column`
    pub fn to_frame(&self, value_column: &str) -> PolarsResult<DataFrame> {
        let periods: Vec<i64> = self.points.iter().map(|(d, _)| period_of(*d)).collect();
        let values: Vec<f64> = self.points.iter().map(|(_, v)| *v).collect();

        DataFrame::new(vec![
            Series::new(PERIOD_COLUMN.into(), periods).into(),
            Series::new(value_column.into(), values).into(),
        ])
    }
}

/// Macroeconomic indicators joined against every material series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    PriceIndex,
    FuelPrice,
    ExchangeRate,
    InterestRate,
}

impl Indicator {
    pub const ALL: [Indicator; 4] = [
        Indicator::PriceIndex,
        Indicator::FuelPrice,
        Indicator::ExchangeRate,
        Indicator::InterestRate,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            Indicator::PriceIndex => PRICE_INDEX_COLUMN,
            Indicator::FuelPrice => FUEL_PRICE_COLUMN,
            Indicator::ExchangeRate => EXCHANGE_RATE_COLUMN,
            Indicator::InterestRate => INTEREST_RATE_COLUMN,
        }
    }

    pub fn source_file(self) -> &'static str {
        match self {
            Indicator::PriceIndex => "ConsumerPriceIndex.csv",
            Indicator::FuelPrice => "Diesel_0.001%S.csv",
            Indicator::ExchangeRate => "ExchangeRate.csv",
            Indicator::InterestRate => "InterestRate.csv",
        }
    }
}

/// The four indicator series for one request
#[derive(Debug, Clone)]
pub struct MacroIndicators {
    pub price_index: TimeSeries,
    pub fuel_price: TimeSeries,
    pub exchange_rate: TimeSeries,
    pub interest_rate: TimeSeries,
}

impl MacroIndicators {
    pub fn get(&self, indicator: Indicator) -> &TimeSeries {
        match indicator {
            Indicator::PriceIndex => &self.price_index,
            Indicator::FuelPrice => &self.fuel_price,
            Indicator::ExchangeRate => &self.exchange_rate,
            Indicator::InterestRate => &self.interest_rate,
        }
    }
}

/// Calendar-aligned table: one row per month present in every input series
#[derive(Debug, Clone)]
pub struct AlignedTable {
    frame: DataFrame,
}

impl AlignedTable {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn periods(&self) -> Result<Vec<i64>> {
        let periods = self.frame.column(PERIOD_COLUMN)?.i64()?;
        periods
            .into_iter()
            .map(|p| p.ok_or_else(|| ForecastError::data("Aligned table has a missing period")))
            .collect()
    }

    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        self.periods()?.into_iter().map(date_of_period).collect()
    }
}

/// Inner-joins the target series with every indicator on the month key
///
/// # Arguments
///
/// * `target` - Price series of the requested material and region
/// * `indicators` - Indicator series to join against
///
/// # Returns
///
/// Returns an `AlignedTable` sorted by month whose columns are the month key,
/// the target price and one column per indicator. Fails with a data error
/// when no month is shared by all inputs.
pub fn align_series(target: &TimeSeries, indicators: &MacroIndicators) -> Result<AlignedTable> {
    let mut joined = target.to_frame(TARGET_COLUMN)?.lazy();

    for indicator in Indicator::ALL {
        let other = indicators.get(indicator).to_frame(indicator.column_name())?;
        joined = joined.join(
            other.lazy(),
            [col(PERIOD_COLUMN)],
            [col(PERIOD_COLUMN)],
            JoinArgs::new(JoinType::Inner),
        );
    }

    let frame = joined
        .collect()?
        .sort(vec![PERIOD_COLUMN], SortMultipleOptions::default())?;

    if frame.height() == 0 {
        return Err(ForecastError::data(
            "No month is shared by the material series and all indicator series",
        ));
    }

    debug!(
        "Aligned {} target rows against indicators into {} rows",
        target.len(),
        frame.height()
    );

    Ok(AlignedTable { frame })
}
