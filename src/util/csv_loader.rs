// External crates
use chrono::{Datelike, NaiveDate};
use log::{debug, warn};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

// Local modules
use crate::constants::{INDICATOR_DATA_DIR, MATERIAL_DATA_DIR, MISSING_VALUE_TOKEN, SOURCE_DATE_HEADER};
use crate::error::{ForecastError, Result};
use crate::pipeline::step_1_dataset_alignment::{Indicator, TimeSeries};
use crate::registry::MaterialEntry;
use crate::source::SeriesSource;

/// Parses a month label such as `2020년 3월`, or an ISO `2020-03` / `2020-03-01`
pub fn parse_month_label(label: &str) -> Option<NaiveDate> {
    let label = label.trim();

    if let Some((year, rest)) = label.split_once('년') {
        let month = rest.trim().trim_end_matches('월').trim();
        return NaiveDate::from_ymd_opt(year.trim().parse().ok()?, month.parse().ok()?, 1);
    }

    NaiveDate::parse_from_str(label, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", label), "%Y-%m-%d"))
        .ok()
        .and_then(|d| d.with_day0(0))
}

/// Parses a price cell, stripping thousands separators
///
/// Returns `None` for the no-data placeholder, blanks and unparsable text.
pub fn parse_numeric_cell(cell: &str) -> Option<f64> {
    let cleaned = cell.trim().replace(',', "");
    if cleaned.is_empty() || cleaned == MISSING_VALUE_TOKEN {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reads a CSV with every column kept as text
pub fn read_source_frame(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(ForecastError::data(format!("File not found: {}", path.display())));
    }

    let file = File::open(path)?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()?;

    Ok(df)
}

/// Builds a monthly series from a date column and a value column
///
/// Rows with an unreadable month or value are dropped; the rest are sorted by
/// month.
pub fn series_from_columns(df: &DataFrame, date_column: &str, value_column: &str) -> Result<TimeSeries> {
    let dates = df.column(date_column)?.cast(&DataType::String)?;
    let values = df.column(value_column)?.cast(&DataType::String)?;

    let mut points: Vec<(NaiveDate, f64)> = dates
        .str()?
        .into_iter()
        .zip(values.str()?.into_iter())
        .filter_map(|(date, value)| Some((parse_month_label(date?)?, parse_numeric_cell(value?)?)))
        .collect();

    let dropped = df.height() - points.len();
    if dropped > 0 {
        debug!("Dropped {} incomplete rows from column '{}'", dropped, value_column);
    }

    points.sort_by_key(|(date, _)| *date);
    TimeSeries::new(points)
}

/// Series source over a data directory with `Item/` and `Validation/` folders
#[derive(Debug, Clone)]
pub struct CsvSeriesSource {
    root: PathBuf,
}

impl CsvSeriesSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SeriesSource for CsvSeriesSource {
    fn material_series(&self, material: &MaterialEntry, region: &str) -> Result<TimeSeries> {
        let path = self.root.join(MATERIAL_DATA_DIR).join(&material.source);
        let df = read_source_frame(&path)?;
        let series = series_from_columns(&df, SOURCE_DATE_HEADER, region)?;
        if series.is_empty() {
            warn!("No usable {} prices for region {}", material.name, region);
        }
        Ok(series)
    }

    fn indicator_series(&self, indicator: Indicator) -> Result<TimeSeries> {
        let path = self.root.join(INDICATOR_DATA_DIR).join(indicator.source_file());
        let df = read_source_frame(&path)?;

        // Indicator files carry the date and one value column
        let value_column = df
            .get_column_names()
            .get(1)
            .map(|name| name.to_string())
            .ok_or_else(|| {
                ForecastError::data(format!("{} has no value column", path.display()))
            })?;

        series_from_columns(&df, SOURCE_DATE_HEADER, &value_column)
    }
}
