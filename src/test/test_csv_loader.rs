use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::pipeline::step_1_dataset_alignment::Indicator;
use crate::registry::MaterialRegistry;
use crate::source::{load_inputs, SeriesSource};
use crate::test::fixtures::month;
use crate::util::csv_loader::{parse_month_label, parse_numeric_cell, CsvSeriesSource};

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        &dir.path().join("Item").join("RoundSteelBars.csv"),
        "년/월,서울,인천\n\
         2020년 1월,\"1,250\",\"1,300\"\n\
         2020년 2월,-,\"1,310\"\n\
         2020년 3월,\"1,270\",\"1,320\"\n\
         2020년 4월,\"1,280\",\n",
    );
    for indicator in Indicator::ALL {
        write(
            &dir.path().join("Validation").join(indicator.source_file()),
            "년/월,값\n2020년 1월,\"1,100.5\"\n2020년 2월,101.2\n2020년 3월,-\n",
        );
    }
    dir
}

#[test]
fn test_parse_month_label() {
    assert_eq!(parse_month_label("2020년 3월"), Some(month(2020, 3)));
    assert_eq!(parse_month_label(" 2021년 12월 "), Some(month(2021, 12)));
    assert_eq!(parse_month_label("2022-07"), Some(month(2022, 7)));
    assert_eq!(parse_month_label("2022-07-15"), Some(month(2022, 7)));
    assert_eq!(parse_month_label("2020년 13월"), None);
    assert_eq!(parse_month_label("soon"), None);
}

#[test]
fn test_parse_numeric_cell() {
    assert_eq!(parse_numeric_cell("1,234,567"), Some(1_234_567.0));
    assert_eq!(parse_numeric_cell(" 3.25 "), Some(3.25));
    assert_eq!(parse_numeric_cell("-"), None);
    assert_eq!(parse_numeric_cell(""), None);
    assert_eq!(parse_numeric_cell("n/a"), None);
    assert_eq!(parse_numeric_cell("-4.5"), Some(-4.5));
}

#[test]
fn test_material_series_drops_placeholder_rows() {
    let dir = data_dir();
    let source = CsvSeriesSource::new(dir.path());
    let registry = MaterialRegistry::builtin().unwrap();
    let entry = registry.get("RoundSteelBars").unwrap();

    let seoul = source.material_series(entry, "서울").unwrap();
    assert_eq!(
        seoul.points(),
        &[
            (month(2020, 1), 1250.0),
            (month(2020, 3), 1270.0),
            (month(2020, 4), 1280.0)
        ]
    );

    let incheon = source.material_series(entry, "인천").unwrap();
    assert_eq!(incheon.len(), 3);
}

#[test]
fn test_indicator_series_uses_second_column() {
    let dir = data_dir();
    let source = CsvSeriesSource::new(dir.path());

    let cpi = source.indicator_series(Indicator::PriceIndex).unwrap();
    assert_eq!(cpi.points(), &[(month(2020, 1), 1100.5), (month(2020, 2), 101.2)]);
}

#[test]
fn test_missing_file_is_data_error() {
    let dir = TempDir::new().unwrap();
    let source = CsvSeriesSource::new(dir.path());
    let registry = MaterialRegistry::builtin().unwrap();

    let err = load_inputs(&source, registry.get("MDF").unwrap(), "서울").unwrap_err();
    assert!(matches!(err, crate::error::ForecastError::Data(_)));
    assert!(err.to_string().starts_with("File not found"));
}
