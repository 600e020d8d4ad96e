use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::pipeline::step_1_dataset_alignment::{
    align_series, date_of_period, period_of, MacroIndicators, TimeSeries,
};
use crate::test::fixtures::{month, monthly_series, synthetic_indicators};

#[test]
fn test_period_round_trip() {
    let date = month(2019, 12);
    assert_eq!(date_of_period(period_of(date)).unwrap(), date);
    assert_eq!(period_of(month(2020, 1)) - period_of(date), 1);
}

#[test]
fn test_time_series_rejects_unordered_months() {
    let points = vec![(month(2020, 2), 1.0), (month(2020, 1), 2.0)];
    assert!(TimeSeries::new(points).is_err());

    // Two dates inside the same month are not distinct monthly timestamps
    let same_month = vec![
        (month(2020, 1), 1.0),
        (NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(), 2.0),
    ];
    assert!(TimeSeries::new(same_month).is_err());
}

#[test]
fn test_alignment_keeps_exact_intersection() {
    // Target covers 2015-01..2016-12, indicators start and stop at different months
    let target = monthly_series(month(2015, 1), 24, |i| 500.0 + i as f64);
    let indicators = MacroIndicators {
        price_index: monthly_series(month(2015, 3), 24, |i| 100.0 + i as f64),
        fuel_price: monthly_series(month(2014, 6), 24, |i| 1500.0 + i as f64),
        exchange_rate: monthly_series(month(2015, 1), 20, |i| 1200.0 + i as f64),
        interest_rate: monthly_series(month(2015, 2), 30, |i| 3.0 + i as f64),
    };

    let aligned = align_series(&target, &indicators).unwrap();

    let mut expected: BTreeSet<NaiveDate> = target.dates().into_iter().collect();
    for series in [
        &indicators.price_index,
        &indicators.fuel_price,
        &indicators.exchange_rate,
        &indicators.interest_rate,
    ] {
        let dates: BTreeSet<NaiveDate> = series.dates().into_iter().collect();
        expected = expected.intersection(&dates).cloned().collect();
    }

    let dates = aligned.dates().unwrap();
    assert_eq!(dates.len(), expected.len());
    assert_eq!(dates, expected.into_iter().collect::<Vec<_>>());
    // 2015-03 (price index start) through 2016-05 (fuel price end)
    assert_eq!(dates.first(), Some(&month(2015, 3)));
    assert_eq!(dates.last(), Some(&month(2016, 5)));
}

#[test]
fn test_alignment_has_one_column_per_input() {
    let target = monthly_series(month(2018, 1), 12, |i| 10.0 * i as f64);
    let aligned = align_series(&target, &synthetic_indicators(month(2018, 1), 12)).unwrap();

    assert_eq!(aligned.height(), 12);
    // Month key, target and four indicators
    assert_eq!(aligned.frame().width(), 6);
    assert!(aligned
        .frame()
        .get_columns()
        .iter()
        .all(|c| c.null_count() == 0));
}

#[test]
fn test_alignment_fails_on_empty_intersection() {
    let target = monthly_series(month(2000, 1), 12, |i| i as f64);
    let indicators = synthetic_indicators(month(2010, 1), 12);

    let err = align_series(&target, &indicators).unwrap_err();
    assert!(matches!(err, crate::error::ForecastError::Data(_)));
}
