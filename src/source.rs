// Internal modules
use crate::error::Result;
use crate::pipeline::step_1_dataset_alignment::{Indicator, MacroIndicators, TimeSeries};
use crate::pipeline::PipelineInputs;
use crate::registry::MaterialEntry;

/// Supplies already-cleaned monthly series to the pipeline
pub trait SeriesSource {
    /// Price series of `material` in `region`
    fn material_series(&self, material: &MaterialEntry, region: &str) -> Result<TimeSeries>;

    fn indicator_series(&self, indicator: Indicator) -> Result<TimeSeries>;
}

/// Gathers the target series and all four indicators for one request
pub fn load_inputs<S: SeriesSource + ?Sized>(
    source: &S,
    material: &MaterialEntry,
    region: &str,
) -> Result<PipelineInputs> {
    Ok(PipelineInputs {
        target: source.material_series(material, region)?,
        indicators: MacroIndicators {
            price_index: source.indicator_series(Indicator::PriceIndex)?,
            fuel_price: source.indicator_series(Indicator::FuelPrice)?,
            exchange_rate: source.indicator_series(Indicator::ExchangeRate)?,
            interest_rate: source.indicator_series(Indicator::InterestRate)?,
        },
    })
}
