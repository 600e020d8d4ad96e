// External crates
use anyhow::{bail, Context, Result};
use log::info;
use std::env;
use std::fs;
use std::path::PathBuf;

// Local modules
use material_price_forecast::build_info;
use material_price_forecast::pipeline::ForecastConfig;
use material_price_forecast::registry::MaterialRegistry;
use material_price_forecast::service::{ForecastRequest, ForecastService};
use material_price_forecast::util::csv_loader::CsvSeriesSource;

const USAGE: &str = "usage: material_price_forecast materials\n       material_price_forecast forecast <material> <region> [data_dir]";

fn main() -> Result<()> {
    env_logger::init();
    info!(
        "{} {} ({})",
        build_info::PKG_NAME,
        build_info::PKG_VERSION,
        build_info::PROFILE
    );

    // Accept the command and its arguments from the command line
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("materials");

    let registry = match env::var("MPF_REGISTRY") {
        Ok(path) => MaterialRegistry::from_path(&path)
            .with_context(|| format!("loading material registry from {}", path))?,
        Err(_) => MaterialRegistry::builtin().context("loading material registry")?,
    };
    info!("Registry holds {} materials", registry.len());

    let mut config = match env::var("MPF_CONFIG") {
        Ok(path) => {
            let json = fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
            serde_json::from_str::<ForecastConfig>(&json)
                .with_context(|| format!("parsing forecast config {}", path))?
        }
        Err(_) => ForecastConfig::default(),
    };
    if let Ok(seed) = env::var("MPF_SEED") {
        config.seed = Some(seed.parse().context("MPF_SEED must be an unsigned integer")?);
    }

    let data_dir = args
        .get(4)
        .cloned()
        .or_else(|| env::var("MPF_DATA_DIR").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let service = ForecastService::new(registry, CsvSeriesSource::new(data_dir), config);

    let response = match command {
        "materials" => service.list_materials(),
        "forecast" => {
            let (Some(material), Some(region)) = (args.get(2), args.get(3)) else {
                bail!(USAGE);
            };
            info!("Using material: {} | region: {}", material, region);
            service.forecast(&ForecastRequest::new(material.as_str(), region.as_str()))
        }
        _ => bail!(USAGE),
    };

    println!("{}", serde_json::to_string_pretty(&response.body)?);
    if !response.is_success() {
        bail!("request failed with status {}", response.status);
    }

    Ok(())
}
