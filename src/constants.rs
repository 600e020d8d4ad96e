// Column names of the aligned and feature tables
pub const DATE_COLUMN: &str = "date";
pub const PERIOD_COLUMN: &str = "period";
pub const TARGET_COLUMN: &str = "price";
pub const PRICE_INDEX_COLUMN: &str = "cpi";
pub const FUEL_PRICE_COLUMN: &str = "diesel_price";
pub const EXCHANGE_RATE_COLUMN: &str = "exchange_rate";
pub const INTEREST_RATE_COLUMN: &str = "interest_rate";
pub const PRICE_INDEX_ROLLING_MEAN_COLUMN: &str = "cpi_rolling_mean";
pub const FUEL_PRICE_DIFF_COLUMN: &str = "diesel_price_diff";
pub const MONTH_COLUMN: &str = "month";
pub const QUARTER_COLUMN: &str = "quarter";

// Predictor block, in model input order. The last entry is the feedback slot
// overwritten with each step's prediction during autoregressive forecasting.
pub const PREDICTOR_COLUMNS: [&str; 8] = [
    PRICE_INDEX_COLUMN,
    FUEL_PRICE_COLUMN,
    EXCHANGE_RATE_COLUMN,
    INTEREST_RATE_COLUMN,
    PRICE_INDEX_ROLLING_MEAN_COLUMN,
    FUEL_PRICE_DIFF_COLUMN,
    MONTH_COLUMN,
    QUARTER_COLUMN,
];

// Feature engineering
pub const ROLLING_MEAN_WINDOW: usize = 3;

// Model parameters
pub const SEQUENCE_LENGTH: usize = 5; // Number of months to look back
pub const FORECAST_HORIZON: usize = 72; // Six years of monthly steps
pub const FIRST_LAYER_UNITS: usize = 100;
pub const SECOND_LAYER_UNITS: usize = 50;
pub const DROPOUT_RATE: f64 = 0.25;

// Training
pub const LEARNING_RATE: f64 = 0.001;
pub const MAX_EPOCHS: usize = 100;
pub const BATCH_SIZE: usize = 8;
pub const EARLY_STOPPING_PATIENCE: usize = 5;

// Forecasting
pub const PERTURBATION_AMPLITUDE: f64 = 0.01;
pub const FORECAST_ANCHOR: (i32, u32, u32) = (2025, 1, 1);

// Data layout on disk
pub const MATERIAL_DATA_DIR: &str = "Item";
pub const INDICATOR_DATA_DIR: &str = "Validation";
pub const SOURCE_DATE_HEADER: &str = "년/월";
pub const MISSING_VALUE_TOKEN: &str = "-";
