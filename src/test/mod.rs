pub mod test_alignment;
pub mod test_csv_loader;
pub mod test_feature_engineering;
pub mod test_scaling;
