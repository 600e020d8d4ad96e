pub mod build_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
pub mod constants;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod service;
pub mod source;
#[cfg(test)]
pub mod test;
pub mod util {
    pub mod csv_loader;
}
