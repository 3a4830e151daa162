//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod nse_directory_adapter;
pub mod typst_report;
pub mod yahoo_adapter;
