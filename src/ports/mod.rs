//! Port traits at every I/O seam.

pub mod chart_port;
pub mod config_port;
pub mod market_data_port;
pub mod report_port;
pub mod symbol_directory_port;
