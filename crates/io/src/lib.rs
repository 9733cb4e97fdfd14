// File I/O: source acquisition and report export around the recon engine

pub mod csv;
pub mod export;
pub mod gpkg;
pub mod master;
pub mod validate;
pub mod xlsx;

pub use export::{report_to_csv_string, write_report_csv, write_result_json};
pub use gpkg::{list_layers, read_features};
pub use master::read_master;
pub use validate::check_inputs;
