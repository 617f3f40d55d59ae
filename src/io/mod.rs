pub mod csv_export;
pub mod csv_import;
pub mod file;

pub use csv_export::export_workload;
pub use csv_import::import_orders;
pub use file::{load_snapshot, save_snapshot, ShopSnapshot};
