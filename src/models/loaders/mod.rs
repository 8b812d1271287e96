pub mod csv_loader;
pub mod toml_loader;

pub use csv_loader::{load_orders_csv, parse_orders};
pub use toml_loader::load_selectors;
