pub mod loaders;
pub mod order;
pub mod selectors;

pub use loaders::{load_orders_csv, load_selectors, parse_orders};
pub use order::{BoundingBox, OrderIdentifier, OrderRecord};
pub use selectors::Selectors;
