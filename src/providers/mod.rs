pub mod stock_api;
pub mod synthetic;
