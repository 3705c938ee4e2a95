//! Google Sheets 远端数据源

pub mod api;
pub mod types;

pub use api::{SheetsApi, SheetsApiConfig};
pub use types::SheetAction;
