pub mod alerts;
pub mod db;
pub mod error;
pub mod holdings;
pub mod models;
pub mod portfolios;

pub use alerts::{AlertFilter, AlertManager};
pub use db::StoreDb;
pub use error::{StoreError, StoreResult};
pub use holdings::HoldingManager;
pub use models::*;
pub use portfolios::PortfolioManager;
