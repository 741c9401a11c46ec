//! Order engine: lifecycle, ledger, dispatch, storage

pub mod dispatch;
pub mod error;
pub mod ledger;
pub mod manager;
pub mod state_machine;
pub mod storage;

pub use dispatch::DriverRegistry;
pub use error::{OrderError, OrderResult};
pub use manager::{OrderDetail, OrderManager, OrderSettings};
pub use storage::OrderQuery;
