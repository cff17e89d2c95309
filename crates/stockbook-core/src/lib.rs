//! stockbook-core
//!
//! Ledger engine and mutation services for stock sheets.
//! Depends on stockbook-domain. No CLI, no terminal I/O, no direct storage interactions.

pub mod aggregator;
pub mod error;
pub mod format;
pub mod normalizer;
pub mod product_service;
pub mod reconciliation;
pub mod sale_service;
pub mod sheet_service;
pub mod storage;
pub mod time;
pub mod validator;


pub use aggregator::compute_ledger;
pub use error::{CoreError, CoreResult};
pub use format::{CurrencyFormatter, DateFormatter};
pub use product_service::*;
pub use reconciliation::{reconcile, run_system_check};
pub use sale_service::*;
pub use sheet_service::*;
pub use time::Clock;
pub use validator::Validator;
