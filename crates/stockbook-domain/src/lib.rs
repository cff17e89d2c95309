//! stockbook-domain
//!
//! Pure domain models (SheetBook, Sheet, Product, Sale, computed ledger views).
//! No I/O, no CLI, no storage. Only data types and small value helpers.

pub mod common;
pub mod computed;
pub mod product;
pub mod sale;
pub mod sheet;

pub use common::*;
pub use computed::*;
pub use product::*;
pub use sale::*;
pub use sheet::*;
