//! Stockbook keeps bakery stock sheets: products, sales, derived stock levels
//! and money totals, with a self-checking reconciliation pass.
//!
//! The engine lives in the `stockbook-*` workspace crates; this crate owns the
//! mutable book lifecycle and the command shell.

pub mod cli;
pub mod manager;
pub mod system_clock;
pub mod utils;

pub use manager::BookManager;
pub use system_clock::SystemClock;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("stockbook tracing initialized");
    });
}
