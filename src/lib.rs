#![doc(test(attr(deny(warnings))))]

//! GymFlow Core is the membership ledger engine behind a gym front desk:
//! member lifecycle status, payment settlement, check-in admission and the
//! dashboard aggregations, all computed over a pluggable record store.

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

pub use crate::config::{ConfigManager, DeletePolicy, GymConfig};
pub use crate::core::errors::{CheckInBlockReason, GymError, GymResult};
pub use crate::core::gym_manager::GymManager;
pub use crate::core::time::{Clock, FixedClock, SystemClock};
pub use crate::storage::{JsonStore, MemoryStore, RecordStore};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("GymFlow Core tracing initialized.");
    });
}
