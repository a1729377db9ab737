#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use chrono::{DateTime, TimeZone, Utc};
use gymflow_core::{
    config::{ConfigManager, GymConfig},
    core::{gym_manager::GymManager, time::FixedClock},
    domain::{Member, NewMember, SubscriptionType},
    storage::{JsonStore, MemoryStore},
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// 2025-06-10 12:00 UTC, a Tuesday.
pub fn reference_now() -> DateTime<Utc> {
    at(2025, 6, 10, 12, 0)
}

/// Creates a fresh, isolated base directory for a test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates isolated JSON-backed stores and config managers for each test.
pub fn setup_test_env() -> (JsonStore, ConfigManager, PathBuf) {
    let base = temp_base();
    let store = JsonStore::with_retention(base.join("gymflow.json"), base.join("backups"), 3)
        .expect("create json store");
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    (store, config_manager, base)
}

pub fn memory_manager() -> GymManager<MemoryStore> {
    GymManager::with_clock(
        MemoryStore::new(),
        GymConfig::default(),
        FixedClock::new(reference_now()),
    )
}

/// Registers a monthly member whose subscription ends at `end`.
pub fn enrol<S: gymflow_core::storage::RecordStore>(
    manager: &mut GymManager<S>,
    name: &str,
    end: DateTime<Utc>,
    paid: bool,
) -> Member {
    let start = end.min(reference_now()) - chrono::Duration::days(30);
    let mut draft =
        NewMember::new(name, "555-0100", SubscriptionType::Monthly, start).with_end(end);
    if paid {
        draft = draft.paid();
    }
    manager.add_member(draft).expect("add member")
}
