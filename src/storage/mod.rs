pub mod json_backend;
pub mod memory;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    core::time::TimeWindow,
    domain::{CheckIn, Identifiable, Member, Payment},
    errors::StoreError,
};

pub use json_backend::{BackupInfo, JsonStore};
pub use memory::MemoryStore;

pub type Result<T> = std::result::Result<T, StoreError>;

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Names the record collections held by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Members,
    Payments,
    CheckIns,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Members => "members",
            Collection::Payments => "payments",
            Collection::CheckIns => "check_ins",
        }
    }
}

/// Full contents of a store: one vector per collection, in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GymData {
    #[serde(default = "GymData::schema_version_default")]
    pub schema_version: u8,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub check_ins: Vec<CheckIn>,
}

impl Default for GymData {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            members: Vec::new(),
            payments: Vec::new(),
            check_ins: Vec::new(),
        }
    }
}

impl GymData {
    fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    pub fn records<R: Record>(&self) -> &[R] {
        R::table(self)
    }

    pub fn record<R: Record>(&self, id: Uuid) -> Option<&R> {
        R::table(self).iter().find(|record| record.id() == id)
    }

    pub fn insert_record<R: Record>(&mut self, record: R) -> Result<Uuid> {
        let id = record.id();
        if self.record::<R>(id).is_some() {
            return Err(StoreError::DuplicateId(id));
        }
        R::table_mut(self).push(record);
        Ok(id)
    }

    pub fn update_record<R, F>(&mut self, id: Uuid, mutator: F) -> bool
    where
        R: Record,
        F: FnOnce(&mut R),
    {
        match R::table_mut(self).iter_mut().find(|record| record.id() == id) {
            Some(record) => {
                mutator(record);
                true
            }
            None => false,
        }
    }

    pub fn remove_record<R: Record>(&mut self, id: Uuid) -> bool {
        let table = R::table_mut(self);
        let before = table.len();
        table.retain(|record| record.id() != id);
        table.len() != before
    }
}

/// An entity stored in one of the store's collections.
pub trait Record: Identifiable + Clone {
    const COLLECTION: Collection;

    /// Timestamp used by date-range queries.
    fn recorded_at(&self) -> DateTime<Utc>;

    fn table(data: &GymData) -> &Vec<Self>;

    fn table_mut(data: &mut GymData) -> &mut Vec<Self>;
}

impl Record for Member {
    const COLLECTION: Collection = Collection::Members;

    fn recorded_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn table(data: &GymData) -> &Vec<Self> {
        &data.members
    }

    fn table_mut(data: &mut GymData) -> &mut Vec<Self> {
        &mut data.members
    }
}

impl Record for Payment {
    const COLLECTION: Collection = Collection::Payments;

    fn recorded_at(&self) -> DateTime<Utc> {
        self.date
    }

    fn table(data: &GymData) -> &Vec<Self> {
        &data.payments
    }

    fn table_mut(data: &mut GymData) -> &mut Vec<Self> {
        &mut data.payments
    }
}

impl Record for CheckIn {
    const COLLECTION: Collection = Collection::CheckIns;

    fn recorded_at(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn table(data: &GymData) -> &Vec<Self> {
        &data.check_ins
    }

    fn table_mut(data: &mut GymData) -> &mut Vec<Self> {
        &mut data.check_ins
    }
}

/// Abstraction over record stores the engine reads and writes through.
///
/// Implementations must preserve insertion order in `get_all`.
pub trait RecordStore {
    fn get_all<R: Record>(&self) -> Result<Vec<R>>;

    fn get_by_id<R: Record>(&self, id: Uuid) -> Result<Option<R>>;

    fn insert<R: Record>(&mut self, record: R) -> Result<Uuid>;

    /// Applies `mutator` to the record identified by `id`. Returns `false` if absent.
    fn update<R, F>(&mut self, id: Uuid, mutator: F) -> Result<bool>
    where
        R: Record,
        F: FnOnce(&mut R);

    /// Removes the record identified by `id`. Returns `false` if absent.
    fn delete<R: Record>(&mut self, id: Uuid) -> Result<bool>;

    fn find<R, P>(&self, predicate: P) -> Result<Vec<R>>
    where
        R: Record,
        P: Fn(&R) -> bool,
    {
        Ok(self
            .get_all::<R>()?
            .into_iter()
            .filter(|record| predicate(record))
            .collect())
    }

    /// Records whose `recorded_at` falls inside `window`.
    fn between<R: Record>(&self, window: TimeWindow) -> Result<Vec<R>> {
        self.find(|record: &R| window.contains(record.recorded_at()))
    }

    fn snapshot(&self) -> Result<GymData> {
        Ok(GymData {
            schema_version: CURRENT_SCHEMA_VERSION,
            members: self.get_all()?,
            payments: self.get_all()?,
            check_ins: self.get_all()?,
        })
    }
}

/// Detects dangling references and billing anomalies within a data snapshot.
pub fn integrity_warnings(data: &GymData) -> Vec<String> {
    let member_ids: HashSet<_> = data.members.iter().map(|m| m.id).collect();
    let mut warnings = Vec::new();

    for payment in &data.payments {
        if !member_ids.contains(&payment.member_id) {
            warnings.push(format!(
                "payment {} references unknown member {}",
                payment.id, payment.member_id
            ));
        }
    }
    for check_in in &data.check_ins {
        if !member_ids.contains(&check_in.member_id) {
            warnings.push(format!(
                "check-in {} references unknown member {}",
                check_in.id, check_in.member_id
            ));
        }
    }

    let mut open: HashMap<Uuid, usize> = HashMap::new();
    for payment in data.payments.iter().filter(|p| p.is_incomplete()) {
        *open.entry(payment.member_id).or_default() += 1;
    }
    for member in &data.members {
        if let Some(count) = open.get(&member.id).filter(|count| **count > 1) {
            warnings.push(format!(
                "member {} has {} incomplete payments",
                member.id, count
            ));
        }
    }
    warnings
}
