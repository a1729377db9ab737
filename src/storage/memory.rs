use uuid::Uuid;

use super::{GymData, Record, RecordStore, Result};

/// Volatile store holding every collection in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: GymData,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: GymData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &GymData {
        &self.data
    }

    pub fn into_data(self) -> GymData {
        self.data
    }
}

impl RecordStore for MemoryStore {
    fn get_all<R: Record>(&self) -> Result<Vec<R>> {
        Ok(self.data.records::<R>().to_vec())
    }

    fn get_by_id<R: Record>(&self, id: Uuid) -> Result<Option<R>> {
        Ok(self.data.record::<R>(id).cloned())
    }

    fn insert<R: Record>(&mut self, record: R) -> Result<Uuid> {
        self.data.insert_record(record)
    }

    fn update<R, F>(&mut self, id: Uuid, mutator: F) -> Result<bool>
    where
        R: Record,
        F: FnOnce(&mut R),
    {
        Ok(self.data.update_record::<R, F>(id, mutator))
    }

    fn delete<R: Record>(&mut self, id: Uuid) -> Result<bool> {
        Ok(self.data.remove_record::<R>(id))
    }
}
