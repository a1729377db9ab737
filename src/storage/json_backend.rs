//! Filesystem-backed JSON persistence for the record collections.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{GymData, Record, RecordStore, Result, CURRENT_SCHEMA_VERSION};
use crate::{core::utils::PathResolver, errors::StoreError};

const JSON_EXTENSION: &str = "json";
const BACKUP_PREFIX: &str = "snapshot";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Describes a persisted backup snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub path: PathBuf,
}

/// Store that keeps every collection in one JSON document.
///
/// Each mutation is applied to a copy of the data, written to disk atomically,
/// and only then made visible to readers.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
    data: GymData,
}

impl JsonStore {
    pub fn open(path: PathBuf, backups_dir: PathBuf) -> Result<Self> {
        Self::with_retention(path, backups_dir, DEFAULT_RETENTION)
    }

    /// Opens the store under the resolved application data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(PathResolver::data_file(), PathResolver::backups_dir())
    }

    pub fn with_retention(path: PathBuf, backups_dir: PathBuf, retention: usize) -> Result<Self> {
        fs::create_dir_all(&backups_dir)?;
        let data = if path.exists() {
            load_data_from_path(&path)?
        } else {
            debug!(path = %path.display(), "no data file yet, starting empty");
            GymData::default()
        };
        Ok(Self {
            path,
            backups_dir,
            retention: retention.max(1),
            data,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &GymData {
        &self.data
    }

    /// Writes a timestamped copy of the current data to the backups directory.
    pub fn backup(&self, note: Option<&str>) -> Result<BackupInfo> {
        fs::create_dir_all(&self.backups_dir)?;
        let now = Utc::now();
        let mut stem = format!("{}_{}", BACKUP_PREFIX, now.format(BACKUP_TIMESTAMP_FORMAT));
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let mut file_name = format!("{}.{}", stem, JSON_EXTENSION);
        let mut counter = 1;
        while self.backups_dir.join(&file_name).exists() {
            file_name = format!("{}_{}.{}", stem, counter, JSON_EXTENSION);
            counter += 1;
        }
        let path = self.backups_dir.join(&file_name);
        write_atomic(&path, &serialize_data(&self.data)?)?;
        info!(backup = %file_name, "created backup");
        self.prune_backups()?;
        Ok(BackupInfo {
            created_at: parse_backup_timestamp(&file_name),
            id: file_name,
            path,
        })
    }

    /// Lists backups, newest first.
    pub fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(JSON_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(BackupInfo {
                    id: file_name.to_string(),
                    created_at: parse_backup_timestamp(file_name),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    /// Replaces the current data with the contents of `backup`.
    pub fn restore_backup(&mut self, backup: &BackupInfo) -> Result<()> {
        if !backup.path.exists() {
            return Err(StoreError::Unavailable(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        let restored = load_data_from_path(&backup.path)?;
        save_data_to_path(&restored, &self.path)?;
        self.data = restored;
        info!(backup = %backup.id, "restored backup");
        Ok(())
    }

    fn prune_backups(&self) -> Result<()> {
        for entry in self.list_backups()?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                warn!(backup = %entry.id, error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }

    fn commit<T, F>(&mut self, change: F) -> Result<T>
    where
        F: FnOnce(&mut GymData) -> Result<T>,
    {
        let mut next = self.data.clone();
        let outcome = change(&mut next)?;
        save_data_to_path(&next, &self.path)?;
        self.data = next;
        Ok(outcome)
    }
}

impl RecordStore for JsonStore {
    fn get_all<R: Record>(&self) -> Result<Vec<R>> {
        Ok(self.data.records::<R>().to_vec())
    }

    fn get_by_id<R: Record>(&self, id: Uuid) -> Result<Option<R>> {
        Ok(self.data.record::<R>(id).cloned())
    }

    fn insert<R: Record>(&mut self, record: R) -> Result<Uuid> {
        let id = self.commit(|data| data.insert_record(record))?;
        debug!(collection = R::COLLECTION.name(), %id, "inserted record");
        Ok(id)
    }

    fn update<R, F>(&mut self, id: Uuid, mutator: F) -> Result<bool>
    where
        R: Record,
        F: FnOnce(&mut R),
    {
        if self.data.record::<R>(id).is_none() {
            return Ok(false);
        }
        self.commit(|data| Ok(data.update_record::<R, F>(id, mutator)))
    }

    fn delete<R: Record>(&mut self, id: Uuid) -> Result<bool> {
        if self.data.record::<R>(id).is_none() {
            return Ok(false);
        }
        debug!(collection = R::COLLECTION.name(), %id, "deleting record");
        self.commit(|data| Ok(data.remove_record::<R>(id)))
    }
}

/// Saves a data snapshot to an arbitrary path on disk.
pub fn save_data_to_path(data: &GymData, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_data(data)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a data snapshot from the provided filesystem path.
pub fn load_data_from_path(path: &Path) -> Result<GymData> {
    let raw = fs::read_to_string(path)?;
    let data: GymData = serde_json::from_str(&raw)?;
    if data.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(StoreError::Unavailable(format!(
            "data file schema v{} is newer than supported v{}",
            data.schema_version, CURRENT_SCHEMA_VERSION
        )));
    }
    Ok(data)
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{}", JSON_EXTENSION))?;
    let mut segments = stem.split('_');
    if segments.next()? != BACKUP_PREFIX {
        return None;
    }
    let date = segments.next()?;
    let time = segments.next()?;
    if !is_digits(date, 8) || !is_digits(time, 6) {
        return None;
    }
    NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

fn serialize_data(data: &GymData) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}
