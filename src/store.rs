use crate::db;
use anyhow::Context;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Named collections persisted by the store. Each slot holds one JSON document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    SchoolInfo,
    Classes,
    Students,
    Teachers,
    Parents,
    Attendance,
    Diary,
}

impl Slot {
    pub const ALL: [Slot; 7] = [
        Slot::SchoolInfo,
        Slot::Classes,
        Slot::Students,
        Slot::Teachers,
        Slot::Parents,
        Slot::Attendance,
        Slot::Diary,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::SchoolInfo => "schoolInfo",
            Self::Classes => "classes",
            Self::Students => "students",
            Self::Teachers => "teachers",
            Self::Parents => "parents",
            Self::Attendance => "attendance",
            Self::Diary => "diary",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

/// Key-value persistence over the workspace database.
///
/// Reads never fail: an absent key, an unreadable row, or a payload that does
/// not deserialize all yield the caller's default. Writes replace the whole
/// value stored under the key.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match db::slot_get_raw(&self.conn, key) {
            Ok(Some(v)) => v,
            Ok(None) => return default,
            Err(e) => {
                warn!(key, error = %e, "slot read failed, using default");
                return default;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(key, error = %e, "slot payload is corrupt, using default");
                default
            }
        }
    }

    pub fn get<T: DeserializeOwned + Default>(&self, slot: Slot) -> T {
        self.get_or(slot.key(), T::default())
    }

    pub fn set_key<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let raw = serde_json::to_string(value)
            .with_context(|| format!("failed to serialize slot {}", key))?;
        db::slot_set_raw(&self.conn, key, &raw)
            .with_context(|| format!("failed to write slot {}", key))
    }

    pub fn set<T: Serialize + ?Sized>(&self, slot: Slot, value: &T) -> anyhow::Result<()> {
        self.set_key(slot.key(), value)
    }

    pub fn contains(&self, slot: Slot) -> anyhow::Result<bool> {
        db::slot_exists(&self.conn, slot.key())
    }
}
