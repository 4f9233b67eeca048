use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE: &str = "school.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)
        .with_context(|| format!("failed to create workspace {}", workspace.display()))?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

#[cfg(test)]
pub fn open_in_memory() -> anyhow::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    // One row per named slot. Payloads are whole JSON documents; the slot
    // contents are never addressed by SQL.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_slots(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

pub fn slot_get_raw(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let v = conn
        .query_row("SELECT value FROM kv_slots WHERE key = ?", [key], |r| {
            r.get::<_, String>(0)
        })
        .optional()?;
    Ok(v)
}

pub fn slot_set_raw(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO kv_slots(key, value, updated_at)
         VALUES(?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET
           value = excluded.value,
           updated_at = excluded.updated_at",
        (key, value, &now),
    )?;
    Ok(())
}

pub fn slot_exists(conn: &Connection, key: &str) -> anyhow::Result<bool> {
    let v = conn
        .query_row("SELECT 1 FROM kv_slots WHERE key = ?", [key], |r| {
            r.get::<_, i64>(0)
        })
        .optional()?;
    Ok(v.is_some())
}

pub fn settings_get_json(
    conn: &Connection,
    key: &str,
) -> anyhow::Result<Option<serde_json::Value>> {
    let Some(raw) = slot_get_raw(conn, key)? else {
        return Ok(None);
    };
    // A corrupt settings row behaves like an unset one.
    Ok(serde_json::from_str(&raw).ok())
}

pub fn settings_set_json(
    conn: &Connection,
    key: &str,
    value: &serde_json::Value,
) -> anyhow::Result<()> {
    slot_set_raw(conn, key, &serde_json::to_string(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn slot_upsert_replaces_previous_value() {
        let conn = open_in_memory().expect("open db");
        assert_eq!(slot_get_raw(&conn, "classes").expect("get"), None);
        assert!(!slot_exists(&conn, "classes").expect("exists"));

        slot_set_raw(&conn, "classes", "[1]").expect("set");
        slot_set_raw(&conn, "classes", "[2]").expect("set again");
        assert_eq!(
            slot_get_raw(&conn, "classes").expect("get"),
            Some("[2]".to_string())
        );
        assert!(slot_exists(&conn, "classes").expect("exists"));
    }

    #[test]
    fn corrupt_settings_read_as_unset() {
        let conn = open_in_memory().expect("open db");
        slot_set_raw(&conn, "setup.diary", "{not json").expect("set");
        assert_eq!(settings_get_json(&conn, "setup.diary").expect("get"), None);

        settings_set_json(&conn, "setup.diary", &json!({ "maxContentChars": 10 }))
            .expect("set json");
        assert_eq!(
            settings_get_json(&conn, "setup.diary").expect("get"),
            Some(json!({ "maxContentChars": 10 }))
        );
    }
}
