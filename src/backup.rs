//! School data bundles: one zip holding a manifest plus one JSON document per
//! stored collection.
//!
//! Import reads and validates the whole bundle before anything is written, and
//! then replaces the listed collections inside a single transaction. Collections
//! the bundle does not list are left alone.

use crate::store::{Slot, Store};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
pub const BUNDLE_FORMAT_V1: &str = "schoold-collections-v1";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    format: String,
    #[serde(default)]
    app_version: String,
    #[serde(default)]
    exported_at: String,
    slots: Vec<String>,
}

fn slot_entry(key: &str) -> String {
    format!("slots/{}.json", key)
}

/// A bundle that has been fully read and checked, ready to apply.
#[derive(Debug)]
pub struct Bundle {
    pub format: String,
    pub slots: Vec<(Slot, serde_json::Value)>,
}

impl Bundle {
    pub fn slot_keys(&self) -> Vec<&'static str> {
        self.slots.iter().map(|(slot, _)| slot.key()).collect()
    }
}

/// Writes every collection present in `store` to a zip at `out_path`.
/// Returns the keys that were written.
pub fn export_bundle(store: &Store, out_path: &Path) -> anyhow::Result<Vec<&'static str>> {
    let mut docs = Vec::new();
    for slot in Slot::ALL {
        if !store.contains(slot)? {
            continue;
        }
        let value: serde_json::Value = store.get_or(slot.key(), serde_json::Value::Null);
        if value.is_null() {
            // Unreadable payloads are not worth carrying into a backup.
            continue;
        }
        docs.push((slot.key(), value));
    }

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let out_file = File::create(out_path)
        .with_context(|| format!("failed to create bundle {}", out_path.display()))?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let keys: Vec<&'static str> = docs.iter().map(|(k, _)| *k).collect();
    let manifest = Manifest {
        format: BUNDLE_FORMAT_V1.to_string(),
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        exported_at: chrono::Utc::now().to_rfc3339(),
        slots: keys.iter().map(|k| k.to_string()).collect(),
    };
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    serde_json::to_writer_pretty(&mut zip, &manifest).context("failed to write manifest")?;

    for (key, value) in &docs {
        zip.start_file(slot_entry(key), opts)
            .with_context(|| format!("failed to start entry for {}", key))?;
        serde_json::to_writer(&mut zip, value)
            .with_context(|| format!("failed to write entry for {}", key))?;
    }
    zip.finish().context("failed to finalize bundle")?;
    debug!(path = %out_path.display(), slots = keys.len(), "bundle written");
    Ok(keys)
}

/// Opens and validates a bundle without touching any store.
pub fn read_bundle(in_path: &Path) -> anyhow::Result<Bundle> {
    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.display()))?;
    let mut archive = ZipArchive::new(in_file).context("bundle is not a zip archive")?;

    let manifest: Manifest = {
        let mut text = String::new();
        archive
            .by_name(MANIFEST_ENTRY)
            .context("bundle missing manifest.json")?
            .read_to_string(&mut text)
            .context("failed to read manifest.json")?;
        serde_json::from_str(&text).context("manifest.json is invalid")?
    };
    if manifest.format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", manifest.format));
    }

    let mut slots = Vec::with_capacity(manifest.slots.len());
    for key in &manifest.slots {
        let slot = Slot::from_key(key).ok_or_else(|| anyhow!("unknown collection: {}", key))?;
        let mut text = String::new();
        archive
            .by_name(&slot_entry(key))
            .with_context(|| format!("bundle missing {}", slot_entry(key)))?
            .read_to_string(&mut text)
            .with_context(|| format!("failed to read {}", slot_entry(key)))?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("{} is invalid JSON", slot_entry(key)))?;
        slots.push((slot, value));
    }

    Ok(Bundle {
        format: manifest.format,
        slots,
    })
}

/// Replaces each collection listed in `bundle`; all or nothing.
pub fn apply_bundle(store: &Store, bundle: &Bundle) -> anyhow::Result<()> {
    let tx = store
        .conn()
        .unchecked_transaction()
        .context("failed to begin import")?;
    for (slot, value) in &bundle.slots {
        store.set(*slot, value)?;
    }
    tx.commit().context("failed to commit import")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::model::Class;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    fn store() -> Store {
        Store::new(db::open_in_memory().expect("open db"))
    }

    fn class(id: &str, name: &str) -> Class {
        Class {
            id: id.into(),
            name: name.into(),
        }
    }

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let f = File::create(path).expect("create zip");
        let mut zip = ZipWriter::new(f);
        for (name, body) in entries {
            zip.start_file(*name, FileOptions::default())
                .expect("start entry");
            zip.write_all(body.as_bytes()).expect("write entry");
        }
        zip.finish().expect("finish zip");
    }

    #[test]
    fn export_lists_only_present_collections() {
        let dir = temp_dir("schoold-bundle-export");
        let src = store();
        src.set(Slot::Classes, &vec![class("c1", "Class 5A")])
            .expect("set classes");
        src.set(Slot::Diary, &Vec::<serde_json::Value>::new())
            .expect("set diary");

        let out = dir.join("nested").join("b.zip");
        let keys = export_bundle(&src, &out).expect("export");
        assert_eq!(keys, vec!["classes", "diary"]);

        let mut archive = ZipArchive::new(File::open(&out).expect("open")).expect("zip");
        let mut manifest = String::new();
        archive
            .by_name(MANIFEST_ENTRY)
            .expect("manifest")
            .read_to_string(&mut manifest)
            .expect("read manifest");
        assert!(manifest.contains(BUNDLE_FORMAT_V1));
        archive.by_name("slots/classes.json").expect("classes entry");
        assert!(archive.by_name("slots/students.json").is_err());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn import_replaces_listed_collections_only() {
        let dir = temp_dir("schoold-bundle-roundtrip");
        let src = store();
        src.set(Slot::Classes, &vec![class("c1", "Class 5A")])
            .expect("set classes");
        let out = dir.join("b.zip");
        export_bundle(&src, &out).expect("export");

        let dst = store();
        dst.set(Slot::Classes, &vec![class("c9", "Other")])
            .expect("set classes");
        dst.set(Slot::SchoolInfo, &serde_json::json!({ "name": "Kept", "address": "" }))
            .expect("set info");

        let bundle = read_bundle(&out).expect("read");
        assert_eq!(bundle.slot_keys(), vec!["classes"]);
        apply_bundle(&dst, &bundle).expect("apply");

        let classes: Vec<Class> = dst.get(Slot::Classes);
        assert_eq!(classes, vec![class("c1", "Class 5A")]);
        let info: crate::model::SchoolInfo = dst.get(Slot::SchoolInfo);
        assert_eq!(info.name, "Kept");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn foreign_format_is_rejected() {
        let dir = temp_dir("schoold-bundle-foreign");
        let path = dir.join("foreign.zip");
        write_zip(
            &path,
            &[(MANIFEST_ENTRY, r#"{"format":"something-else","slots":[]}"#)],
        );
        let e = read_bundle(&path).expect_err("rejects format");
        assert!(e.to_string().contains("unsupported bundle format"));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_or_unknown_entries_are_rejected() {
        let dir = temp_dir("schoold-bundle-broken");

        let missing = dir.join("missing.zip");
        write_zip(
            &missing,
            &[(
                MANIFEST_ENTRY,
                r#"{"format":"schoold-collections-v1","slots":["classes"]}"#,
            )],
        );
        let e = read_bundle(&missing).expect_err("entry missing");
        assert!(format!("{e:#}").contains("slots/classes.json"));

        let unknown = dir.join("unknown.zip");
        write_zip(
            &unknown,
            &[
                (
                    MANIFEST_ENTRY,
                    r#"{"format":"schoold-collections-v1","slots":["grades"]}"#,
                ),
                ("slots/grades.json", "[]"),
            ],
        );
        let e = read_bundle(&unknown).expect_err("unknown collection");
        assert!(e.to_string().contains("unknown collection: grades"));

        let plain = dir.join("plain.sqlite3");
        std::fs::write(&plain, b"not a zip").expect("write");
        assert!(read_bundle(&plain).is_err());

        let _ = std::fs::remove_dir_all(dir);
    }
}
