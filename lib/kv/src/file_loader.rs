use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::KVError;
use crate::overlay::OverlayKV;
use crate::traits::KVStore;

/// Loads the reference data directory into an overlay's file layer.
///
/// The directory is flat: every `*.yaml` / `*.yml` file becomes one
/// `config:{stem}` entry holding the raw file bytes.
///
/// ```text
/// reference/
/// ├── software-rules.yaml   → config:software-rules
/// ├── software.yaml         → config:software
/// ├── prodi.yaml            → config:prodi
/// ├── dosen.yaml            → config:dosen
/// ├── rooms.yaml            → config:rooms
/// ├── policy.yaml           → config:policy
/// ├── branding.yaml         → config:branding
/// └── announcement.yaml     → config:announcement
/// ```
///
/// Loaded entries stay read-only for the life of the process. Consumers
/// parse the bytes into typed structs themselves; editing an entry means
/// changing the file and restarting.
pub struct FileLoader;

impl FileLoader {
    /// Read every YAML file under `reference_dir` into the overlay.
    /// Returns how many entries were loaded; a missing directory loads zero.
    pub fn load<DB: KVStore>(
        reference_dir: &Path,
        overlay: &OverlayKV<DB>,
    ) -> Result<usize, KVError> {
        if !reference_dir.is_dir() {
            debug!(dir = %reference_dir.display(), "no reference dir, skipping");
            return Ok(0);
        }

        let mut count = 0;
        for entry in fs::read_dir(reference_dir).map_err(KVError::storage)? {
            let path = entry.map_err(KVError::storage)?.path();
            if !path.is_file() {
                continue;
            }

            let yaml = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml" | "yml")
            );
            if !yaml {
                warn!(file = %path.display(), "ignoring non-YAML file in reference dir");
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let bytes = fs::read(&path).map_err(KVError::storage)?;
            overlay.insert_file_entry(format!("config:{stem}"), bytes);
            count += 1;
        }

        debug!(count, dir = %reference_dir.display(), "reference data loaded");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redb::RedbStore;
    use tempfile::TempDir;

    #[test]
    fn loads_yaml_files_as_readonly_config_keys() {
        let tmp = TempDir::new().unwrap();
        let reference = tmp.path().join("reference");
        fs::create_dir(&reference).unwrap();
        fs::write(
            reference.join("rooms.yaml"),
            "- Ruang Penelitian\n- Lab Komputasi\n",
        )
        .unwrap();
        fs::write(reference.join("policy.yml"), "defaultExpireDays: 30\n").unwrap();
        fs::write(reference.join("notes.txt"), "ignored").unwrap();

        let db = RedbStore::open(&tmp.path().join("test.redb")).unwrap();
        let overlay = OverlayKV::new(db);
        let count = FileLoader::load(&reference, &overlay).unwrap();

        assert_eq!(count, 2);
        assert!(overlay.get("config:rooms").unwrap().is_some());
        assert!(overlay.is_readonly("config:policy"));
        assert!(overlay.get("config:notes").unwrap().is_none());
    }

    #[test]
    fn missing_dir_loads_nothing() {
        let tmp = TempDir::new().unwrap();
        let db = RedbStore::open(&tmp.path().join("test.redb")).unwrap();
        let overlay = OverlayKV::new(db);
        let count = FileLoader::load(&tmp.path().join("nope"), &overlay).unwrap();
        assert_eq!(count, 0);
        assert_eq!(overlay.file_layer_len(), 0);
    }
}
