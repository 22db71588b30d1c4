use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine_logging::{engine_info, engine_warn};
use restock_core::{parse_target_list, AlertStore, TargetList};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("directory missing or not writable: {0}")]
    Dir(String),
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure a directory exists; create it if missing.
pub fn ensure_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::Dir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::Dir(format!("{dir:?} is not a directory")));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::Dir(e.to_string()))?;
    }
    Ok(())
}

/// Replace `path` wholesale: write a sibling temp file, sync it, rename over the target.
pub fn write_atomically(path: &Path, content: &str) -> Result<(), PersistError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    ensure_dir(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| PersistError::Io(e.error))?;
    Ok(())
}

/// Load the target list. A missing or unreadable file is an error.
pub fn load_targets(path: &Path) -> Result<TargetList, PersistError> {
    let raw = fs::read_to_string(path).map_err(|source| PersistError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let list = parse_target_list(&raw);
    for skipped in &list.skipped {
        engine_warn!(
            "Skipping target list line {} in {:?}: {}",
            skipped.line,
            path,
            skipped.error
        );
    }
    engine_info!("Loaded {} targets from {:?}", list.targets.len(), path);
    Ok(list)
}

/// Load the alert state. A missing file is a first run and yields an empty store;
/// any other read failure is an error.
pub fn load_alert_store(path: &Path) -> Result<AlertStore, PersistError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            engine_info!("No alert state at {:?}; starting empty", path);
            return Ok(AlertStore::new());
        }
        Err(source) => {
            return Err(PersistError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let (store, issues) = AlertStore::parse(&raw);
    for issue in &issues {
        engine_warn!(
            "Ignoring alert state line {} in {:?}: {:?}",
            issue.line,
            path,
            issue.kind
        );
    }
    engine_info!(
        "Loaded {} active alerts from {:?}",
        store.alert_count(),
        path
    );
    Ok(store)
}

pub fn save_alert_store(path: &Path, store: &AlertStore) -> Result<(), PersistError> {
    write_atomically(path, &store.render())?;
    engine_info!(
        "Saved {} active alerts to {:?}",
        store.alert_count(),
        path
    );
    Ok(())
}
