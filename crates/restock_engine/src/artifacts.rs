use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use restock_core::Timestamp;

use crate::persist::{ensure_dir, PersistError};
use crate::Capture;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The page never showed its presence element.
    LoadFailed,
    /// A new in-stock event fired.
    InStock,
}

impl ArtifactKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            ArtifactKind::LoadFailed => "load_failed",
            ArtifactKind::InStock => "in_stock",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Writes page captures to `{root}/{kind}/{nanos}.{ext}`.
#[derive(Debug, Clone, Default)]
pub struct ArtifactWriter {
    root: Option<PathBuf>,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { root: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.root.is_some()
    }

    pub fn path_for(&self, kind: ArtifactKind, at: Timestamp, extension: &str) -> Option<PathBuf> {
        self.root
            .as_deref()
            .map(|root| root.join(kind.dir_name()).join(format!("{at}.{extension}")))
    }

    pub fn store(
        &self,
        kind: ArtifactKind,
        at: Timestamp,
        capture: &Capture,
    ) -> Result<Option<PathBuf>, PersistError> {
        let Some(path) = self.path_for(kind, at, &capture.extension) else {
            return Ok(None);
        };
        if let Some(dir) = path.parent().map(Path::to_path_buf) {
            ensure_dir(&dir)?;
        }
        fs::write(&path, &capture.bytes)?;
        engine_info!("Stored {} artifact at {:?}", kind, path);
        Ok(Some(path))
    }
}
