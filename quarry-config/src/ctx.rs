use std::path::{Path, PathBuf};

/// Context data when parsing configuration files
pub(crate) struct Ctx {
    /// Path of the current config file
    pub path: Option<PathBuf>,
}

impl Ctx {
    pub(crate) fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// The directory containing the config file, if loaded from disk
    pub(crate) fn dir(&self) -> Option<&Path> {
        self.path.as_deref().and_then(|p| p.parent())
    }
}
