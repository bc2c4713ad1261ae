//! Ignore-file status model.

use serde::Serialize;

/// Result of checking `.gitignore` for the required entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GitignoreStatus {
    /// Whether `.gitignore` exists at the repository root.
    pub exists: bool,

    /// Each required entry and whether it is present, in request order.
    pub entries: Vec<(String, bool)>,
}

impl GitignoreStatus {
    /// True when the file is missing or any required entry is absent.
    pub fn needs_fix(&self) -> bool {
        !self.exists || self.entries.iter().any(|(_, present)| !present)
    }

    /// Required entries that are not present.
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, present)| !present)
            .map(|(entry, _)| entry.as_str())
    }
}
