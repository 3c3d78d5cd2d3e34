//! The persisted document: full day history plus user settings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::day::WakeDay;

/// User settings stored alongside the day history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_true")]
    pub notifications: bool,
}

fn default_theme() -> String {
    "light".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            notifications: default_true(),
        }
    }
}

/// Everything the tracker persists, as one JSON document.
///
/// `updated_at` is stamped on every save and drives later-write-wins
/// arbitration against a remote mirror.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentState {
    #[serde(default)]
    pub days: BTreeMap<String, WakeDay>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DocumentState {
    /// Later-write-wins arbitration between two replicas. The remote copy
    /// is taken only when strictly newer; a replica without a timestamp
    /// loses to one that has it.
    pub fn merge_newer(local: DocumentState, remote: DocumentState) -> DocumentState {
        match (local.updated_at, remote.updated_at) {
            (Some(local_at), Some(remote_at)) if remote_at > local_at => remote,
            (None, Some(_)) => remote,
            _ => local,
        }
    }
}
