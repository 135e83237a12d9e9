// Optional local configuration so operators can skip the interactive
// URL/credential prompts. Loading is deliberately forgiving: a missing or
// unparseable file is treated the same as an empty one and the bootstrap
// simply falls back to prompting.

use std::path::{Path, PathBuf};

use serde::Deserialize;

const LOCAL_CONFIG: &str = "config.json";
const HOME_CONFIG: &str = ".chili_previews.json";

/// Persisted connection defaults. Every field is optional; the bootstrap
/// only uses what is present (URL on its own, credentials as a full trio).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub url: Option<String>,
    pub environment: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl FileConfig {
    /// Load config from `./config.json`, falling back to a dotfile in the
    /// user's home directory. Any failure yields the empty config.
    pub fn load() -> FileConfig {
        for path in candidate_paths() {
            if let Some(config) = read_config(&path) {
                return config;
            }
        }
        FileConfig::default()
    }

    /// Environment + username + password, if the config carries all three.
    pub fn credentials(&self) -> Option<(String, String, String)> {
        match (&self.environment, &self.username, &self.password) {
            (Some(e), Some(u), Some(p)) => Some((e.clone(), u.clone(), p.clone())),
            _ => None,
        }
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(HOME_CONFIG));
    }
    paths
}

fn read_config(path: &Path) -> Option<FileConfig> {
    let data = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}
