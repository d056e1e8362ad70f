//! On-disk session store.
//!
//! Holds the long-lived refresh credential under
//! `~/.config/kavir-account/session.json`. Loading is best-effort (a
//! missing or corrupt file is just a signed-out state); saving reports
//! errors since losing the credential silently would be confusing.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl StoredSession {
    pub fn load() -> Self {
        if let Some(path) = session_path() {
            if let Ok(data) = fs::read_to_string(&path) {
                if let Ok(session) = serde_json::from_str(&data) {
                    return session;
                }
            }
        }
        Self::default()
    }

    pub fn save(&self) -> Result<()> {
        let path = session_path().context("could not resolve the config directory")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(&path, data).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.refresh_token = None;
        if let Some(path) = session_path() {
            if path.exists() {
                fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
            }
        }
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.refresh_token.is_some()
    }
}

fn session_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("kavir-account").join("session.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_session_round_trips_through_json() {
        let session = StoredSession {
            refresh_token: Some("refresh".into()),
        };
        let json = serde_json::to_string(&session).unwrap();
        let back: StoredSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back.refresh_token.as_deref(), Some("refresh"));
        assert!(back.is_authenticated());
    }

    #[test]
    fn missing_token_field_reads_as_signed_out() {
        let back: StoredSession = serde_json::from_str("{}").unwrap();
        assert!(!back.is_authenticated());
    }
}
