use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::RwLock,
};
use tracing::{info, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// User interface preferences shared by every client of this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct Preferences {
    pub theme: Theme,
    /// BCP 47 tag used when rendering dates and amounts on screen
    #[validate(length(min = 2, max = 35))]
    #[schema(example = "id-ID")]
    pub locale: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            locale: "id-ID".to_string(),
        }
    }
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePreferencesRequest {
    pub theme: Option<Theme>,
    pub locale: Option<String>,
}

/// File-backed preferences container.
///
/// The file is read once when the store is opened. Every mutation is written
/// back before the call returns, and the in-memory copy only changes once the
/// write succeeded.
#[derive(Debug)]
pub struct PreferencesStore {
    path: PathBuf,
    current: RwLock<Preferences>,
}

impl PreferencesStore {
    /// Opens the store, falling back to defaults when the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ServiceError> {
        let path = path.into();
        let current = match fs::read_to_string(&path) {
            Ok(raw) => {
                let prefs: Preferences = serde_json::from_str(&raw).map_err(|e| {
                    ServiceError::ValidationError(format!(
                        "preferences file {} is malformed: {}",
                        path.display(),
                        e
                    ))
                })?;
                prefs.validate()?;
                prefs
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no preferences file, using defaults");
                Preferences::default()
            }
            Err(e) => {
                return Err(ServiceError::InternalError(format!(
                    "failed to read preferences {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(Self {
            path,
            current: RwLock::new(current),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> Result<Preferences, ServiceError> {
        self.current
            .read()
            .map(|prefs| prefs.clone())
            .map_err(|_| ServiceError::InternalError("preferences lock poisoned".to_string()))
    }

    pub fn update(&self, request: UpdatePreferencesRequest) -> Result<Preferences, ServiceError> {
        self.mutate(|prefs| {
            if let Some(theme) = request.theme {
                prefs.theme = theme;
            }
            if let Some(locale) = request.locale {
                prefs.locale = locale.trim().to_string();
            }
        })
    }

    pub fn toggle_theme(&self) -> Result<Preferences, ServiceError> {
        self.mutate(|prefs| prefs.theme = prefs.theme.toggled())
    }

    fn mutate(&self, change: impl FnOnce(&mut Preferences)) -> Result<Preferences, ServiceError> {
        let mut guard = self
            .current
            .write()
            .map_err(|_| ServiceError::InternalError("preferences lock poisoned".to_string()))?;

        let mut next = guard.clone();
        change(&mut next);
        next.validate()?;
        self.persist(&next)?;

        *guard = next.clone();
        Ok(next)
    }

    fn persist(&self, prefs: &Preferences) -> Result<(), ServiceError> {
        let body = serde_json::to_vec_pretty(prefs)
            .map_err(|e| ServiceError::InternalError(format!("failed to encode preferences: {}", e)))?;
        fs::write(&self.path, body).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "failed to persist preferences");
            ServiceError::InternalError(format!(
                "failed to write preferences {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferencesStore::open(dir.path().join("prefs.json")).unwrap();
        assert_eq!(store.get().unwrap(), Preferences::default());
    }

    #[test]
    fn toggle_is_persisted_and_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let store = PreferencesStore::open(&path).unwrap();
        assert_eq!(store.toggle_theme().unwrap().theme, Theme::Dark);

        let reopened = PreferencesStore::open(&path).unwrap();
        assert_eq!(reopened.get().unwrap().theme, Theme::Dark);
        assert_eq!(reopened.toggle_theme().unwrap().theme, Theme::Light);
    }

    #[test]
    fn invalid_update_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let store = PreferencesStore::open(&path).unwrap();

        let err = store
            .update(UpdatePreferencesRequest {
                theme: Some(Theme::Dark),
                locale: Some("x".into()),
            })
            .unwrap_err();

        assert_matches!(err, ServiceError::ValidationError(_));
        assert_eq!(store.get().unwrap(), Preferences::default());
        assert!(!path.exists());
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{ not json").unwrap();
        assert_matches!(
            PreferencesStore::open(&path),
            Err(ServiceError::ValidationError(_))
        );
    }
}
