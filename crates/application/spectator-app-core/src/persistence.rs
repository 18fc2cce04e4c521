use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use directories::ProjectDirs;
use spectator_config::{PROJECT_APP, PROJECT_ORG, PROJECT_QUALIFIER, SETTINGS_FILENAME};

use crate::domain::FormSettings;
use crate::ports::SettingsRepo;

/// Settings file storage. Uses the platform config directory unless pinned to one.
#[derive(Debug, Clone, Default)]
pub struct FilePersistence {
    config_dir: Option<PathBuf>,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(PROJECT_QUALIFIER, PROJECT_ORG, PROJECT_APP)
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

/// Default root directory of the endpoint store.
pub fn default_store_root() -> Result<Utf8PathBuf> {
    let dirs = project_dirs()?;
    Utf8PathBuf::from_path_buf(dirs.data_dir().to_path_buf())
        .map_err(|p| anyhow::anyhow!("Data directory is not valid UTF-8: {}", p.display()))
}

impl FilePersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: Some(dir.into()),
        }
    }

    fn config_dir(&self) -> Result<PathBuf> {
        let config_dir = match &self.config_dir {
            Some(dir) => dir.clone(),
            None => project_dirs()?.config_dir().to_path_buf(),
        };
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }
        Ok(config_dir)
    }

    pub fn settings_path(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join(SETTINGS_FILENAME))
    }

    pub fn load_settings(&self) -> Result<FormSettings> {
        let path = self.settings_path()?;
        if !path.exists() {
            return Ok(FormSettings::default());
        }
        let content = fs::read_to_string(&path).context("Failed to read settings")?;
        let settings: FormSettings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings {}", path.display()))?;
        Ok(settings)
    }

    pub fn save_settings(&self, settings: &FormSettings) -> Result<()> {
        let path = self.settings_path()?;
        let json = serde_json::to_string_pretty(settings)?;
        atomic_write(&path, json.as_bytes()).context("Failed to write settings")?;
        tracing::debug!("saved settings to {}", path.display());
        Ok(())
    }
}

impl SettingsRepo for FilePersistence {
    fn load(&self) -> Result<FormSettings> {
        self.load_settings()
    }

    fn save(&self, settings: &FormSettings) -> Result<()> {
        self.save_settings(settings)
    }
}

fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp_path = {
        let mut name = path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    };

    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("Failed to create temp file {}", tmp_path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write temp file {}", tmp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("Failed to sync temp file {}", tmp_path.display()))?;
    drop(file);

    match fs::rename(&tmp_path, path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            fs::remove_file(path).ok();
            fs::rename(&tmp_path, path)
                .with_context(|| format!("Failed to replace {}", path.display()))?;
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!(
                    "Failed to rename {} to {}",
                    tmp_path.display(),
                    path.display()
                )
            });
        }
    }

    if let Some(parent) = path.parent() {
        if let Ok(dir) = fs::File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use spectator_core::ValidationMode;

    use super::*;
    use crate::domain::ResetPolicy;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = FilePersistence::in_dir(dir.path());
        assert_eq!(persistence.load_settings().unwrap(), FormSettings::default());
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = FilePersistence::in_dir(dir.path().join("nested"));
        let settings = FormSettings {
            validation: ValidationMode::Strict,
            reset_policy: ResetPolicy::ClearOnAccept,
            dispatch_timeout_secs: Some(15),
        };
        persistence.save_settings(&settings).unwrap();

        assert_eq!(persistence.load_settings().unwrap(), settings);
        assert!(!dir.path().join("nested/settings.json.tmp").exists());

        let raw = fs::read_to_string(dir.path().join("nested/settings.json")).unwrap();
        assert!(raw.contains("\"clear_on_accept\""));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILENAME), r#"{"validation":"strict"}"#).unwrap();
        let settings = FilePersistence::in_dir(dir.path()).load_settings().unwrap();
        assert_eq!(settings.validation, ValidationMode::Strict);
        assert_eq!(settings.reset_policy, ResetPolicy::Keep);
        assert_eq!(settings.dispatch_timeout_secs, None);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILENAME), "{not json").unwrap();
        assert!(FilePersistence::in_dir(dir.path()).load_settings().is_err());
    }
}
