use anyhow::{bail, Result};
use spectator_app_core::{FilePersistence, FormSettings, SettingsRepo};

use crate::{CliResetPolicy, CliValidation};

#[derive(Debug, Default)]
pub struct SettingsUpdate {
    pub validation: Option<CliValidation>,
    pub reset_policy: Option<CliResetPolicy>,
    pub timeout_secs: Option<u64>,
    pub no_timeout: bool,
}

impl SettingsUpdate {
    pub fn apply(&self, settings: &mut FormSettings) -> Result<()> {
        if self.no_timeout && self.timeout_secs.is_some() {
            bail!("--timeout-secs and --no-timeout cannot be combined");
        }
        if let Some(v) = self.validation {
            settings.validation = v.into();
        }
        if let Some(p) = self.reset_policy {
            settings.reset_policy = p.into();
        }
        if let Some(secs) = self.timeout_secs {
            settings.dispatch_timeout_secs = Some(spectator_config::clamp_timeout_secs(secs));
        }
        if self.no_timeout {
            settings.dispatch_timeout_secs = None;
        }
        Ok(())
    }
}

pub fn handle_show(persistence: &FilePersistence) -> Result<()> {
    let settings = persistence.load()?;
    println!(":: Settings ({})", persistence.settings_path()?.display());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

pub fn handle_set(repo: &impl SettingsRepo, update: SettingsUpdate) -> Result<FormSettings> {
    let mut settings = repo.load()?;
    update.apply(&mut settings)?;
    repo.save(&settings)?;
    println!(":: Settings saved");
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(settings)
}
