pub mod commands;
pub mod settings;

use clap::ValueEnum;
use spectator_app_core::ResetPolicy;
use spectator_core::ValidationMode;

#[derive(ValueEnum, Clone, Debug, Copy)]
pub enum CliValidation {
    Lenient,
    Strict,
}

impl From<CliValidation> for ValidationMode {
    fn from(v: CliValidation) -> Self {
        match v {
            CliValidation::Lenient => ValidationMode::Lenient,
            CliValidation::Strict => ValidationMode::Strict,
        }
    }
}

#[derive(ValueEnum, Clone, Debug, Copy)]
pub enum CliResetPolicy {
    Keep,
    ClearOnAccept,
}

impl From<CliResetPolicy> for ResetPolicy {
    fn from(p: CliResetPolicy) -> Self {
        match p {
            CliResetPolicy::Keep => ResetPolicy::Keep,
            CliResetPolicy::ClearOnAccept => ResetPolicy::ClearOnAccept,
        }
    }
}
