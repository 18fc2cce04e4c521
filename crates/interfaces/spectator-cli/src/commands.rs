use anyhow::Result;
use camino::Utf8PathBuf;
use spectator_app_core::{
    default_store_root, FormCommand, FormSession, FormStore, SettingsRepo, StoreRecorder,
};
use spectator_core::{EndpointField, Region, SubmissionOutcome, ValidationMode};

/// Field values and overrides for one `register` run. Unset fields stay empty.
#[derive(Default)]
pub struct RegisterArgs {
    pub base_url: Option<String>,
    pub platform_id: Option<String>,
    pub game_id: Option<String>,
    pub encryption_key: Option<String>,
    pub region: Option<Region>,
    pub strict: bool,
    pub store: Option<Utf8PathBuf>,
    pub timeout_secs: Option<u64>,
}

pub async fn cmd_register(
    args: RegisterArgs,
    settings_repo: &impl SettingsRepo,
) -> Result<SubmissionOutcome> {
    let mut settings = settings_repo.load()?;
    if args.strict {
        settings.validation = ValidationMode::Strict;
    }
    if let Some(secs) = args.timeout_secs {
        settings.dispatch_timeout_secs = Some(spectator_config::clamp_timeout_secs(secs));
    }
    let root = match args.store {
        Some(root) => root,
        None => default_store_root()?,
    };

    let session = FormSession::new(
        FormStore::default(),
        StoreRecorder::redb(root.clone()),
        settings,
    );

    // The preset goes first so explicit values win.
    if let Some(region) = args.region {
        session.dispatch(FormCommand::ApplyRegion(region));
    }
    for (field, value) in [
        (EndpointField::BaseUrl, args.base_url),
        (EndpointField::PlatformId, args.platform_id),
        (EndpointField::GameId, args.game_id),
        (EndpointField::EncryptionKey, args.encryption_key),
    ] {
        if let Some(value) = value {
            session.set_field(field, value);
        }
    }

    println!(":: Registering endpoint");
    println!("   Endpoint: {}", session.store.draft().snapshot());
    println!("   Store:    {}", root);

    let outcome = session.submit().await?;
    println!("\n:: {}", outcome_line(&outcome));
    Ok(outcome)
}

fn outcome_line(outcome: &SubmissionOutcome) -> String {
    match outcome {
        SubmissionOutcome::Accepted => "Endpoint recorded".to_string(),
        SubmissionOutcome::Rejected(reason) => format!("Rejected: {reason}"),
        SubmissionOutcome::TransportFailure(reason) => {
            format!("Recorder unavailable: {reason} (safe to retry)")
        }
        SubmissionOutcome::Invalid { field, reason } => format!("Invalid {field}: {reason}"),
    }
}

/// Process exit status for an outcome.
pub fn exit_status(outcome: &SubmissionOutcome) -> u8 {
    match outcome {
        SubmissionOutcome::Accepted => 0,
        SubmissionOutcome::Rejected(_) => 2,
        SubmissionOutcome::TransportFailure(_) => 3,
        SubmissionOutcome::Invalid { .. } => 4,
    }
}
