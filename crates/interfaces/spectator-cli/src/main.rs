use std::path::PathBuf;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use spectator_app_core::FilePersistence;
use spectator_cli::commands::{self, RegisterArgs};
use spectator_cli::settings::{self, SettingsUpdate};
use spectator_cli::{CliResetPolicy, CliValidation};
use spectator_core::Region;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Directory holding settings.json (defaults to the platform config directory)
    #[arg(long, global = true, env = "SPECTATOR_CONFIG_DIR")]
    config_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record one custom spectator endpoint
    Register {
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long)]
        platform_id: Option<String>,
        #[arg(long)]
        game_id: Option<String>,
        #[arg(long, env = "SPECTATOR_ENCRYPTION_KEY", hide_env_values = true)]
        encryption_key: Option<String>,
        #[arg(long, help = "Fill base URL and platform ID from a region (kr, euw1, na1)")]
        region: Option<Region>,
        #[arg(long, help = "Check and normalize fields before recording")]
        strict: bool,
        #[arg(long, help = "Endpoint store directory")]
        store: Option<Utf8PathBuf>,
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Show or change form settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    Show,
    Set {
        #[arg(long, value_enum)]
        validation: Option<CliValidation>,
        #[arg(long, value_enum)]
        reset_policy: Option<CliResetPolicy>,
        #[arg(long, conflicts_with = "no_timeout")]
        timeout_secs: Option<u64>,
        #[arg(long)]
        no_timeout: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let builder = FmtSubscriber::builder().with_writer(std::io::stderr);
    if std::env::var_os("RUST_LOG").is_some() {
        let subscriber = builder.with_env_filter(EnvFilter::from_default_env()).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = builder.with_max_level(level).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    let persistence = match cli.config_dir {
        Some(dir) => FilePersistence::in_dir(dir),
        None => FilePersistence::new(),
    };

    match cli.command {
        Commands::Register {
            base_url,
            platform_id,
            game_id,
            encryption_key,
            region,
            strict,
            store,
            timeout_secs,
        } => {
            let args = RegisterArgs {
                base_url,
                platform_id,
                game_id,
                encryption_key,
                region,
                strict,
                store,
                timeout_secs,
            };
            let outcome = commands::cmd_register(args, &persistence).await?;
            return Ok(ExitCode::from(commands::exit_status(&outcome)));
        }
        Commands::Settings { command } => match command {
            SettingsCommands::Show => settings::handle_show(&persistence)?,
            SettingsCommands::Set {
                validation,
                reset_policy,
                timeout_secs,
                no_timeout,
            } => {
                settings::handle_set(
                    &persistence,
                    SettingsUpdate {
                        validation,
                        reset_policy,
                        timeout_secs,
                        no_timeout,
                    },
                )?;
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}
