use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use project_ledger::cli::{self, Cli, CliCommand};
use project_ledger::config::AppConfig;
use project_ledger::db::Database;
use project_ledger::service::ProjectService;

/// Initialize tracing on stderr so stdout carries only command output
fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
        config
            .log_filter
            .clone()
            .unwrap_or_else(|| "project_ledger=info".into())
    }));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load();
    init_tracing(&config);

    match cli.command {
        CliCommand::Config {
            database_path,
            log_filter,
        } => {
            if cli::apply_config_flags(&mut config, database_path, log_filter) {
                config.save().context("Failed to save config")?;
                tracing::info!("Configuration saved");
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        CliCommand::Project(command) => {
            let path = config.resolve_database_path(cli.database)?;
            let db = Database::open(path.clone())
                .with_context(|| format!("Failed to open database at {}", path.display()))?;
            db.initialize().context("Failed to create schema")?;

            let service = ProjectService::new(db);
            let output = cli::execute(command, &service, cli.json)?;
            println!("{}", output);
        }
    }

    Ok(())
}
