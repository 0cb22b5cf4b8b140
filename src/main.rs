use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use reimburse_rate::cli::Command;
use reimburse_rate::config::Config;
use reimburse_rate::logging::init_tracing;
use reimburse_rate::policy::{DistanceUnit, InMemoryPolicyStore, Policy, PolicyStore};
use reimburse_rate::sync::{NetworkStatus, RateSyncController, SyncSettings};

/// Edit a workspace's distance reimbursement rate from the terminal.
///
/// Commands are read from stdin, one per line: `rate <text>`, `key <name>`,
/// `unit km|mi`, `offline`, `online`, `show`, `errors`, `clear`, `quit`.
#[derive(Parser, Debug)]
#[command(name = "reimburse-rate", version)]
struct Cli {
    /// Policy JSON file; updated in place on exit.
    #[arg(long)]
    policy: PathBuf,

    /// Config file (defaults to the user config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Locale decimal separator, overriding the config.
    #[arg(long)]
    separator: Option<char>,

    /// Debounce window in milliseconds, overriding the config.
    #[arg(long)]
    debounce_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(separator) = cli.separator {
        config.locale.decimal_separator = separator.to_string();
    }
    if let Some(debounce_ms) = cli.debounce_ms {
        config.sync.debounce_ms = debounce_ms;
    }
    config.validate()?;

    init_tracing(&config.logging.filter);

    let policy = Policy::load_from(&cli.policy)?;
    let store = Arc::new(InMemoryPolicyStore::new(policy));
    let controller = Arc::new(
        RateSyncController::mount(store.clone(), &SyncSettings::from(&config))
            .context("failed to start rate controller")?,
    );
    let listener = controller.listen();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match command {
            Command::Rate(text) => controller.set_rate(&text),
            Command::Key(key) => controller.on_key_navigate(&key),
            Command::Unit(unit) => controller.set_unit(unit),
            Command::Offline => {
                store.set_offline(true);
                controller.on_network_change(NetworkStatus { is_offline: true });
            }
            Command::Online => {
                store.set_offline(false);
                controller.on_network_change(NetworkStatus { is_offline: false });
            }
            Command::Show => {
                controller.on_policy_changed(store.snapshot());
                let state = controller.state();
                let units: Vec<&str> = DistanceUnit::ALL.iter().map(DistanceUnit::as_str).collect();
                println!(
                    "rate={} {} unit={} ({}) pending_commit={}",
                    state.unit_rate_value,
                    state.output_currency,
                    state.unit_value,
                    units.join("|"),
                    controller.has_pending_commit()
                );
            }
            Command::Errors => {
                let feedback = controller.field_feedback();
                println!("pending_action={:?}", feedback.pending_action);
                for (key, message) in feedback.errors {
                    println!("  {}: {}", key, message);
                }
            }
            Command::Clear => controller.clear_errors(),
            Command::Quit => break,
        }
    }

    controller.flush_pending();
    listener.abort();
    drop(controller);

    let policy = store.policy();
    policy.save_to(&cli.policy)?;
    println!("{}", serde_json::to_string_pretty(&*policy)?);
    Ok(())
}
