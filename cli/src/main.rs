//! lattice-wallet: inspect accounts and prepare blocks for an offline signer.

use clap::Parser;
use lattice_types::{Account, DecimalAmount, Denomination};
use lattice_utils::LogFormat;
use lattice_wallet_core::{
    Blake2bHasher, MemoryAddressBook, NodeClient, SendIntent, Severity, SigningEnvelope,
    WalletConfig, WalletEngine, WalletError,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "lattice-wallet", about = "Block-lattice wallet engine")]
struct Cli {
    /// Node JSON-RPC endpoint.
    #[arg(long, env = "LATTICE_NODE_URL")]
    node_url: Option<String>,

    /// Hide pending credits below this many whole units.
    #[arg(long, env = "LATTICE_MINIMUM_RECEIVE")]
    minimum_receive: Option<String>,

    /// Representative for accounts that have none yet.
    #[arg(long, env = "LATTICE_DEFAULT_REPRESENTATIVE")]
    default_representative: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "LATTICE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "LATTICE_LOG_FORMAT")]
    log_format: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print balance, pending credits and history for an account.
    Account {
        account: String,
        /// Extra history pages to load after the first.
        #[arg(long, default_value_t = 0)]
        more: u32,
    },
    /// Build a send block and print its `nanosign:` payload.
    Send {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Amount in `denomination`. Omit with `--max`.
        #[arg(long, required_unless_present = "max")]
        amount: Option<DecimalAmount>,
        #[arg(long)]
        denomination: Option<Denomination>,
        /// Send the whole balance.
        #[arg(long, conflicts_with = "amount")]
        max: bool,
    },
    /// Check a `nanosign:` payload the way an offline signer would.
    VerifyEnvelope { payload: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (file_config, load_error) = match cli.config.as_ref() {
        Some(path) => match WalletConfig::from_toml_file(path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (WalletConfig::default(), Some((path.clone(), e))),
        },
        None => (WalletConfig::default(), None),
    };

    let config = WalletConfig {
        node_url: cli.node_url.unwrap_or(file_config.node_url.clone()),
        minimum_receive: cli.minimum_receive.or(file_config.minimum_receive.clone()),
        default_representative: cli
            .default_representative
            .or(file_config.default_representative.clone()),
        log_level: cli.log_level.unwrap_or(file_config.log_level.clone()),
        log_format: cli.log_format.unwrap_or(file_config.log_format.clone()),
        ..file_config
    };

    let format = config.log_format.parse::<LogFormat>().unwrap_or_default();
    lattice_utils::init_logging(format, &config.log_level);
    match (cli.config.as_ref(), load_error) {
        (_, Some((path, e))) => {
            tracing::warn!("Failed to load config {}: {e}, using defaults", path.display())
        }
        (Some(path), None) => tracing::info!("Loaded config from {}", path.display()),
        (None, None) => {}
    }

    if let Command::VerifyEnvelope { payload } = &cli.command {
        return verify_envelope(payload).map_err(explain);
    }

    let ledger = NodeClient::new(config.node_url.clone(), config.request_timeout())
        .map_err(explain)?;
    let representatives = config.representative_directory();
    let engine = WalletEngine::new(
        config,
        Arc::new(ledger),
        Arc::new(MemoryAddressBook::new()),
        representatives,
    );

    let on_signal = engine.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received, cancelling requests");
            on_signal.shutdown();
        }
    });

    let result = match cli.command {
        Command::Account { account, more } => show_account(&engine, &account, more).await,
        Command::Send {
            from,
            to,
            amount,
            denomination,
            max,
        } => {
            let denomination = denomination.unwrap_or(engine.config().default_denomination);
            send(&engine, &from, &to, amount, denomination, max).await
        }
        Command::VerifyEnvelope { .. } => Ok(()),
    };
    result.map_err(explain)
}

/// One line for the user, with the underlying cause attached.
fn explain(err: WalletError) -> anyhow::Error {
    let notice = err.notice();
    match notice.severity {
        Severity::Warning => tracing::warn!(%err, "{}", notice.message),
        Severity::Error => tracing::error!(%err, "{}", notice.message),
    }
    anyhow::Error::new(err).context(notice.message)
}

fn print_json(value: &serde_json::Value) -> Result<(), WalletError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| WalletError::Encoding(e.to_string()))?;
    println!("{text}");
    Ok(())
}

async fn show_account(engine: &WalletEngine, account: &str, more: u32) -> Result<(), WalletError> {
    let mut session = engine.open_session(Account::from_input(account));
    session.load_account_details(false).await?;
    for _ in 0..more {
        if !session.load_more().await? {
            break;
        }
    }

    let denomination = engine.config().default_denomination;
    let state = session.state();
    print_json(&serde_json::json!({
        "account": session.share_payload(),
        "denomination": denomination,
        "balance": state.map(|s| s.balance(denomination)),
        "pending": state.map(|s| s.pending(denomination)),
        "state": state,
        "representative_label": session.representative_label(),
        "pending_entries": session.pending(),
        "history": session.history(),
        "page_size": session.page_size(),
    }))
}

async fn send(
    engine: &WalletEngine,
    from: &str,
    to: &str,
    amount: Option<DecimalAmount>,
    denomination: Denomination,
    max: bool,
) -> Result<(), WalletError> {
    let from = Account::from_input(from);
    let to = Account::from_input(to);
    let mut session = engine.open_session(from.clone());

    let intent = if max {
        session.load_account_details(false).await?;
        session
            .max_send_intent(to, denomination)
            .ok_or_else(|| WalletError::AccountNotFound(from.to_string()))?
    } else {
        let amount = amount.ok_or(WalletError::AmountNonPositive)?;
        SendIntent::new(from, to, amount, denomination)
    };

    let draft = session.prepare_send(&intent).await?;
    print_json(&serde_json::json!({
        "hash": draft.hash,
        "raw_amount": draft.raw_amount,
        "residual_raw": draft.residual_raw,
        "destination_status": draft.destination_status,
        "payload": draft.payload,
    }))
}

fn verify_envelope(payload: &str) -> Result<(), WalletError> {
    let envelope = SigningEnvelope::parse(payload.trim())?;
    let previous = envelope.verify_previous(&Blake2bHasher)?;
    let hash = envelope.block_hash(&Blake2bHasher)?;
    tracing::info!(%hash, %previous, "envelope verified");
    print_json(&serde_json::json!({
        "hash": hash,
        "previous": previous,
        "block": envelope.block,
    }))
}
