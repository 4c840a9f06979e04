//! stakesweep — entry point.
//!
//! One invocation sweeps every delegated stake position of one wallet back
//! into its liquid balance and exits. Exit codes:
//!
//! - 0  batch executed successfully
//! - 1  local error (bad wallet, invalid keystore, internal bug)
//! - 2  nothing to unstake
//! - 3  signing credential unavailable
//! - 4  ledger reported unsuccessful batch execution
//! - 5  network or query failure

use std::process::ExitCode;

use clap::Parser;

use sweep_client::NodeClient;
use sweep_core::{run_sweep, RunError, RunOutcome};
use sweep_wallet::WalletStore;

const EXIT_NOTHING_TO_DO: u8 = 2;
const EXIT_CREDENTIAL: u8 = 3;
const EXIT_SUBMISSION_FAILED: u8 = 4;
const EXIT_NETWORK: u8 = 5;

#[derive(Parser)]
#[command(
    name = "stakesweep",
    about = "Withdraw all delegated stake of a wallet in one batch transaction"
)]
struct Cli {
    /// Name of the local wallet to sweep.
    #[arg(long, env = "STAKESWEEP_WALLET")]
    wallet: String,

    /// Root directory of the wallet store.
    #[arg(long, default_value = "~/.stakesweep/wallets", env = "STAKESWEEP_WALLET_DIR")]
    wallet_dir: String,

    /// JSON-RPC endpoint of the ledger node.
    #[arg(long, default_value = "http://127.0.0.1:7076", env = "STAKESWEEP_NODE_URL")]
    node_url: String,

    /// Name of an environment variable holding the wallet passphrase.
    /// Needed only when the wallet's signing key is encrypted.
    #[arg(long, env = "STAKESWEEP_PASSPHRASE_ENV")]
    passphrase_env: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[arg(long, default_value = "info", env = "STAKESWEEP_LOG_LEVEL")]
    log_level: String,
}

fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn exit_code_for(error: &RunError) -> u8 {
    if error.is_credential_locked() {
        return EXIT_CREDENTIAL;
    }
    match error {
        RunError::Query { .. } | RunError::Balance(_) | RunError::Submission(_) => EXIT_NETWORK,
        RunError::Wallet(_) | RunError::Signing(_) | RunError::EmptyBatch => 1,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let store = WalletStore::open(&cli.wallet_dir);

    let ledger = match NodeClient::new(&cli.node_url) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(EXIT_NETWORK);
        }
    };

    let passphrase = match &cli.passphrase_env {
        Some(var) => match std::env::var(var) {
            Ok(value) => Some(value),
            Err(_) => {
                eprintln!("error: passphrase environment variable {var:?} is not set");
                return ExitCode::from(EXIT_CREDENTIAL);
            }
        },
        None => None,
    };

    tracing::info!(wallet = %cli.wallet, node = %cli.node_url, "starting sweep");

    match run_sweep(&ledger, &store, &cli.wallet, passphrase).await {
        Ok(RunOutcome::NothingToUnstake) => {
            println!("nothing to unstake for wallet {:?}", cli.wallet);
            ExitCode::from(EXIT_NOTHING_TO_DO)
        }
        Ok(RunOutcome::Swept(report)) => {
            if report.success {
                println!(
                    "successfully unstaked from {} delegate(s)",
                    report.instructions.len()
                );
            } else {
                println!("failed to unstake");
            }
            println!(
                "balance: {} ==> {}",
                report.balance_before, report.balance_after
            );
            if report.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_SUBMISSION_FAILED)
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}
