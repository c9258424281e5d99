//! DeFi insurance command line client.
//!
//! # Architecture Overview
//!
//! ```text
//!   insurance-cli ──▶ InsuranceApp ──▶ WalletConnector ──▶ WalletProvider (local key)
//!                         │
//!                         ├──▶ PlanCatalog ──────────────┐
//!                         ├──▶ PolicyPurchaseFlow ───────┼──▶ ContractClient ──▶ JSON-RPC
//!                         └──▶ ClaimSubmissionFlow ──────┘
//! ```
//!
//! Every command runs in its own session: commands that act for an account
//! connect the wallet first.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use defi_insurance::catalog::PlanId;
use defi_insurance::claims::ClaimForm;
use defi_insurance::config::{load_config, loader::default_config};
use defi_insurance::format::{format_currency_str, format_date, format_eth, truncate_address};
use defi_insurance::observability::{logging, metrics};
use defi_insurance::InsuranceApp;

#[derive(Parser)]
#[command(name = "insurance-cli")]
#[command(about = "Browse, buy and claim DeFi insurance policies", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available insurance plans
    Plans,
    /// Connect the wallet and show the active account
    Connect,
    /// List plans owned by the connected account
    Owned,
    /// Buy an insurance plan
    Buy {
        /// Plan ID
        plan: u64,
    },
    /// Submit a claim against a policy
    Claim {
        #[arg(long)]
        policy: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        evidence: String,
    },
    /// List claims filed by the connected account
    Claims,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => default_config()?,
    };

    logging::init_logging(&config.observability);
    tracing::debug!(plans = config.plans.len(), "Configuration loaded");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let app = InsuranceApp::from_config(&config).await?;

    match cli.command {
        Commands::Plans => {
            for plan in app.plans().await? {
                let coverage =
                    format_currency_str(&plan.coverage_amount).unwrap_or_else(|| plan.coverage_amount.clone());
                println!("[{}] {} {}", plan.id, plan.icon, plan.name);
                println!("    {}", plan.description);
                println!(
                    "    Coverage {} | Premium {} ETH | {} days",
                    coverage, plan.premium, plan.duration_days
                );
            }
        }
        Commands::Connect => {
            let account = app.connect().await?;
            println!("Connected: {}", account.short());
            println!("Owned policies: {}", app.owned().len());
        }
        Commands::Owned => {
            app.connect().await?;
            let owned = app.refresh_owned().await?;
            if owned.is_empty() {
                println!("No policies owned");
            }
            for id in owned {
                if let Some(plan) = app.catalog().find_plan(id) {
                    println!("[{}] {} {}", plan.id, plan.icon, plan.name);
                }
            }
        }
        Commands::Buy { plan } => {
            app.connect().await?;
            let receipt = app.purchase(PlanId(plan)).await?;
            println!(
                "Policy purchased: plan {} in block {} (tx {})",
                receipt.plan_id,
                receipt.block_number,
                truncate_address(&receipt.tx_hash.to_string())
            );
            if let Some(event) = receipt.event {
                println!(
                    "Policy #{} created, premium {} ETH",
                    event.policy_id,
                    format_eth(event.premium)
                );
            }
        }
        Commands::Claim {
            policy,
            amount,
            reason,
            evidence,
        } => {
            app.connect().await?;
            let form = ClaimForm {
                policy_id: policy,
                amount,
                reason,
                evidence,
            };
            let claim = app.submit_claim(&form).await?;
            println!("Claim #{} submitted for policy {} ({})", claim.id, claim.policy_id, claim.status);
        }
        Commands::Claims => {
            app.connect().await?;
            let claims = app.claims();
            if claims.is_empty() {
                println!("No claims filed");
            }
            for claim in claims {
                println!(
                    "#{} policy {} | {} | {} ETH | {} | {}",
                    claim.id,
                    claim.policy_id,
                    format_date(&claim.date),
                    claim.amount,
                    claim.status,
                    claim.reason
                );
            }
        }
    }

    Ok(())
}
