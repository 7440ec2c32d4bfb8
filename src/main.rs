use anyhow::Result;
use clap::{Parser, Subcommand};

use mintline::config::{config, MintlineConfig};
use mintline::ledger::{Hbar, InMemoryLedger};
use mintline::telemetry;
use mintline::workflows::{FungibleRun, NftRun, TransferWorkflow};

#[derive(Parser)]
#[command(name = "mintline")]
#[command(about = "Token transfer walkthroughs against a named ledger environment")]
#[command(
    long_about = "Mintline walks a ledger through the full life of a token: it creates a \
                  treasury and a receiver account, registers a fungible token or mints an \
                  NFT, opts the receiver in, and moves value across, printing balances \
                  before and after. Operator credentials come from the environment or a \
                  mintline.toml file."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fungible token and transfer units from its treasury to a second account
    TransferToken {
        /// Display name for the token
        #[arg(long, default_value = "USD Bar")]
        token_name: String,
        /// Ticker symbol for the token
        #[arg(long, default_value = "USDB")]
        token_symbol: String,
        /// Decimal precision of one unit
        #[arg(long, default_value_t = 2)]
        decimals: u32,
        /// Units minted to the treasury at creation
        #[arg(long, default_value_t = 10_000)]
        initial_supply: u64,
        /// Units moved from the treasury to the receiver
        #[arg(long, default_value_t = 2_500)]
        amount: u64,
        /// Starting hbar balance for each created account
        #[arg(long, default_value_t = 10)]
        starting_balance: i64,
        /// Print the run report as JSON instead of a transcript
        #[arg(long)]
        json: bool,
    },
    /// Mint a one-of-a-kind NFT and hand it from its treasury to a second account
    TransferNft {
        /// Display name for the NFT collection
        #[arg(long, default_value = "diploma")]
        token_name: String,
        /// Ticker symbol for the NFT collection
        #[arg(long, default_value = "GRAD")]
        token_symbol: String,
        /// Hard cap on the number of serials that can ever be minted
        #[arg(long, default_value_t = 250)]
        max_supply: u64,
        /// Content identifier stored as the minted serial's metadata
        #[arg(long, default_value = "QmTzWcVfk88JRqjTpVwHzBeULRTNzHY7mnBSG42CpwHmPa")]
        metadata: String,
        /// Starting hbar balance for each created account
        #[arg(long, default_value_t = 10)]
        starting_balance: i64,
        /// Print the run report as JSON instead of a transcript
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    MintlineConfig::load_env_file()?;
    telemetry::init_telemetry()?;

    match cli.command {
        Commands::TransferToken {
            token_name,
            token_symbol,
            decimals,
            initial_supply,
            amount,
            starting_balance,
            json,
        } => {
            let run = FungibleRun {
                token_name,
                token_symbol,
                decimals,
                initial_supply,
                transfer_amount: amount,
                starting_balance: Hbar::new(starting_balance),
            };
            tokio::runtime::Runtime::new()?.block_on(async { transfer_token_command(run, json).await })
        }
        Commands::TransferNft {
            token_name,
            token_symbol,
            max_supply,
            metadata,
            starting_balance,
            json,
        } => {
            let run = NftRun {
                token_name,
                token_symbol,
                max_supply,
                metadata_cid: metadata,
                starting_balance: Hbar::new(starting_balance),
            };
            tokio::runtime::Runtime::new()?.block_on(async { transfer_nft_command(run, json).await })
        }
    }
}

async fn transfer_token_command(run: FungibleRun, json: bool) -> Result<()> {
    let config = config()?;
    let (operator_id, operator_key) = config.operator_credentials()?;
    if !json {
        println!("The operator account ID is = {operator_id}");
        println!("The operator private key is = {operator_key}");
    }

    let client = InMemoryLedger::bootstrap(
        config.network.name.clone(),
        operator_id,
        operator_key.public_key(),
    );
    let workflow = TransferWorkflow::new(client).with_announcements(!json);
    let report = workflow.run_fungible(&run).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

async fn transfer_nft_command(run: NftRun, json: bool) -> Result<()> {
    let config = config()?;
    let (operator_id, operator_key) = config.operator_credentials()?;
    if !json {
        println!("The operator account ID is = {operator_id}");
        println!("The operator private key is = {operator_key}");
    }

    let client = InMemoryLedger::bootstrap(
        config.network.name.clone(),
        operator_id,
        operator_key.public_key(),
    );
    let workflow = TransferWorkflow::new(client).with_announcements(!json);
    let report = workflow.run_nft(&run).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
