//! Bank command-line client

use anyhow::Result;
use bank_client::{describe_error, render_snapshot, render_update, BankClient};
use bank_config::ClientConfig;
use clap::{Parser, Subcommand};
use network::RpcResult;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use types::{AccountNumber, AccountSnapshot, Currency, Money};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server address (host:port)
    #[arg(short, long)]
    server: Option<String>,

    /// Probability of discarding each received reply
    #[arg(long)]
    loss: Option<f64>,

    /// Seed for the loss injection RNG
    #[arg(long)]
    loss_seed: Option<u64>,

    /// Wait before resending an unanswered request
    #[arg(long)]
    retry_timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a new account
    Open {
        #[arg(long)]
        name: String,
        #[arg(long)]
        currency: Currency,
        #[arg(long)]
        password: String,
        #[arg(long)]
        amount: Money,
    },
    /// Deposit funds, converted into the account currency
    Deposit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        account: AccountNumber,
        #[arg(long)]
        password: String,
        #[arg(long)]
        currency: Currency,
        #[arg(long)]
        amount: Money,
    },
    /// Withdraw funds, converted into the account currency
    Withdraw {
        #[arg(long)]
        name: String,
        #[arg(long)]
        account: AccountNumber,
        #[arg(long)]
        password: String,
        #[arg(long)]
        currency: Currency,
        #[arg(long)]
        amount: Money,
    },
    /// Move funds to another account
    Transfer {
        #[arg(long)]
        name: String,
        #[arg(long)]
        account: AccountNumber,
        #[arg(long)]
        password: String,
        #[arg(long)]
        to: AccountNumber,
        #[arg(long)]
        currency: Currency,
        #[arg(long)]
        amount: Money,
    },
    /// Close an account
    Close {
        #[arg(long)]
        account: AccountNumber,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
    },
    /// Show an account balance
    Balance {
        #[arg(long)]
        account: AccountNumber,
        #[arg(long)]
        password: String,
    },
    /// Print every account change for a while
    Monitor {
        #[arg(long, default_value_t = 60)]
        seconds: u64,
    },
}

impl Args {
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::load(self.config.as_deref())?;
        if let Some(server) = &self.server {
            config.server_address = server.clone();
        }
        if let Some(loss) = self.loss {
            config.loss_probability = loss;
        }
        if let Some(seed) = self.loss_seed {
            config.loss_seed = Some(seed);
        }
        if let Some(timeout) = self.retry_timeout_ms {
            config.retry_timeout_ms = timeout;
        }
        config.validate()?;
        Ok(config)
    }
}

async fn run(client: &BankClient, command: Command) -> RpcResult<Option<AccountSnapshot>> {
    let snapshot = match command {
        Command::Open {
            name,
            currency,
            password,
            amount,
        } => client.open_account(&name, currency, &password, amount).await?,
        Command::Deposit {
            name,
            account,
            password,
            currency,
            amount,
        } => client.deposit(&name, account, &password, currency, amount).await?,
        Command::Withdraw {
            name,
            account,
            password,
            currency,
            amount,
        } => client.withdraw(&name, account, &password, currency, amount).await?,
        Command::Transfer {
            name,
            account,
            password,
            to,
            currency,
            amount,
        } => {
            client
                .transfer(&name, account, &password, to, currency, amount)
                .await?
        }
        Command::Close {
            account,
            name,
            password,
        } => client.close_account(account, &name, &password).await?,
        Command::Balance { account, password } => client.balance(account, &password).await?,
        Command::Monitor { seconds } => {
            println!("Monitoring account updates for {} seconds...", seconds);
            let pushes = client
                .monitor(Duration::from_secs(seconds), |update| {
                    println!("{}", render_update(&update));
                })
                .await?;
            println!("Monitoring ended after {} updates", pushes);
            return Ok(None);
        }
    };
    Ok(Some(snapshot))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bank_client=info,network=warn,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = args.client_config()?;
    let client = BankClient::from_config(&config)?;

    let outcome = run(&client, args.command).await;
    let stats = client.stats();
    info!(
        "attempts={} retries={} dropped_replies={}",
        stats.attempts, stats.retries, stats.dropped_replies
    );

    match outcome {
        Ok(Some(snapshot)) => println!("{}", render_snapshot(&snapshot)),
        Ok(None) => {}
        Err(e) => {
            eprintln!("{}", describe_error(&e));
            std::process::exit(1);
        }
    }
    Ok(())
}
