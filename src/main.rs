use clap::Parser;
use finance_tracker::args::{
    Args, Command, DeleteSubcommand, InsertSubcommand, ListSubcommand, UpdateSubcommand,
};
use finance_tracker::{commands, error_type, Config, ErrorType, IntoResult, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match error_type(&e) {
                Some(t) => error!("Exiting with {t} error: {e}"),
                None => error!("Exiting with error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().finance_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Insert(insert_args) => {
            let config = load_config(home).await?;
            match insert_args.entity() {
                InsertSubcommand::Transaction(args) => {
                    commands::insert_transaction(config, args.clone())
                        .await?
                        .print()
                }
                InsertSubcommand::Category(args) => commands::insert_category(config, args.clone())
                    .await?
                    .print(),
            }
        }

        Command::Update(update_args) => {
            let config = load_config(home).await?;
            match update_args.entity() {
                UpdateSubcommand::Transaction(args) => {
                    commands::update_transaction(config, args.clone())
                        .await?
                        .print()
                }
                UpdateSubcommand::Category(args) => commands::update_category(config, args.clone())
                    .await?
                    .print(),
            }
        }

        Command::Delete(delete_args) => {
            let config = load_config(home).await?;
            match delete_args.entity() {
                DeleteSubcommand::Transaction(args) => {
                    commands::delete_transaction(config, args.clone())
                        .await?
                        .print()
                }
                DeleteSubcommand::Category(args) => commands::delete_category(config, args.clone())
                    .await?
                    .print(),
            }
        }

        Command::List(list_args) => {
            let config = load_config(home).await?;
            match list_args.entity() {
                ListSubcommand::Transactions(args) => {
                    commands::list_transactions(config, args.clone())
                        .await?
                        .print()
                }
                ListSubcommand::Categories(args) => commands::list_categories(config, args.clone())
                    .await?
                    .print(),
            }
        }

        Command::Summary(summary_args) => {
            let config = load_config(home).await?;
            commands::monthly_summary(config, summary_args.clone())
                .await?
                .print()
        }

        Command::Forecast(forecast_args) => {
            let config = load_config(home).await?;
            commands::forecast_expense(config, forecast_args.clone())
                .await?
                .print()
        }

        Command::Mcp(_mcp_args) => commands::mcp(load_config(home).await?).await?.print(),
    };
    Ok(())
}

async fn load_config(home: &Path) -> Result<Config> {
    Config::load(home).await.pub_result(ErrorType::Config)
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                "finance_tracker",
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
