use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use serde::Serialize;
use storefront_data::{
    config::{self, AppConfig},
    db::{self, DbPool},
    domain::OrderStatus,
    migrator::Migrator,
    services::ServiceFactory,
    text,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Pluralize(args) => handle_pluralize(args, cli.json)?,
        Commands::Statuses => handle_statuses(cli.json)?,
        Commands::Migrate(command) => {
            let context = CliContext::initialize().await?;
            handle_migrate(&context, command, cli.json).await?;
        }
        Commands::Check => {
            let context = CliContext::initialize().await?;
            db::check_connection(&context.db)
                .await
                .context("database is not reachable")?;
            println!("Database connection OK");
        }
        Commands::Search(args) => {
            let context = CliContext::initialize().await?;
            handle_search(&context, args, cli.json).await?;
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(name = "storefront-cli", about = "Storefront data layer maintenance", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply, revert or inspect schema migrations
    #[command(subcommand)]
    Migrate(MigrateCommands),
    /// Ping the configured database
    Check,
    /// Pick the Russian plural form for a count
    Pluralize(PluralizeArgs),
    /// Print the order status code table
    Statuses,
    /// Search active products by name, description, code or barcode
    Search(SearchArgs),
}

#[derive(Subcommand)]
enum MigrateCommands {
    Up(StepsArgs),
    Down(StepsArgs),
    Status,
    /// Drop every table and re-apply all migrations
    Fresh,
}

#[derive(Args)]
struct StepsArgs {
    #[arg(long)]
    steps: Option<u32>,
}

#[derive(Args)]
struct PluralizeArgs {
    count: String,
    /// Three comma-separated forms, e.g. "товар,товара,товаров"
    endings: String,
    #[arg(long, action = ArgAction::SetTrue, help = "Decide by the last digit only")]
    last_digit: bool,
}

#[derive(Args)]
struct SearchArgs {
    query: String,
    #[arg(long, default_value_t = 20)]
    limit: usize,
}

struct CliContext {
    config: AppConfig,
    db: Arc<DbPool>,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;

        Ok(Self {
            config,
            db: Arc::new(db_pool),
        })
    }
}

async fn handle_migrate(context: &CliContext, command: MigrateCommands, json: bool) -> Result<()> {
    let db = &*context.db;
    match command {
        MigrateCommands::Up(args) => {
            Migrator::up(db, args.steps)
                .await
                .context("failed to apply migrations")?;
            println!("Migrations applied");
        }
        MigrateCommands::Down(args) => {
            db::rollback_migrations(db, args.steps.unwrap_or(1))
                .await
                .context("failed to roll back migrations")?;
            println!("Migrations rolled back");
        }
        MigrateCommands::Fresh => {
            if context.config.is_production() {
                return Err(anyhow!("refusing to drop all tables in production"));
            }
            Migrator::fresh(db).await.context("failed to refresh schema")?;
            println!("Schema recreated");
        }
        MigrateCommands::Status => {
            let applied: Vec<String> = Migrator::get_applied_migrations(db)
                .await?
                .iter()
                .map(|m| m.name().to_string())
                .collect();
            let pending: Vec<String> = Migrator::get_pending_migrations(db)
                .await?
                .iter()
                .map(|m| m.name().to_string())
                .collect();
            if json {
                print_json(&MigrationStatus { applied, pending })?;
            } else {
                for name in &applied {
                    println!("  applied  {}", name);
                }
                for name in &pending {
                    println!("  pending  {}", name);
                }
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct MigrationStatus {
    applied: Vec<String>,
    pending: Vec<String>,
}

fn handle_pluralize(args: PluralizeArgs, json: bool) -> Result<()> {
    let form = if args.last_digit {
        text::rupluralize_by_last_digit(&args.count, &args.endings)?
    } else {
        text::rupluralize(&args.count, &args.endings)?
    };
    if json {
        print_json(&serde_json::json!({ "count": args.count, "form": form }))?;
    } else {
        println!("{} {}", args.count, form);
    }
    Ok(())
}

#[derive(Serialize)]
struct StatusRow {
    code: i32,
    label: &'static str,
    is_final: bool,
}

fn handle_statuses(json: bool) -> Result<()> {
    let rows: Vec<StatusRow> = OrderStatus::all()
        .map(|status| StatusRow {
            code: status.code(),
            label: status.label(),
            is_final: status.is_final(),
        })
        .collect();
    if json {
        print_json(&rows)?;
    } else {
        for row in &rows {
            println!("{:>6}  {}", row.code, row.label);
        }
    }
    Ok(())
}

async fn handle_search(context: &CliContext, args: SearchArgs, json: bool) -> Result<()> {
    if context.config.auto_migrate {
        db::run_migrations(&context.db)
            .await
            .context("failed to apply migrations")?;
    }
    let factory = ServiceFactory::from_config(context.db.clone(), &context.config);
    let catalog = factory.catalog_service();
    catalog
        .reindex_all()
        .await
        .context("failed to build search index")?;
    let products = catalog
        .search(&args.query, Some(args.limit))
        .await
        .context("search failed")?;

    if json {
        print_json(&products)?;
    } else if products.is_empty() {
        println!("Nothing found");
    } else {
        for product in &products {
            println!(
                "- {} • {} • {} {}",
                product.code, product.name, product.price, context.config.default_currency
            );
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
