use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use logistics_tracking::{
    commands::shipments::create_shipment_command::CreateShipmentCommand,
    common::now,
    config::{self, AppConfig},
    db,
    events::{process_events, EventSender},
    models::{shipment, ShipmentStatus},
    queries::status_history::StatusEvent,
    seed, AppState,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::task::JoinHandle;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize().await?;

    let outcome = match cli.command {
        Commands::Migrate(args) => handle_migrate(&context, args).await,
        Commands::Seed(args) => handle_seed(&context, args, cli.json).await,
        Commands::Shipment(command) => handle_shipment_command(&context, command, cli.json).await,
        Commands::Inventory(command) => {
            handle_inventory_command(&context, command, cli.json).await
        }
    };

    context.shutdown().await;
    outcome
}

#[derive(Parser)]
#[command(
    name = "logistics-cli",
    about = "Manage shipments, status tracking and warehouse inventory",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply schema migrations (development and test only)
    Migrate(MigrateArgs),
    /// Insert demo data (development and test only)
    Seed(SeedArgs),
    #[command(subcommand)]
    Shipment(ShipmentCommands),
    #[command(subcommand)]
    Inventory(InventoryCommands),
}

#[derive(Args)]
struct MigrateArgs {
    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Drop every table before migrating"
    )]
    fresh: bool,
}

#[derive(Args)]
struct SeedArgs {
    #[arg(
        long,
        env = "SEED_ADMIN_PASSWORD",
        default_value = "change-me-admin",
        help = "Password for the demo admin account"
    )]
    admin_password: String,
}

#[derive(Subcommand)]
enum ShipmentCommands {
    Create(ShipmentCreateArgs),
    Transition(ShipmentTransitionArgs),
    History(ShipmentIdArgs),
    Show(ShipmentIdArgs),
    List(ShipmentListArgs),
}

#[derive(Args)]
struct ShipmentCreateArgs {
    #[arg(long)]
    customer_id: Option<i32>,
    #[arg(long)]
    warehouse_id: Option<i32>,
    #[arg(long)]
    route_id: Option<i32>,
    #[arg(long)]
    driver_id: Option<i32>,
    #[arg(long)]
    vehicle_id: Option<i32>,
    #[arg(long, default_value = "0", help = "Amount with at most two decimals")]
    total_amount: Decimal,
    #[arg(long, help = "RFC 3339 timestamp, e.g. 2025-06-01T12:00:00Z")]
    estimated_delivery: Option<DateTime<Utc>>,
}

#[derive(Args)]
struct ShipmentTransitionArgs {
    #[arg(long)]
    id: i32,
    #[arg(
        long,
        help = "One of pending, in_transit, delivered, cancelled, delayed"
    )]
    status: String,
    #[arg(long)]
    location: Option<String>,
    #[arg(long, help = "RFC 3339 timestamp; defaults to now")]
    at: Option<DateTime<Utc>>,
}

#[derive(Args)]
struct ShipmentIdArgs {
    #[arg(long)]
    id: i32,
}

#[derive(Args)]
struct ShipmentListArgs {
    #[arg(long, default_value_t = 1)]
    page: u64,
    #[arg(long, default_value_t = 20)]
    limit: u64,
    #[arg(long)]
    status: Option<String>,
}

#[derive(Subcommand)]
enum InventoryCommands {
    Stock(InventoryStockArgs),
    Adjust(InventoryAdjustArgs),
    List(InventoryListArgs),
}

#[derive(Args)]
struct InventoryStockArgs {
    #[arg(long)]
    warehouse_id: i32,
    #[arg(long)]
    item: String,
    #[arg(long, default_value_t = 0)]
    quantity: i32,
}

#[derive(Args)]
struct InventoryAdjustArgs {
    #[arg(long)]
    warehouse_id: i32,
    #[arg(long)]
    item: String,
    #[arg(long, allow_hyphen_values = true, help = "Signed change, e.g. -5")]
    delta: i32,
}

#[derive(Args)]
struct InventoryListArgs {
    #[arg(long)]
    warehouse_id: i32,
}

struct CliContext {
    state: AppState,
    events: JoinHandle<()>,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;
        if config.auto_migrate {
            db::run_migrations(&db_pool)
                .await
                .context("failed running migrations")?;
        }

        let (event_sender, event_rx) = EventSender::channel(config.event_channel_capacity);
        let events = tokio::spawn(process_events(event_rx));

        Ok(Self {
            state: AppState::new(Arc::new(db_pool), config, Arc::new(event_sender)),
            events,
        })
    }

    fn config(&self) -> &AppConfig {
        &self.state.config
    }

    fn ensure_schema_sync_allowed(&self, action: &str) -> Result<()> {
        if !self.config().allows_schema_sync() {
            bail!(
                "refusing to {} in the '{}' environment; set RUN_ENV=development or test",
                action,
                self.config().environment
            );
        }
        Ok(())
    }

    /// Drops every sender so the event loop drains and exits
    async fn shutdown(self) {
        let Self { state, events } = self;
        drop(state);
        let _ = events.await;
    }
}

async fn handle_migrate(context: &CliContext, args: MigrateArgs) -> Result<()> {
    context.ensure_schema_sync_allowed("migrate the schema")?;

    if args.fresh {
        db::refresh_schema(&context.state.db)
            .await
            .context("failed to rebuild schema")?;
    } else {
        db::run_migrations(&context.state.db)
            .await
            .context("failed running migrations")?;
    }
    println!("Schema is up to date");
    Ok(())
}

async fn handle_seed(context: &CliContext, args: SeedArgs, json: bool) -> Result<()> {
    context.ensure_schema_sync_allowed("seed demo data")?;

    let summary = seed::seed_demo_data(&context.state, &args.admin_password)
        .await
        .context("failed to seed demo data")?;

    if json {
        print_json(&summary)?;
    } else {
        println!(
            "Seeded demo data: shipment {} for customer {} from warehouse {}",
            summary.shipment_id, summary.customer_id, summary.warehouse_id
        );
    }
    Ok(())
}

async fn handle_shipment_command(
    context: &CliContext,
    command: ShipmentCommands,
    json: bool,
) -> Result<()> {
    let service = &context.state.shipments;

    match command {
        ShipmentCommands::Create(args) => {
            let created = service
                .create_shipment(CreateShipmentCommand {
                    customer_id: args.customer_id,
                    warehouse_id: args.warehouse_id,
                    route_id: args.route_id,
                    driver_id: args.driver_id,
                    vehicle_id: args.vehicle_id,
                    total_amount: args.total_amount,
                    estimated_delivery: args.estimated_delivery,
                })
                .await
                .context("failed to create shipment")?;
            render_shipment(&created, json)?;
        }
        ShipmentCommands::Transition(args) => {
            let updated = service
                .transition_status_str(
                    args.id,
                    &args.status,
                    args.location,
                    args.at.unwrap_or_else(now),
                )
                .await
                .with_context(|| format!("failed to transition shipment {}", args.id))?;
            render_shipment(&updated, json)?;
        }
        ShipmentCommands::History(args) => {
            let history: Vec<StatusEvent> = service
                .get_status_history(args.id)
                .await
                .with_context(|| format!("failed to load history of shipment {}", args.id))?
                .collect();
            if json {
                print_json(&history)?;
            } else if history.is_empty() {
                println!("Shipment {} has no status changes yet", args.id);
            } else {
                for event in &history {
                    println!(
                        "- {} • {} • {}",
                        event.timestamp.to_rfc3339(),
                        event.status,
                        event.location.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        ShipmentCommands::Show(args) => {
            let Some(found) = service.get_shipment(args.id).await? else {
                bail!("shipment {} not found", args.id);
            };
            render_shipment(&found, json)?;
        }
        ShipmentCommands::List(args) => {
            let status = args
                .status
                .as_deref()
                .map(ShipmentStatus::parse)
                .transpose()?;
            let page = service.list_shipments(args.page, args.limit, status).await?;
            if json {
                print_json(&page)?;
            } else {
                println!(
                    "Page {} ({} per page) of {} shipment(s)",
                    page.page, page.limit, page.total
                );
                for shipment in &page.shipments {
                    render_shipment_line(shipment);
                }
            }
        }
    }

    Ok(())
}

async fn handle_inventory_command(
    context: &CliContext,
    command: InventoryCommands,
    json: bool,
) -> Result<()> {
    let service = &context.state.inventory;

    match command {
        InventoryCommands::Stock(args) => {
            let item = service
                .stock_item(args.warehouse_id, &args.item, args.quantity)
                .await
                .context("failed to stock item")?;
            if json {
                print_json(&item)?;
            } else {
                println!(
                    "Stocked {} × {} in warehouse {}",
                    item.quantity, item.item_name, item.warehouse_id
                );
            }
        }
        InventoryCommands::Adjust(args) => {
            let quantity = service
                .adjust_quantity(args.warehouse_id, &args.item, args.delta)
                .await
                .context("failed to adjust inventory")?;
            if json {
                print_json(&AdjustOutput {
                    warehouse_id: args.warehouse_id,
                    item_name: &args.item,
                    quantity,
                })?;
            } else {
                println!(
                    "{} in warehouse {} now at {}",
                    args.item, args.warehouse_id, quantity
                );
            }
        }
        InventoryCommands::List(args) => {
            let items = service.list_for_warehouse(args.warehouse_id).await?;
            if json {
                print_json(&items)?;
            } else {
                for item in &items {
                    println!("- {} • {}", item.item_name, item.quantity);
                }
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct AdjustOutput<'a> {
    warehouse_id: i32,
    item_name: &'a str,
    quantity: i32,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_shipment(shipment: &shipment::Model, json: bool) -> Result<()> {
    if json {
        print_json(shipment)
    } else {
        render_shipment_line(shipment);
        Ok(())
    }
}

fn render_shipment_line(shipment: &shipment::Model) {
    println!(
        "- Shipment {} • status {} • total {} • updated {}",
        shipment.id,
        shipment.status,
        shipment.total_amount,
        shipment.updated_at.to_rfc3339()
    );
}
