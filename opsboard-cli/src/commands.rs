//! Command handlers

use crate::cli::{Cli, Commands, MoveArgs, OutputFormat};
use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use opsboard_reorder::{ColumnKey, ItemId, ReorderError, ReorderPlan, Snapshot};
use opsboard_sync::{
    ConfigLoader, FileBoard, LogNotifier, MoveNotifier, OpsboardConfig, ReorderService,
    SnapshotSource, WebhookNotifier,
};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub async fn run(cli: Cli) -> Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let config = loader.load().context("failed to load configuration")?;

    match cli.command {
        Commands::Show {
            board,
            column,
            format,
        } => show(&board, column.map(ColumnKey::from), format).await,
        Commands::Plan(args) => plan(&config, &args).await,
        Commands::Move(args) => apply(&config, &args).await,
    }
}

fn open_board(path: &Path) -> Result<Arc<FileBoard>> {
    let board = FileBoard::open(path)
        .with_context(|| format!("cannot open board {}", path.display()))?;
    Ok(Arc::new(board))
}

async fn show(path: &Path, column: Option<ColumnKey>, format: OutputFormat) -> Result<()> {
    let board = open_board(path)?;
    let mut snapshot = board.fetch_snapshot().await?;
    if let Some(column) = &column {
        if !snapshot.has_column(column) {
            return Err(ReorderError::invalid_target(format!("column:{column}")).into());
        }
        snapshot.columns.retain(|c| c == column);
        snapshot.items.retain(|item| &item.column == column);
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        OutputFormat::Yaml => print!("{}", serde_yaml_ng::to_string(&snapshot)?),
        OutputFormat::Table => println!("{}", board_table(&snapshot)),
    }
    Ok(())
}

async fn plan(config: &OpsboardConfig, args: &MoveArgs) -> Result<()> {
    let board = open_board(&args.board)?;
    let service = ReorderService::from_config(config, board.clone(), board, None)?;

    let plan = service
        .plan_move(&ItemId::from(args.item.as_str()), &args.target.drop_target()?)
        .await?;
    print_plan(&plan, args.format)
}

async fn apply(config: &OpsboardConfig, args: &MoveArgs) -> Result<()> {
    let board = open_board(&args.board)?;
    let notifier: Arc<dyn MoveNotifier> = match &config.notify.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url, config.notify.timeout())?),
        None => Arc::new(LogNotifier),
    };
    let service = ReorderService::from_config(config, board.clone(), board, Some(notifier))?;

    let result = service
        .move_item(&ItemId::from(args.item.as_str()), &args.target.drop_target()?)
        .await;

    // Drain pending notifications even when the move failed
    if let Some(stats) = service.shutdown().await {
        debug!(
            delivered = stats.delivered,
            dropped = stats.dropped,
            "notification worker stopped"
        );
    }

    let outcome = result?;
    print_plan(&outcome.plan, args.format)
}

fn print_plan(plan: &ReorderPlan, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(plan)?),
        OutputFormat::Yaml => print!("{}", serde_yaml_ng::to_string(plan)?),
        OutputFormat::Table => {
            if plan.is_empty() {
                println!("{} is already at that position", plan.item_id);
                return Ok(());
            }
            println!(
                "{}: {} -> {} at index {}",
                plan.item_id, plan.from_column, plan.to_column, plan.target_index
            );
            println!("{}", plan_table(plan));
        }
    }
    Ok(())
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.to_vec());
    table
}

fn plan_table(plan: &ReorderPlan) -> Table {
    let mut table = new_table(&["Item", "Column", "Order Key"]);
    for write in plan.writes() {
        let column = write
            .update
            .column
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        table.add_row(vec![
            write.id.to_string(),
            column,
            write.update.order_key.to_string(),
        ]);
    }
    table
}

fn board_table(snapshot: &Snapshot) -> Table {
    let mut table = new_table(&["Column", "#", "Item", "Order Key", "Title"]);
    for column in snapshot.known_columns() {
        for (index, item) in snapshot.column_items(&column).iter().enumerate() {
            table.add_row(vec![
                column.to_string(),
                index.to_string(),
                item.id.to_string(),
                item.order_key.to_string(),
                item.title.clone().unwrap_or_default(),
            ]);
        }
    }
    table
}
