use anyhow::bail;
use clap::{Args, Parser, Subcommand, ValueEnum};
use opsboard_reorder::DropTarget;
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

#[derive(Parser, Debug)]
#[command(name = "opsboard")]
#[command(version)]
#[command(about = "Plan and apply card moves on an operations board")]
#[command(long_about = "
opsboard reorders cards on a board file (YAML or JSON) the way a drag and
drop in the dashboard does: the dragged card takes the position of the card
it was dropped on, or goes to the end of a column, and the destination column
is renumbered.

Example usage:
  opsboard show --board board.yaml
  opsboard plan --board board.yaml --item towels-204 --onto-item leak-310
  opsboard move --board board.yaml --item towels-204 --onto-column done
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to opsboard.{toml,yaml,yml,json} in the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the board's columns in display order
    Show {
        /// Board file
        #[arg(long)]
        board: PathBuf,

        /// Only show this column
        #[arg(long)]
        column: Option<String>,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Compute the writes a move would make without applying them
    Plan(MoveArgs),

    /// Apply a move to the board file and send the move notification
    Move(MoveArgs),
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Board file
    #[arg(long)]
    pub board: PathBuf,

    /// Id of the dragged card
    #[arg(long)]
    pub item: String,

    #[command(flatten)]
    pub target: TargetArgs,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// Take the position of this card
    #[arg(long)]
    pub onto_item: Option<String>,

    /// Append to the end of this column
    #[arg(long)]
    pub onto_column: Option<String>,

    /// Card or column id, resolved card first
    #[arg(long)]
    pub onto: Option<String>,
}

impl TargetArgs {
    pub fn drop_target(&self) -> anyhow::Result<DropTarget> {
        match (&self.onto_item, &self.onto_column, &self.onto) {
            (Some(item), None, None) => Ok(DropTarget::item(item.as_str())),
            (None, Some(column), None) => Ok(DropTarget::column(column.as_str())),
            (None, None, Some(raw)) => Ok(DropTarget::unqualified(raw.as_str())),
            _ => bail!("exactly one of --onto-item, --onto-column or --onto is required"),
        }
    }
}
