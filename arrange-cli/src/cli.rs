//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use arrange_core::{DropPosition, ItemId};
use clap::{Parser, Subcommand, ValueEnum};

/// Reorder flat lists and trees kept in a JSON items file
#[derive(Parser)]
#[command(name = "arrange-cli")]
#[command(author, version, about = "arrange command-line interface")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the JSON items file
    #[arg(
        short,
        long,
        global = true,
        env = "ARRANGE_FILE",
        default_value = "items.json"
    )]
    pub file: PathBuf,

    /// Path to the settings file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "ARRANGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Work with the flat, fractionally keyed list
    #[command(subcommand, about = "Show and reorder the flat list")]
    Flat(FlatCommands),

    /// Work with the hierarchical tree
    #[command(subcommand, about = "Show and reorder the tree")]
    Tree(TreeCommands),
}

/// Flat list subcommands
#[derive(Subcommand)]
pub enum FlatCommands {
    /// Print items in display order
    Show {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Append a new item at the end of the list
    Add {
        /// Pin the new item
        #[arg(long)]
        pinned: bool,
    },

    /// Drop one item onto another
    #[command(about = "Move an item next to a target, as a drag and drop would")]
    Move {
        /// ID of the dragged item
        dragged: ItemId,

        /// ID of the drop target
        target: ItemId,
    },
}

/// Tree subcommands
#[derive(Subcommand)]
pub enum TreeCommands {
    /// Print the tree with indentation
    Show {
        /// Hide the children of these nodes
        #[arg(long, value_delimiter = ',')]
        collapse: Vec<ItemId>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Create a node at the end of its sibling group
    Add {
        /// Display name
        name: String,

        /// Parent node (defaults to the most recently used parent)
        #[arg(long)]
        parent: Option<ItemId>,

        /// Place the node at root level even if a recent parent exists
        #[arg(long, conflicts_with = "parent")]
        root: bool,

        /// Create a container instead of a leaf
        #[arg(long)]
        container: bool,
    },

    /// Drop one node onto another
    #[command(about = "Move a node before, after, or inside a target")]
    Move {
        /// ID of the dragged node
        dragged: ItemId,

        /// ID of the drop target
        target: ItemId,

        /// Explicit drop position
        #[arg(long, value_enum, required_unless_present = "offset")]
        position: Option<PositionArg>,

        /// Pointer offset from the top of the target row
        #[arg(long, conflicts_with = "position", requires = "height")]
        offset: Option<f64>,

        /// Height of the target row
        #[arg(long, requires = "offset")]
        height: Option<f64>,
    },

    /// Print the drop position a pointer offset maps to
    Classify {
        /// ID of the hovered node
        target: ItemId,

        /// Pointer offset from the top of the row
        #[arg(long)]
        offset: f64,

        /// Height of the row
        #[arg(long)]
        height: f64,
    },
}

/// Output format for show commands
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Table,
    /// Output as JSON
    Json,
}

/// Drop position as given on the command line
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PositionArg {
    /// Before the target, in its group
    Before,
    /// After the target, in its group
    After,
    /// Last child of the target
    Inside,
}

impl From<PositionArg> for DropPosition {
    fn from(arg: PositionArg) -> Self {
        match arg {
            PositionArg::Before => Self::Before,
            PositionArg::After => Self::After,
            PositionArg::Inside => Self::Inside,
        }
    }
}
