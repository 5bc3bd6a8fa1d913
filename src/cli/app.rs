use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "ssdb")]
#[command(about = "SceneScript DB2 table toolkit")]
#[command(version)]
pub struct Cli {
    /// Control colored output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Write output to a file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

/// Table selector for `dump --kind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TableKind {
    /// SceneScriptPackage
    Package,
    /// SceneScriptPackageMember
    Member,
    /// SceneScript
    Script,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode the three tables into a "by id" / "by name" directory tree
    Unpack {
        /// Directory holding the SceneScript*.db2 tables
        #[arg(short, long)]
        tables: String,

        /// Directory to create the tree in
        #[arg(long)]
        tree: String,

        /// Output a JSON summary
        #[arg(long)]
        json: bool,
    },

    /// Build the three tables from a directory tree
    Pack {
        /// Tree root (containing "by id")
        #[arg(long)]
        tree: String,

        /// Directory to write the SceneScript*.db2 tables to
        #[arg(short, long)]
        tables: String,

        /// Maximum bytes of script source per SceneScript row
        #[arg(long = "fragment-len", default_value = "4000")]
        fragment_len: usize,

        /// Output a JSON summary
        #[arg(long)]
        json: bool,
    },

    /// Show a table header and its validation status
    Info {
        /// Path to a .db2 file
        #[arg(short, long)]
        file: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Decode one table and print its rows
    Dump {
        /// Path to a .db2 file
        #[arg(short, long)]
        file: String,

        /// Table kind (default: detect from the table hash)
        #[arg(short, long)]
        kind: Option<TableKind>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Decode all three tables, resolve the catalog and list anomalies
    Check {
        /// Directory holding the SceneScript*.db2 tables
        #[arg(short, long)]
        tables: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
