use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use receiptkeep_core::MergeMode;

#[derive(Parser)]
#[command(name = "receiptkeep")]
#[command(about = "Import, export and inspect receiptkeep backups")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Optional path to the CLI config file
    #[arg(long = "config-file", global = true, value_name = "PATH")]
    pub config_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge a backup database into the local database
    Import {
        /// Backup file to import
        backup: PathBuf,
        /// How imported rows are combined with existing ones
        #[arg(long, value_enum)]
        mode: Option<MergeModeArg>,
        /// Output the merge report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a backup of the local database
    Export {
        /// Destination file (must not exist)
        path: PathBuf,
    },
    /// Show row counts for every table
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect or write CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum MergeModeArg {
    /// Keep existing rows and apply newer imported ones
    Reconcile,
    /// Replace every table with the backup's contents
    Overwrite,
}

impl From<MergeModeArg> for MergeMode {
    fn from(value: MergeModeArg) -> Self {
        match value {
            MergeModeArg::Reconcile => Self::Reconcile,
            MergeModeArg::Overwrite => Self::Overwrite,
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the resolved configuration
    Show,
    /// Initialize or update the config file
    Init {
        /// Database path to store in the config
        #[arg(long = "database", value_name = "PATH")]
        database: Option<PathBuf>,
        /// Directory used to stage backups while importing
        #[arg(long, value_name = "PATH")]
        work_dir: Option<PathBuf>,
        /// Merge mode used when `import` is run without `--mode`
        #[arg(long, value_enum)]
        default_mode: Option<MergeModeArg>,
    },
}
