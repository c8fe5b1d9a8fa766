use std::path::PathBuf;

use receiptkeep_core::MergeMode;
use serde::Serialize;

use crate::cli::ConfigCommands;
use crate::commands::common::Context;
use crate::config::normalize_path_option;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ResolvedConfig<'a> {
    config_path: &'a PathBuf,
    db_path: &'a PathBuf,
    work_dir: PathBuf,
    default_merge_mode: MergeMode,
}

pub fn run_config(command: ConfigCommands, context: Context) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => run_config_show(&context),
        ConfigCommands::Init {
            database,
            work_dir,
            default_mode,
        } => run_config_init(
            context,
            database,
            work_dir,
            default_mode.map(MergeMode::from),
        ),
    }
}

fn run_config_show(context: &Context) -> Result<(), CliError> {
    let resolved = ResolvedConfig {
        config_path: &context.config_path,
        db_path: &context.db_path,
        work_dir: context.config.resolve_work_dir(),
        default_merge_mode: context.config.default_merge_mode,
    };
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

pub fn run_config_init(
    context: Context,
    database: Option<PathBuf>,
    work_dir: Option<PathBuf>,
    default_mode: Option<MergeMode>,
) -> Result<(), CliError> {
    let Context {
        config_path,
        mut config,
        ..
    } = context;

    if let Some(database) = normalize_path_option(database) {
        config.db_path = Some(database);
    }
    if let Some(work_dir) = normalize_path_option(work_dir) {
        config.work_dir = Some(work_dir);
    }
    if let Some(mode) = default_mode {
        config.default_merge_mode = mode;
    }

    config
        .save_to_path(&config_path)
        .map_err(CliError::Config)?;
    println!("Saved CLI config to {}", config_path.display());
    Ok(())
}
