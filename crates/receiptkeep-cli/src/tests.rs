use std::path::PathBuf;

use clap::Parser;
use pretty_assertions::assert_eq;
use receiptkeep_core::{DatabaseService, MergeMode, TableSummary};
use tempfile::tempdir;

use crate::cli::{Cli, Commands, ConfigCommands, MergeModeArg};
use crate::commands::common::{format_report_lines, format_summary_lines, Context};
use crate::commands::config::run_config_init;
use crate::config::CliConfig;

#[test]
fn import_command_parses_mode_and_json() {
    let cli = Cli::try_parse_from([
        "receiptkeep",
        "import",
        "backup.db",
        "--mode",
        "overwrite",
        "--json",
    ])
    .unwrap();

    let Commands::Import { backup, mode, json } = cli.command else {
        panic!("expected import command");
    };
    assert_eq!(backup, PathBuf::from("backup.db"));
    assert_eq!(mode, Some(MergeModeArg::Overwrite));
    assert!(json);
}

#[test]
fn global_db_path_is_accepted_after_subcommand() {
    let cli = Cli::try_parse_from(["receiptkeep", "summary", "--db-path", "/tmp/live.db"]).unwrap();
    assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/live.db")));
}

#[test]
fn unknown_merge_mode_is_rejected() {
    let result = Cli::try_parse_from(["receiptkeep", "import", "backup.db", "--mode", "append"]);
    assert!(result.is_err());
}

#[test]
fn merge_mode_arg_converts() {
    assert_eq!(MergeMode::from(MergeModeArg::Reconcile), MergeMode::Reconcile);
    assert_eq!(MergeMode::from(MergeModeArg::Overwrite), MergeMode::Overwrite);
}

#[test]
fn config_init_parses_options() {
    let cli = Cli::try_parse_from([
        "receiptkeep",
        "config",
        "init",
        "--database",
        "/data/live.db",
        "--default-mode",
        "overwrite",
    ])
    .unwrap();

    let Commands::Config {
        command:
            ConfigCommands::Init {
                database,
                work_dir,
                default_mode,
            },
    } = cli.command
    else {
        panic!("expected config init command");
    };
    assert_eq!(database, Some(PathBuf::from("/data/live.db")));
    assert_eq!(work_dir, None);
    assert_eq!(default_mode, Some(MergeModeArg::Overwrite));
}

#[test]
fn config_init_writes_and_merges_existing_values() {
    let tmp = tempdir().unwrap();
    let config_path = tmp.path().join("cli-config.json");
    CliConfig {
        work_dir: Some(tmp.path().join("staging")),
        ..CliConfig::default()
    }
    .save_to_path(&config_path)
    .unwrap();

    let context = Context::resolve(Some(config_path.clone()), None).unwrap();
    run_config_init(
        context,
        Some(tmp.path().join("live.db")),
        None,
        Some(MergeMode::Overwrite),
    )
    .unwrap();

    let saved = CliConfig::load_from_path(&config_path).unwrap();
    assert_eq!(saved.db_path, Some(tmp.path().join("live.db")));
    assert_eq!(saved.work_dir, Some(tmp.path().join("staging")));
    assert_eq!(saved.default_merge_mode, MergeMode::Overwrite);
}

#[test]
fn context_prefers_flag_over_config_db_path() {
    let tmp = tempdir().unwrap();
    let config_path = tmp.path().join("cli-config.json");
    CliConfig {
        db_path: Some(tmp.path().join("configured.db")),
        ..CliConfig::default()
    }
    .save_to_path(&config_path)
    .unwrap();

    let context =
        Context::resolve(Some(config_path), Some(tmp.path().join("flag.db"))).unwrap();
    assert_eq!(context.db_path, tmp.path().join("flag.db"));
}

#[test]
fn summary_lines_list_every_table() {
    let summary = TableSummary {
        schema_version: 20,
        trips: 2,
        receipts: 7,
        ..TableSummary::default()
    };

    let lines = format_summary_lines(&summary);
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "schema version   20");
    assert_eq!(lines[3], "trips            2");
    assert_eq!(lines[5], "receipts         7");
}

#[tokio::test(flavor = "multi_thread")]
async fn report_lines_describe_each_phase() {
    let tmp = tempdir().unwrap();
    let source = DatabaseService::open_path(tmp.path().join("source.db"), tmp.path().join("work"))
        .await
        .unwrap();
    let backup_path = tmp.path().join("backup.db");
    source.export_backup(&backup_path).await.unwrap();

    let live = DatabaseService::open_path(tmp.path().join("live.db"), tmp.path().join("work"))
        .await
        .unwrap();
    let report = live
        .import_backup(&backup_path, MergeMode::Reconcile)
        .await
        .unwrap();

    let lines = format_report_lines(&report);
    assert_eq!(lines.len(), 7);
    assert!(lines[0].contains("reconcile mode"));
    assert!(lines[6].starts_with("receipts"));
}
