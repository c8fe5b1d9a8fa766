use std::path::Path;

use receiptkeep_core::MergeMode;

use crate::commands::common::{format_report_lines, Context};
use crate::error::CliError;

pub async fn run_import(
    backup: &Path,
    mode: Option<MergeMode>,
    as_json: bool,
    context: &Context,
) -> Result<(), CliError> {
    let mode = mode.unwrap_or(context.config.default_merge_mode);
    let service = context.open_database().await?;
    let report = service.import_backup(backup, mode).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in format_report_lines(&report) {
            println!("{line}");
        }
    }

    Ok(())
}
