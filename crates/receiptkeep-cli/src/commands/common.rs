use std::path::{Path, PathBuf};

use receiptkeep_core::{DatabaseService, MergeReport, TableSummary};

use crate::config::{default_config_path, CliConfig};
use crate::error::CliError;

/// Settings every command needs, resolved from flags, env and config file
pub struct Context {
    pub config_path: PathBuf,
    pub config: CliConfig,
    pub db_path: PathBuf,
}

impl Context {
    pub fn resolve(
        config_path: Option<PathBuf>,
        cli_db_path: Option<PathBuf>,
    ) -> Result<Self, CliError> {
        let config_path = config_path.unwrap_or_else(default_config_path);
        let config = CliConfig::load_from_path(&config_path).map_err(CliError::Config)?;
        let db_path = config.resolve_db_path(cli_db_path);
        Ok(Self {
            config_path,
            config,
            db_path,
        })
    }

    pub async fn open_database(&self) -> Result<DatabaseService, CliError> {
        open_database(&self.db_path, self.config.resolve_work_dir()).await
    }
}

pub async fn open_database(path: &Path, work_dir: PathBuf) -> Result<DatabaseService, CliError> {
    Ok(DatabaseService::open_path(path.to_path_buf(), work_dir).await?)
}

pub fn format_report_lines(report: &MergeReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Imported backup (schema version {}) using {} mode",
        report.original_schema_version, report.mode
    )];
    let phases = [
        ("columns", &report.columns),
        ("payment methods", &report.payment_methods),
        ("categories", &report.categories),
        ("trips", &report.trips),
        ("distances", &report.distances),
        ("receipts", &report.receipts),
    ];
    for (label, counts) in phases {
        lines.push(format!(
            "{label:<16} inserted {:>4}  updated {:>4}  skipped {:>4}  deleted {:>4}",
            counts.inserted, counts.updated, counts.skipped, counts.deleted
        ));
    }
    lines
}

pub fn format_summary_lines(summary: &TableSummary) -> Vec<String> {
    vec![
        format!("schema version   {}", summary.schema_version),
        format!("payment methods  {}", summary.payment_methods),
        format!("categories       {}", summary.categories),
        format!("trips            {}", summary.trips),
        format!("distances        {}", summary.distances),
        format!("receipts         {}", summary.receipts),
        format!("csv columns      {}", summary.csv_columns),
        format!("pdf columns      {}", summary.pdf_columns),
    ]
}
