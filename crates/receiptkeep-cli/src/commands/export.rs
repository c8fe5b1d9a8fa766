use std::path::Path;

use crate::commands::common::Context;
use crate::error::CliError;

pub async fn run_export(output_path: &Path, context: &Context) -> Result<(), CliError> {
    let service = context.open_database().await?;
    service.export_backup(output_path).await?;
    println!("{}", output_path.display());
    Ok(())
}
