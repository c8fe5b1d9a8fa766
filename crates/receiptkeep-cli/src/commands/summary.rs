use crate::commands::common::{format_summary_lines, Context};
use crate::error::CliError;

pub async fn run_summary(as_json: bool, context: &Context) -> Result<(), CliError> {
    let service = context.open_database().await?;
    let summary = service.summary().await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for line in format_summary_lines(&summary) {
            println!("{line}");
        }
    }

    Ok(())
}
