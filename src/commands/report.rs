use crate::cli::ReportCommand;
use crate::config::ReportConfig;
use crate::error::{Result, ShopTallyError};
use crate::formatting::{format_currency, format_date_time_str};
use crate::manager::ItemManager;
use crate::reports::{finalize_report, RemoteStatus, ReportArchive, ReportClient};
use crate::storage::KeyValueStore;
use colored::Colorize;
use prettytable::{format, Table};

/// Handle report commands
pub async fn handle_report<S, A>(
    command: ReportCommand,
    manager: &mut ItemManager<S>,
    archive: &ReportArchive<A>,
    config: &ReportConfig,
) -> Result<()>
where
    S: KeyValueStore,
    A: KeyValueStore,
{
    match command {
        ReportCommand::Save => save_report(manager, archive, config).await,
        ReportCommand::List { json } => list_reports(archive, json),
        ReportCommand::Delete { index } => delete_report(archive, index),
        ReportCommand::Clear => {
            archive.clear()?;
            println!("{}", "Deleted all saved reports".green());
            Ok(())
        }
    }
}

fn amount(value: f64) -> String {
    format_currency(value).unwrap_or_else(|_| value.to_string())
}

async fn save_report<S, A>(
    manager: &mut ItemManager<S>,
    archive: &ReportArchive<A>,
    config: &ReportConfig,
) -> Result<()>
where
    S: KeyValueStore,
    A: KeyValueStore,
{
    let client = if config.is_configured() {
        Some(ReportClient::new(config)?)
    } else {
        tracing::debug!("Report service not configured; saving locally only");
        None
    };

    let finalized = finalize_report(manager, archive, client.as_ref()).await?;
    let report = &finalized.report;

    println!(
        "{} {} item(s), {} for {}",
        "Saved report:".green().bold(),
        report.items.len(),
        amount(report.total_amount),
        report.user_name.bold()
    );

    match &finalized.remote {
        RemoteStatus::Skipped => {}
        RemoteStatus::Created { sheet_url } => {
            println!("Spreadsheet: {}", sheet_url.cyan());
        }
        RemoteStatus::Rejected { error } => {
            println!(
                "{} {}",
                "Spreadsheet was not created:".yellow(),
                error.as_deref().unwrap_or("Unknown error")
            );
        }
        RemoteStatus::Failed(reason) => {
            println!(
                "{} {}",
                "Could not reach the report service:".yellow(),
                reason
            );
        }
    }

    println!("Started a new list.");
    Ok(())
}

fn list_reports<A: KeyValueStore>(archive: &ReportArchive<A>, json: bool) -> Result<()> {
    let reports = archive.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    if reports.is_empty() {
        println!("{}", "No saved reports.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "#".bold(),
        "Saved".bold(),
        "User".bold(),
        "Items".bold(),
        "Total".bold(),
        "Sheet".bold()
    ]);

    for (index, report) in reports.iter().enumerate() {
        let saved =
            format_date_time_str(&report.timestamp).unwrap_or_else(|_| report.timestamp.clone());
        let sheet = report.sheet_url.as_deref().unwrap_or("-");
        table.add_row(prettytable::row![
            (index + 1).to_string().cyan(),
            saved,
            report.user_name,
            report.items.len(),
            r->amount(report.total_amount),
            sheet
        ]);
    }

    println!("\nSaved reports:");
    table.printstd();
    println!();
    println!(
        "Use {} to remove one.",
        "shoptally report delete <#>".cyan()
    );
    println!();
    Ok(())
}

fn delete_report<A: KeyValueStore>(archive: &ReportArchive<A>, position: usize) -> Result<()> {
    let removed = match position.checked_sub(1) {
        Some(index) => archive.delete(index)?,
        None => None,
    };

    let Some(report) = removed else {
        return Err(ShopTallyError::ReportNotFound(position).into());
    };

    let saved = format_date_time_str(&report.timestamp).unwrap_or(report.timestamp);
    println!("{}", format!("Deleted report saved {}", saved).green());
    Ok(())
}
