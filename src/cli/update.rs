use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use serde_json::json;
use tracing::{info, warn};

use crate::{
    config::{Config, ConfigSource},
    error::{ApiError, TrackerResult},
    github::{client::GitHubClient, GitHubApi},
    metrics::{aggregate::collect_daily_metrics, DailyReport},
    utils::{clock::Clock, time::parse_date_arg},
    workbook::tracker::{RowUpdate, TrackerWorkbook},
};

#[derive(Debug, Parser)]
pub struct UpdateCommand {
    #[arg(help = "Day to update: YYYY-MM-DD, DD/MM/YYYY or DD/MM/YY. Defaults to today (UTC)")]
    pub date: Option<String>,
    #[arg(long, help = "Print the written metrics as json")]
    pub json: bool,
}

/// What a successful `update` wrote.
#[derive(Debug)]
pub struct UpdateOutcome {
    pub report: DailyReport,
    pub row: RowUpdate,
    pub path: PathBuf,
}

/// Command to process `update`. Talks to the real GitHub API.
pub async fn process_update_command(
    UpdateCommand { date, json }: UpdateCommand,
    source: &impl ConfigSource,
    clock: &impl Clock,
) -> Result<()> {
    let outcome = run_update(source, date.as_deref(), clock, |config| {
        GitHubClient::new(&config.token)
    })
    .await?;
    print_outcome(&outcome, json)?;
    Ok(())
}

/// The whole update flow. Settings and the date are validated and the workbook is opened before
/// `connect` is called, so a bad setup never reaches the network. The workbook is saved only
/// after every metric has been fetched.
pub async fn run_update<A: GitHubApi>(
    source: &impl ConfigSource,
    date_arg: Option<&str>,
    clock: &impl Clock,
    connect: impl FnOnce(&Config) -> Result<A, ApiError>,
) -> TrackerResult<UpdateOutcome> {
    let config = Config::load(source)?;
    let today = clock.today();
    let date = match date_arg.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => parse_date_arg(value)?,
        None => today,
    };
    info!(
        "Target date: {date} | Repo: {} | User: {}",
        config.full_repo_name(),
        config.username
    );

    let mut workbook = TrackerWorkbook::open(&config)?;

    let api = connect(&config)?;
    let report = collect_daily_metrics(&api, &config, date, today).await?;
    if !report.events_complete {
        warn!(
            "GitHub's event feed does not reach back to {date}; issues triaged, issues resolved \
             and commits may be under-reported"
        );
    }

    let row = workbook.record(date, &report.metrics, clock.time())?;
    workbook.save()?;

    Ok(UpdateOutcome {
        report,
        row,
        path: workbook.path().to_path_buf(),
    })
}

fn print_outcome(outcome: &UpdateOutcome, as_json: bool) -> Result<()> {
    let UpdateOutcome { report, row, path } = outcome;
    if as_json {
        let payload = json!({
            "date": report.date,
            "row": row.row,
            "created": row.created,
            "events_complete": report.events_complete,
            "metrics": report.metrics,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let m = &report.metrics;
    println!(
        "Updated {} for {} (row {}): triaged {}, resolved {}, PRs created {}, PRs merged {}, \
         commits {}, open issues {}, open PRs {}",
        path.display(),
        report.date.format("%Y-%m-%d"),
        row.row,
        m.issues_triaged,
        m.issues_resolved,
        m.prs_created,
        m.prs_merged,
        m.commits,
        m.open_issues,
        m.open_prs,
    );
    if !report.events_complete {
        println!(
            "Note: GitHub only keeps recent events, counts from the event feed may be incomplete \
             for this date."
        );
    }
    Ok(())
}
