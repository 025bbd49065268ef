//! Run command handler

use anyhow::{Context, Result};
use colored::*;

use super::RunCommands;
use crate::accession::agents::resolve_agent;
use crate::accession::{
    DriveLayout, RunContext, SweepReport, list_spreadsheets, relocate, sweep,
};
use crate::api::{self, ArchivesSpaceApi, ArchivesSpaceClient};
use crate::config::{Config, Environment};
use crate::logging;
use crate::services::{ConsoleReporter, Notifier, Reporter, SilentReporter, StatusNotifier};

/// Log in, sweep the drive, relocate processed files, and send the status notification
///
/// Relocation and notification happen whether or not the sweep succeeded.
pub async fn handle_run_command(args: RunCommands) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(args.config.as_deref())?;
    let drive = config.drive_path(args.env, args.drive.as_deref())?;
    let env = args.env.unwrap_or_else(|| Environment::infer(&drive));

    let layout = DriveLayout::new(&drive);
    layout
        .ensure()
        .with_context(|| format!("Failed to prepare drive folders under {}", drive.display()))?;
    let error_log = logging::init(Some(&layout.logs()), args.verbose)?;

    log::info!("Drive: {} ({:?})", drive.display(), env);

    let reporter: Box<dyn Reporter> = if args.quiet {
        Box::new(SilentReporter)
    } else {
        Box::new(ConsoleReporter)
    };
    let notifier = StatusNotifier::new(config.notification_settings(error_log));

    let mut report = SweepReport::default();
    let result = match open_session(&config, env).await {
        Ok(client) => {
            sweep_drive(
                &client,
                config.event_authorizer.as_deref(),
                &layout,
                reporter.as_ref(),
                &mut report,
            )
            .await
        }
        Err(e) => Err(e),
    };
    let moved = finish_run(&result, &report, &layout, &notifier);

    reporter.message(&format!(
        "{} {} complete, {} with errors, {} moved",
        "Summary:".bold(),
        report.complete.len().to_string().green(),
        report.errors.len().to_string().red(),
        moved
    ));

    result
}

/// Move every classified file and send exactly one notification; returns the number moved
fn finish_run(
    result: &Result<()>,
    report: &SweepReport,
    layout: &DriveLayout,
    notifier: &dyn Notifier,
) -> usize {
    let moved = relocate(report, layout);
    match result {
        Ok(()) if report.has_errors() => log::warn!(
            "Done, but {} file(s) had errors. Check log and outfile for details.",
            report.errors.len()
        ),
        Ok(()) => log::info!("Done! Check log and outfile for details."),
        Err(e) => log::error!("Run aborted: {:#}", e),
    }
    notifier.notify(result.is_ok());
    moved.len()
}

async fn open_session(config: &Config, env: Environment) -> Result<ArchivesSpaceClient> {
    let (url, credentials) = config.resolve_credentials(env)?;
    let client = api::login(&url, &credentials).await?;
    log::debug!("Session open for {} at {}", client.username(), client.base_url());
    Ok(client)
}

/// Resolve the event authorizer and run every spreadsheet on the drive
async fn sweep_drive(
    api: &dyn ArchivesSpaceApi,
    authorizer: Option<&str>,
    layout: &DriveLayout,
    reporter: &dyn Reporter,
    report: &mut SweepReport,
) -> Result<()> {
    let agent_uri = resolve_agent(authorizer, api.username(), api)
        .await
        .context("Failed to resolve the event authorizer")?;

    let files = list_spreadsheets(&layout.root)
        .with_context(|| format!("Failed to list spreadsheets in {}", layout.root.display()))?;
    if files.is_empty() {
        log::info!("No spreadsheets found in {}", layout.root.display());
    }

    let ctx = RunContext {
        api,
        agent_uri,
        output_dir: layout.outputs(),
        backup_dir: layout.backups(),
        reporter,
    };
    sweep(&files, &ctx, report).await?;
    Ok(())
}
