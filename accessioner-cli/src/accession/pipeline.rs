//! Row pipeline: one input sheet, processed row by row
//!
//! Each row moves through `resolve-container → build-payload → post →
//! post-events → write-output`. A failure before the output is written
//! abandons the rest of the file; rows already written stay in the output
//! sheet. Event failures only cost their own slot.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::action::Action;
use super::backup::write_backup;
use super::builder::{RecordPayload, build_create, build_update};
use super::containers::{ContainerCache, match_container};
use super::events::record_events;
use super::resolver::{resolve_parent_id, resolve_repository, resolve_resource_id};
use super::row::{AccessionRow, HEADER_ROW_COUNT, OutputWriter, read_rows};
use crate::api::ArchivesSpaceApi;
use crate::api::models::PostResponse;
use crate::error::{AccessionError, ApiError, DataValidationError};
use crate::services::Reporter;

/// Final classification of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Complete,
    Errors,
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Complete => write!(f, "complete"),
            FileOutcome::Errors => write!(f, "errors"),
        }
    }
}

/// Stage of the row pipeline a failure happened in
///
/// Event posting sits between `Post` and `WriteOutput` but never fails the
/// row, so it has no stage of its own here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStage {
    ResolveContainer,
    BuildPayload,
    Post,
    WriteOutput,
}

impl fmt::Display for RowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RowStage::ResolveContainer => "resolve-container",
            RowStage::BuildPayload => "build-payload",
            RowStage::Post => "post",
            RowStage::WriteOutput => "write-output",
        };
        f.write_str(name)
    }
}

/// A row failure that abandons the rest of its file
#[derive(Debug, Error)]
#[error("row {row_number} failed at {stage}: {source}")]
pub struct RowError {
    pub row_number: usize,
    pub stage: RowStage,
    #[source]
    pub source: AccessionError,
}

/// What happened to a single row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Written { uri: String },
    Skipped,
}

/// Per-file result handed back to the sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub outcome: FileOutcome,
    pub rows_written: usize,
    pub rows_skipped: usize,
    pub output: Option<PathBuf>,
}

impl FileSummary {
    fn failed_before_rows() -> Self {
        Self {
            outcome: FileOutcome::Errors,
            rows_written: 0,
            rows_skipped: 0,
            output: None,
        }
    }
}

/// Run-wide collaborators shared by every file
pub struct RunContext<'a> {
    pub api: &'a dyn ArchivesSpaceApi,
    /// Agent linked as authorizer on every event
    pub agent_uri: String,
    pub output_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub reporter: &'a dyn Reporter,
}

impl RunContext<'_> {
    /// `<outputs>/<input stem>_out.csv`
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.output_dir.join(format!("{}_out.csv", stem))
    }
}

/// Per-file state carried from row to row
struct FileState<'a> {
    action: Action,
    repository_id: String,
    containers: ContainerCache,
    writer: OutputWriter,
    ctx: &'a RunContext<'a>,
}

/// Process one input sheet end to end
///
/// Problems confined to the file (bad filename, unreadable or empty sheet, a
/// failing row) come back as a `FileSummary` with `FileOutcome::Errors`.
/// Only an unknown repository is returned as `Err`, since nothing else in
/// the run can be trusted to resolve either.
pub async fn process_file(
    path: &Path,
    ctx: &RunContext<'_>,
) -> Result<FileSummary, AccessionError> {
    let action = match Action::from_path(path) {
        Ok(action) => action,
        Err(e) => {
            log::error!("{}", e);
            ctx.reporter.message(&e.to_string());
            return Ok(FileSummary::failed_before_rows());
        }
    };

    let rows = match read_rows(path) {
        Ok(rows) => rows,
        Err(e) => {
            log::error!("Failed to read {}: {}", path.display(), e);
            return Ok(FileSummary::failed_before_rows());
        }
    };

    let Some(first_row) = rows.first() else {
        let e = DataValidationError::new(path.display().to_string(), "at least one data row");
        log::error!("{}", e);
        return Ok(FileSummary::failed_before_rows());
    };

    log::info!("{} ({}, {} rows)", path.display(), action, rows.len());
    ctx.reporter.file_started(path, rows.len());

    let repository_id = resolve_repository(&first_row.repository_name, ctx.api).await?;

    let mut containers = ContainerCache::new();
    if first_row.has_container() {
        let parent_id = resolve_parent_id(&first_row.parent_record);
        if let Err(e) = containers
            .containers_for(&first_row.top_container, &parent_id, &repository_id, ctx.api)
            .await
        {
            log::error!("Container lookup for {} failed: {}", parent_id, e);
        }
    }

    let output = ctx.output_path(path);
    let writer = match OutputWriter::create(&output) {
        Ok(writer) => writer,
        Err(e) => {
            log::error!("Failed to create {}: {}", output.display(), e);
            return Ok(FileSummary::failed_before_rows());
        }
    };

    let mut state = FileState {
        action,
        repository_id,
        containers,
        writer,
        ctx,
    };

    let mut summary = FileSummary {
        outcome: FileOutcome::Complete,
        rows_written: 0,
        rows_skipped: 0,
        output: Some(output),
    };

    for (index, row) in rows.into_iter().enumerate() {
        let row_number = index + HEADER_ROW_COUNT + 1;
        match process_row(row.clone(), row_number, &mut state).await {
            Ok(RowOutcome::Written { uri }) => {
                summary.rows_written += 1;
                ctx.reporter.row_done(row_number, &uri);
            }
            Ok(RowOutcome::Skipped) => {
                summary.rows_skipped += 1;
                log::warn!("Skipping row {}: missing ArchivesSpace URI: {:?}", row_number, row);
                ctx.reporter.row_skipped(row_number, "missing ArchivesSpace URI");
            }
            Err(e) => {
                log::error!("{} in {}", e, path.display());
                log::debug!("{:?}", row);
                ctx.reporter.row_failed(row_number, &e.to_string());
                summary.outcome = FileOutcome::Errors;
                break;
            }
        }
    }

    ctx.reporter
        .file_finished(path, summary.outcome, summary.rows_written);
    Ok(summary)
}

async fn process_row(
    mut row: AccessionRow,
    row_number: usize,
    state: &mut FileState<'_>,
) -> Result<RowOutcome, RowError> {
    let at = |stage: RowStage| {
        move |source: AccessionError| RowError {
            row_number,
            stage,
            source,
        }
    };
    let api = state.ctx.api;
    let repository_id = state.repository_id.as_str();

    let object_id = resolve_parent_id(&row.parent_record);
    if object_id.is_empty() {
        return Ok(RowOutcome::Skipped);
    }
    let resource_id = resolve_resource_id(&row.parent_record);

    if row.has_container() {
        let indicator = row.top_container.clone();
        let containers = state
            .containers
            .containers_for(&indicator, &object_id, repository_id, api)
            .await
            .map_err(at(RowStage::ResolveContainer))?;
        let uri = match_container(containers, &indicator)
            .map_err(|e| at(RowStage::ResolveContainer)(e.into()))?;
        row.top_container = uri.to_string();
    }

    let payload = match state.action {
        Action::Create => build_create(&row, repository_id, &object_id, &resource_id),
        Action::Update => {
            prepare_update(&row, repository_id, &object_id, state.ctx)
                .await
                .map_err(at(RowStage::BuildPayload))?
        }
    };

    let uri = post_record(&payload, api)
        .await
        .map_err(at(RowStage::Post))?;
    row.new_component_uri = Some(uri.clone());

    row.event_uris = record_events(&row, &state.ctx.agent_uri, &uri, repository_id, api).await;

    state
        .writer
        .write_row(&row)
        .map_err(at(RowStage::WriteOutput))?;

    Ok(RowOutcome::Written { uri })
}

/// Fetch the record, snapshot it, and apply the row to it
async fn prepare_update(
    row: &AccessionRow,
    repository_id: &str,
    object_id: &str,
    ctx: &RunContext<'_>,
) -> Result<RecordPayload, AccessionError> {
    let record_path = format!("/repositories/{}/archival_objects/{}", repository_id, object_id);
    let record = ctx.api.get_json(&record_path).await?;
    write_backup(&ctx.backup_dir, &record_path, &record)?;
    Ok(build_update(record, row, repository_id, object_id))
}

async fn post_record(
    payload: &RecordPayload,
    api: &dyn ArchivesSpaceApi,
) -> Result<String, AccessionError> {
    let response = api.post_json(&payload.endpoint, &payload.body).await;
    let response = match response {
        Ok(response) => response,
        Err(e) => {
            log::debug!("Rejected payload for {}: {}", payload.endpoint, payload.body);
            return Err(e.into());
        }
    };
    let posted: PostResponse = serde_json::from_value(response)?;
    posted.uri.ok_or_else(|| {
        ApiError::decode(payload.endpoint.clone(), "response carried no uri").into()
    })
}
