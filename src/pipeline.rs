use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::error::{Result, ReportError};
use crate::io::Input;
use crate::io::excel_write;
use crate::loader;
use crate::model::Category;
use crate::reconcile::Reconciler;
use crate::report::{self, Report};
use crate::schema::Config;

/// A composed report together with its serialised spreadsheet.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub report: Report,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Runs the whole pipeline on two uploaded files held in memory.
///
/// Nothing is returned unless every stage succeeds, so a caller never sees a
/// partially written spreadsheet.
#[instrument(
    level = "info",
    skip_all,
    fields(roster = roster.name, poll = poll.name, in_person = in_person)
)]
pub fn generate(
    roster: &Input<'_>,
    poll: &Input<'_>,
    in_person: u32,
    config: &Config,
) -> Result<GeneratedReport> {
    let expected = loader::load_roster(roster, &config.roster)?;
    let records = loader::load_attendance(poll, &config.poll)?;

    let reconciler = Reconciler::new(config.submitted_sentinels.clone());
    let reconciliation = reconciler.reconcile(&expected, &records);
    info!(
        polls = reconciliation.rows_in(Category::Polls).count(),
        not_entered = reconciliation.rows_in(Category::NotEntered).count(),
        "attendance reconciled"
    );

    let timestamp = loader::load_meeting_timestamp(poll, &config.poll)?;
    let report = report::compose(timestamp.as_deref(), reconciliation, in_person)?;

    let bytes = excel_write::write_report_to_buffer(&report)?;
    let file_name = report.file_name();
    info!(
        %file_name,
        row_count = report.rows.len(),
        zoom_total = report.totals.zoom_total,
        grand_total = report.totals.grand_total,
        "report generated"
    );

    Ok(GeneratedReport {
        report,
        file_name,
        bytes,
    })
}

/// Reads both inputs from disk, generates the report and saves it as
/// `Output_<date>.xlsx` inside `output_dir`. Any existing file of that name
/// is replaced.
#[instrument(
    level = "info",
    skip_all,
    fields(roster = %roster.display(), poll = %poll.display(), output_dir = %output_dir.display())
)]
pub fn generate_from_paths(
    roster: &Path,
    poll: &Path,
    in_person: u32,
    output_dir: &Path,
    config: &Config,
) -> Result<(PathBuf, Report)> {
    for path in [roster, poll] {
        if !path.exists() {
            return Err(ReportError::MissingInput(path.to_path_buf()));
        }
    }

    let roster_bytes = fs::read(roster)?;
    let poll_bytes = fs::read(poll)?;
    let roster_name = roster.to_string_lossy();
    let poll_name = poll.to_string_lossy();

    let generated = generate(
        &Input::new(&roster_name, &roster_bytes),
        &Input::new(&poll_name, &poll_bytes),
        in_person,
        config,
    )?;

    fs::create_dir_all(output_dir)?;
    let output = output_dir.join(&generated.file_name);
    fs::write(&output, &generated.bytes)?;
    info!(output = %output.display(), "report written");
    Ok((output, generated.report))
}
