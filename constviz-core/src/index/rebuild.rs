//! Resumable full rebuild.
//!
//! A [`RebuildJob`] owns the remaining units and is stepped by the host, one
//! whole unit per step. Between steps the index is consistent and may be
//! read; a unit is never half-applied.

use std::time::{Duration, Instant};
use tracing::info;

use super::constant_index::{ConstantIndex, SkipReason, UnitOutcome};
use crate::config::ConstvizConfig;
use crate::extract::SourceUnit;

/// What a single [`RebuildJob::step`] did.
#[derive(Debug)]
pub enum RebuildStep {
    /// One unit was processed; more may follow
    Processed { source: String, result: StepResult },
    /// No units left; the index is now ready
    Finished(RebuildSummary),
    /// The index was reset or the rebuild aborted; this job no longer
    /// writes to it
    Cancelled,
}

/// Per-unit result of a rebuild step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    Indexed(usize),
    Skipped(SkipReason),
    /// Extraction failed; the message is already logged
    Failed(String),
}

/// Totals of a completed rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildSummary {
    /// Units whose records were inserted
    pub indexed_units: usize,
    /// Units skipped as generated or disabled
    pub skipped_units: usize,
    /// Units whose extraction failed, with the error message
    pub failed_units: Vec<(String, String)>,
    /// Records in the index after the rebuild
    pub records: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobState {
    Running,
    Finished,
    Cancelled,
}

/// A full rebuild in progress.
///
/// The job only writes to the index while it owns the index's rebuild
/// generation. A job dropped before finishing keeps that ownership until
/// [`ConstantIndex::abort_rebuild`] or [`ConstantIndex::reset`] is called.
#[derive(Debug)]
pub struct RebuildJob<I> {
    units: I,
    config: ConstvizConfig,
    generation: u64,
    summary: RebuildSummary,
    started: Instant,
    state: JobState,
}

impl<I> RebuildJob<I>
where
    I: Iterator<Item = SourceUnit>,
{
    pub(crate) fn new(units: I, config: ConstvizConfig, generation: u64) -> Self {
        Self {
            units,
            config,
            generation,
            summary: RebuildSummary::default(),
            started: Instant::now(),
            state: JobState::Running,
        }
    }

    /// Whether the job already returned [`RebuildStep::Finished`].
    pub fn is_finished(&self) -> bool {
        self.state == JobState::Finished
    }

    /// Whether the job was superseded by a reset or an abort.
    pub fn is_cancelled(&self) -> bool {
        self.state == JobState::Cancelled
    }

    /// Processes the next unit, or finishes the job.
    ///
    /// A failed unit is recorded and the job moves on. Calling `step` after
    /// the job finished returns an empty summary and leaves the index as is.
    pub fn step(&mut self, index: &mut ConstantIndex) -> RebuildStep {
        match self.state {
            JobState::Finished => return RebuildStep::Finished(RebuildSummary::default()),
            JobState::Cancelled => return RebuildStep::Cancelled,
            JobState::Running => {}
        }
        if !index.owns_rebuild(self.generation) {
            self.state = JobState::Cancelled;
            info!(event = "rebuild_cancelled", processed = self.processed(), "rebuild superseded");
            return RebuildStep::Cancelled;
        }

        let Some(unit) = self.units.next() else {
            return RebuildStep::Finished(self.finish(index));
        };

        let result = match index.update_unit_text(&unit, &self.config) {
            Ok(UnitOutcome::Updated(count)) => {
                self.summary.indexed_units += 1;
                StepResult::Indexed(count)
            }
            // The table was cleared when the job started, so an unchanged
            // fingerprint means the same unit was listed twice.
            Ok(UnitOutcome::Unchanged) => StepResult::Indexed(index.records_for(&unit.id).len()),
            Ok(UnitOutcome::Skipped(reason)) => {
                self.summary.skipped_units += 1;
                StepResult::Skipped(reason)
            }
            Err(err) => {
                let message = err.to_string();
                self.summary.failed_units.push((unit.id.clone(), message.clone()));
                StepResult::Failed(message)
            }
        };

        RebuildStep::Processed {
            source: unit.id,
            result,
        }
    }

    /// Steps until the job finishes. A cancelled job returns the totals
    /// of the units it processed before it was superseded.
    pub fn run(mut self, index: &mut ConstantIndex) -> RebuildSummary {
        loop {
            match self.step(index) {
                RebuildStep::Processed { .. } => {}
                RebuildStep::Finished(summary) => return summary,
                RebuildStep::Cancelled => {
                    let mut summary = std::mem::take(&mut self.summary);
                    summary.elapsed = self.started.elapsed();
                    return summary;
                }
            }
        }
    }

    fn processed(&self) -> usize {
        self.summary.indexed_units + self.summary.skipped_units + self.summary.failed_units.len()
    }

    fn finish(&mut self, index: &mut ConstantIndex) -> RebuildSummary {
        self.state = JobState::Finished;
        index.finish_rebuild(self.generation);

        let mut summary = std::mem::take(&mut self.summary);
        summary.records = index.len();
        summary.elapsed = self.started.elapsed();

        info!(
            event = "rebuild_complete",
            indexed = summary.indexed_units,
            skipped = summary.skipped_units,
            failed = summary.failed_units.len(),
            records = summary.records,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "constant index rebuilt"
        );
        summary
    }
}
