//! The constant table: per-unit storage, atomic unit replacement and
//! qualifier-aware value lookup.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::record::{ConstantRecord, DeclarationDescriptor};
use super::rebuild::{RebuildJob, RebuildSummary};
use crate::cache::{hash_bytes, UnitCache};
use crate::common::qualification_matches;
use crate::config::ConstvizConfig;
use crate::error::{ConstvizError, ConstvizResult};
use crate::extract::SourceUnit;

/// Externally visible lifecycle state of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    /// No rebuild has completed; lookups return nothing
    Unready,
    /// At least one rebuild ran to completion, possibly with failed units
    Ready,
}

/// Why a unit update left the index untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Generated code (`.designer.cs`, `.g.cs`, ...)
    Generated,
    /// The unit's language is switched off in the configuration
    LanguageDisabled,
}

/// Outcome of [`ConstantIndex::update_unit_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    /// The unit's records were replaced; holds the new record count
    Updated(usize),
    /// Content identical to the last successful extraction
    Unchanged,
    Skipped(SkipReason),
}

/// Owned store of every known constant.
///
/// Records are grouped per source unit in insertion order. A unit update
/// re-appends the unit at the end, which is also the order cross-unit
/// lookups fall back through.
#[derive(Debug, Default)]
pub struct ConstantIndex {
    units: IndexMap<String, Vec<ConstantRecord>>,
    /// identifier -> units declaring it, in insertion order
    by_identifier: HashMap<String, Vec<String>>,
    fingerprints: UnitCache,
    ready: bool,
    /// Bumped by every rebuild start, abort and reset
    generation: u64,
    /// Generation of the rebuild job currently allowed to write
    rebuild_in_flight: Option<u64>,
}

impl ConstantIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> IndexState {
        if self.ready {
            IndexState::Ready
        } else {
            IndexState::Unready
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether a rebuild job has been started and not finished yet.
    pub fn is_rebuilding(&self) -> bool {
        self.rebuild_in_flight.is_some()
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.units.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.units.values().all(Vec::is_empty)
    }

    /// All records, grouped by unit in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &ConstantRecord> {
        self.units.values().flatten()
    }

    /// Records of one unit, empty if the unit is unknown.
    pub fn records_for(&self, source: &str) -> &[ConstantRecord] {
        self.units.get(source).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Known source units in insertion order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    /// Distinct known identifiers in first-seen order.
    ///
    /// This is the candidate set handed to the word matcher.
    pub fn candidates(&self) -> Vec<&str> {
        let mut seen = HashSet::with_capacity(self.by_identifier.len());
        self.records()
            .map(|r| r.identifier.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Replaces every record of `source` with the eligible `declarations`.
    ///
    /// Ineligible declarations (not `const`, or without initializer) are
    /// dropped, and a repeated `(identifier, qualification)` keeps its first
    /// occurrence. Returns the number of records now held for `source`.
    pub fn update_unit<I>(&mut self, source: &str, declarations: I) -> usize
    where
        I: IntoIterator<Item = DeclarationDescriptor>,
    {
        let mut seen = HashSet::new();
        let records: Vec<ConstantRecord> = declarations
            .into_iter()
            .filter_map(|decl| decl.into_record(source))
            .filter(|r| seen.insert((r.identifier.clone(), r.qualification.clone())))
            .collect();

        self.fingerprints.forget(source);
        self.replace_unit(source, records)
    }

    /// Extracts `unit` and replaces its records, keeping the old ones if
    /// extraction fails.
    ///
    /// Extraction failures are logged here with the unit's context and
    /// returned to the caller, who may ignore them.
    pub fn update_unit_text(
        &mut self,
        unit: &SourceUnit,
        config: &ConstvizConfig,
    ) -> ConstvizResult<UnitOutcome> {
        if unit.is_generated() {
            debug!(source = %unit.id, "skipping generated unit");
            return Ok(UnitOutcome::Skipped(SkipReason::Generated));
        }
        if !config.is_enabled(unit.language) {
            return Ok(UnitOutcome::Skipped(SkipReason::LanguageDisabled));
        }

        let hash = hash_bytes(unit.text.as_bytes());
        if self.fingerprints.is_unchanged(&unit.id, &hash) {
            return Ok(UnitOutcome::Unchanged);
        }

        let declarations = match unit.language.extract(unit) {
            Ok(declarations) => declarations,
            Err(err) => {
                log_extraction_failure(&err);
                return Err(err);
            }
        };

        let count = self.update_unit(&unit.id, declarations);
        self.fingerprints.record(&unit.id, hash);
        debug!(source = %unit.id, records = count, "unit updated");
        Ok(UnitOutcome::Updated(count))
    }

    /// Drops every record of `source`. Returns whether the unit was known.
    pub fn remove_unit(&mut self, source: &str) -> bool {
        self.fingerprints.forget(source);
        self.detach_unit(source).is_some()
    }

    /// Clears all records and returns to [`IndexState::Unready`].
    ///
    /// A rebuild job still in flight is cancelled: its next step reports
    /// [`RebuildStep::Cancelled`](super::RebuildStep::Cancelled) without
    /// touching the index.
    pub fn reset(&mut self) {
        self.units.clear();
        self.by_identifier.clear();
        self.fingerprints.clear();
        self.ready = false;
        self.generation += 1;
        self.rebuild_in_flight = None;
    }

    /// Cancels the rebuild in flight, if any, so a new one can start.
    ///
    /// Needed when a job is dropped before it finished. Records the job
    /// already inserted stay, and the state is left as it was.
    pub fn abort_rebuild(&mut self) -> bool {
        if self.rebuild_in_flight.take().is_none() {
            return false;
        }
        self.generation += 1;
        debug!(event = "rebuild_aborted", records = self.len());
        true
    }

    /// Starts a full rebuild over `units`.
    ///
    /// The table is cleared immediately; the returned job then processes
    /// one whole unit per [`RebuildJob::step`]. Fails with
    /// [`ConstvizError::RebuildInFlight`] if another job has not finished.
    pub fn begin_rebuild<I>(
        &mut self,
        units: I,
        config: &ConstvizConfig,
    ) -> ConstvizResult<RebuildJob<I::IntoIter>>
    where
        I: IntoIterator<Item = SourceUnit>,
    {
        if self.rebuild_in_flight.is_some() {
            return Err(ConstvizError::RebuildInFlight);
        }
        self.generation += 1;
        self.rebuild_in_flight = Some(self.generation);
        self.units.clear();
        self.by_identifier.clear();
        self.fingerprints.clear();
        Ok(RebuildJob::new(units.into_iter(), config.clone(), self.generation))
    }

    /// Whether the job started at `generation` still owns the rebuild.
    pub(crate) fn owns_rebuild(&self, generation: u64) -> bool {
        self.rebuild_in_flight == Some(generation)
    }

    /// Called by a rebuild job once its last unit is processed.
    pub(crate) fn finish_rebuild(&mut self, generation: u64) {
        if self.owns_rebuild(generation) {
            self.rebuild_in_flight = None;
            self.ready = true;
        }
    }

    /// Rebuilds the whole table in one call.
    pub fn rebuild_all<I>(
        &mut self,
        units: I,
        config: &ConstvizConfig,
    ) -> ConstvizResult<RebuildSummary>
    where
        I: IntoIterator<Item = SourceUnit>,
    {
        let job = self.begin_rebuild(units, config)?;
        Ok(job.run(self))
    }

    /// Resolves the display value of `identifier` written after
    /// `qualifier_hint` in `current_source`.
    ///
    /// Declarations in the current unit shadow same-named ones elsewhere.
    /// Returns `None` when nothing matches or the index is not ready.
    pub fn resolve(
        &self,
        identifier: &str,
        qualifier_hint: &str,
        current_source: &str,
    ) -> Option<&str> {
        if !self.ready {
            return None;
        }

        let first_in = |source: &str| {
            self.records_for(source)
                .iter()
                .filter(|r| r.identifier == identifier)
                .filter(|r| qualification_matches(&r.qualification, qualifier_hint))
                .map(|r| r.value.as_str())
                .find(|v| !v.trim().is_empty())
        };

        if let Some(value) = first_in(current_source) {
            return Some(value);
        }

        self.by_identifier
            .get(identifier)?
            .iter()
            .filter(|source| source.as_str() != current_source)
            .find_map(|source| first_in(source.as_str()))
    }

    /// Swaps a unit's records in one step.
    fn replace_unit(&mut self, source: &str, records: Vec<ConstantRecord>) -> usize {
        self.detach_unit(source);

        let mut declared: Vec<&str> = records.iter().map(|r| r.identifier.as_str()).collect();
        declared.sort_unstable();
        declared.dedup();
        for identifier in declared {
            self.by_identifier
                .entry(identifier.to_string())
                .or_default()
                .push(source.to_string());
        }

        let count = records.len();
        self.units.insert(source.to_string(), records);
        count
    }

    /// Removes a unit and its secondary-index entries.
    fn detach_unit(&mut self, source: &str) -> Option<Vec<ConstantRecord>> {
        let old = self.units.shift_remove(source)?;
        for record in &old {
            if let Some(sources) = self.by_identifier.get_mut(&record.identifier) {
                sources.retain(|s| s != source);
                if sources.is_empty() {
                    self.by_identifier.remove(&record.identifier);
                }
            }
        }
        Some(old)
    }
}

/// Logs an extraction failure with all the context it carries.
pub(crate) fn log_extraction_failure(err: &ConstvizError) {
    match err {
        ConstvizError::Extraction {
            source_id,
            message,
            offset,
            text,
        } => warn!(
            event = "extraction_failed",
            source = %source_id,
            offset = ?offset,
            text = ?text,
            "{message}"
        ),
        other => warn!(event = "extraction_failed", error = %other),
    }
}
