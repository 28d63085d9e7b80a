//! Per-request archive bookkeeping.

use std::collections::BTreeSet;

use serde::Serialize;
use strum::{Display, IntoStaticStr};
use uuid::Uuid;

/// Lifecycle of one archive build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Entries are being fetched and written.
    Building,
    /// The central directory is being written.
    Finalizing,
    /// The archive is complete.
    Done,
    /// The archive was cut short.
    Aborted,
}

impl JobState {
    /// Returns `true` for [`Done`](Self::Done) and [`Aborted`](Self::Aborted).
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

/// Counters and state of one archive build.
///
/// Owned by the writer task of a single request.
#[derive(Debug)]
pub struct ArchiveJob {
    written: usize,
    skipped: usize,
    failed_ids: BTreeSet<Uuid>,
    state: JobState,
}

impl Default for ArchiveJob {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveJob {
    /// Creates a job in the [`Building`](JobState::Building) state.
    pub fn new() -> Self {
        Self {
            written: 0,
            skipped: 0,
            failed_ids: BTreeSet::new(),
            state: JobState::Building,
        }
    }

    #[inline]
    pub fn state(&self) -> JobState {
        self.state
    }

    #[inline]
    pub fn written(&self) -> usize {
        self.written
    }

    #[inline]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    #[inline]
    pub fn failed_ids(&self) -> &BTreeSet<Uuid> {
        &self.failed_ids
    }

    /// Counts one entry written to the archive.
    pub fn record_written(&mut self) {
        debug_assert_eq!(self.state, JobState::Building);
        self.written += 1;
    }

    /// Counts one photo that could not be fetched.
    pub fn record_skipped(&mut self, id: Uuid) {
        debug_assert_eq!(self.state, JobState::Building);
        self.skipped += 1;
        self.failed_ids.insert(id);
    }

    /// Moves from `Building` to `Finalizing`. Returns `false` otherwise.
    pub fn begin_finalizing(&mut self) -> bool {
        self.transition(JobState::Building, JobState::Finalizing)
    }

    /// Moves from `Finalizing` to `Done`. Returns `false` otherwise.
    pub fn finish(&mut self) -> bool {
        self.transition(JobState::Finalizing, JobState::Done)
    }

    /// Moves any non-terminal state to `Aborted`. Returns `false` if already terminal.
    pub fn abort(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }

        self.state = JobState::Aborted;
        true
    }

    /// Snapshots the counters.
    pub fn summary(&self, bytes_emitted: u64) -> ArchiveSummary {
        ArchiveSummary {
            entries_written: self.written,
            skipped: self.skipped,
            failed_ids: self.failed_ids.iter().copied().collect(),
            bytes_emitted,
        }
    }

    fn transition(&mut self, from: JobState, to: JobState) -> bool {
        if self.state != from {
            return false;
        }

        self.state = to;
        true
    }
}

/// Outcome of a completed archive build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveSummary {
    pub entries_written: usize,
    pub skipped: usize,
    pub failed_ids: Vec<Uuid>,
    pub bytes_emitted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions() {
        let mut job = ArchiveJob::new();
        job.record_written();
        job.record_written();
        let missing = Uuid::new_v4();
        job.record_skipped(missing);

        assert!(job.begin_finalizing());
        assert!(job.finish());
        assert_eq!(job.state(), JobState::Done);
        assert!(!job.abort());

        let summary = job.summary(1024);
        assert_eq!(summary.entries_written, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed_ids, vec![missing]);
        assert_eq!(summary.bytes_emitted, 1024);
    }

    #[test]
    fn transitions_are_monotonic() {
        let mut job = ArchiveJob::new();
        assert!(!job.finish());
        assert!(job.abort());
        assert!(!job.begin_finalizing());
        assert!(!job.finish());
        assert_eq!(job.state(), JobState::Aborted);
    }

    #[test]
    fn finalizing_can_abort() {
        let mut job = ArchiveJob::new();
        assert!(job.begin_finalizing());
        assert!(job.abort());
        assert!(job.state().is_terminal());
    }

    #[test]
    fn skipping_the_same_photo_twice_counts_twice() {
        let mut job = ArchiveJob::new();
        let id = Uuid::new_v4();
        job.record_skipped(id);
        job.record_skipped(id);
        assert_eq!(job.skipped(), 2);
        assert_eq!(job.failed_ids().len(), 1);
    }
}
