//! Backup summary and reporting

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Export phases, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Workspaces,
    Databases,
    Notebooks,
    Files,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Workspaces => "workspaces",
            Phase::Databases => "databases",
            Phase::Notebooks => "notebooks",
            Phase::Files => "files",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Counts for one completed phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSummary {
    pub phase: Phase,

    /// Items returned by the listing call
    pub listed: usize,

    /// Artifacts written (or files downloaded)
    pub exported: usize,

    /// Files already present locally
    pub skipped: usize,

    pub bytes_downloaded: u64,

    pub duration: Duration,
}

impl PhaseSummary {
    pub fn new(phase: Phase, listed: usize) -> Self {
        Self {
            phase,
            listed,
            exported: 0,
            skipped: 0,
            bytes_downloaded: 0,
            duration: Duration::ZERO,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Summary of a full backup run
#[derive(Debug, Clone)]
pub struct BackupSummary {
    pub run_dir: PathBuf,
    pub phases: Vec<PhaseSummary>,
    pub duration: Duration,
}

impl BackupSummary {
    pub fn new(run_dir: impl Into<PathBuf>) -> Self {
        Self {
            run_dir: run_dir.into(),
            phases: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn add_phase(&mut self, phase: PhaseSummary) {
        self.phases.push(phase);
    }

    /// Summary of `phase`, if it ran
    pub fn phase(&self, phase: Phase) -> Option<&PhaseSummary> {
        self.phases.iter().find(|p| p.phase == phase)
    }

    pub fn total_exported(&self) -> usize {
        self.phases.iter().map(|p| p.exported).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.phases.iter().map(|p| p.skipped).sum()
    }

    pub fn bytes_downloaded(&self) -> u64 {
        self.phases.iter().map(|p| p.bytes_downloaded).sum()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        for phase in &self.phases {
            tracing::info!(
                phase = %phase.phase,
                listed = phase.listed,
                exported = phase.exported,
                skipped = phase.skipped,
                bytes_downloaded = phase.bytes_downloaded,
                duration_ms = phase.duration.as_millis() as u64,
                "Phase summary"
            );
        }

        tracing::info!(
            run_dir = %self.run_dir.display(),
            exported = self.total_exported(),
            skipped = self.total_skipped(),
            bytes_downloaded = self.bytes_downloaded(),
            duration_secs = self.duration.as_secs(),
            "Backup completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let mut summary = BackupSummary::new("/b/2024-01-01_00-00-00");
        let mut workspaces = PhaseSummary::new(Phase::Workspaces, 3);
        workspaces.exported = 3;
        let mut files = PhaseSummary::new(Phase::Files, 5);
        files.exported = 2;
        files.skipped = 3;
        files.bytes_downloaded = 2048;

        summary.add_phase(workspaces);
        summary.add_phase(files);

        assert_eq!(summary.total_exported(), 5);
        assert_eq!(summary.total_skipped(), 3);
        assert_eq!(summary.bytes_downloaded(), 2048);
        assert_eq!(summary.phase(Phase::Files).map(|p| p.listed), Some(5));
        assert!(summary.phase(Phase::Databases).is_none());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Notebooks.to_string(), "notebooks");
    }
}
