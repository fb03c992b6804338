use std::fmt;

/// Phases of a resumable download.
///
/// Connecting → Downloading → Verifying → Committing → Completed. A restart
/// after an unusable range goes back to Connecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    #[default]
    Connecting,
    Downloading,
    /// Hashing the finished file (only with a configured checksum).
    Verifying,
    /// Moving the partial file to its destination.
    Committing,
    Completed,
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchPhase::Connecting => write!(f, "Connecting"),
            FetchPhase::Downloading => write!(f, "Downloading"),
            FetchPhase::Verifying => write!(f, "Verifying"),
            FetchPhase::Committing => write!(f, "Committing"),
            FetchPhase::Completed => write!(f, "Completed"),
        }
    }
}

/// Snapshot passed to progress callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub phase:            FetchPhase,
    /// Bytes present in the partial file, including resumed bytes.
    pub bytes_downloaded: u64,
    /// Length of the whole entity, when the server reported it.
    pub total_bytes:      Option<u64>,
    /// Offset the current attempt resumed from; zero for a fresh download.
    pub resumed_from:     u64,
}

impl Progress {
    pub fn new(phase: FetchPhase, bytes_downloaded: u64, total_bytes: Option<u64>, resumed_from: u64) -> Self {
        Self {
            phase,
            bytes_downloaded,
            total_bytes,
            resumed_from,
        }
    }

    pub fn percentage(&self) -> Option<f64> {
        self.total_bytes
            .filter(|total| *total > 0)
            .map(|total| self.bytes_downloaded as f64 / total as f64 * 100.0)
    }
}
