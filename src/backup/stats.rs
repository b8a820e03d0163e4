// logbackuptool/src/backup/stats.rs
use std::fmt;

/// Counters for a single run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub uploaded: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl RunStats {
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} uploaded={} deleted={} skipped={} errors={}",
            self.total, self.uploaded, self.deleted, self.skipped, self.errors
        )
    }
}
