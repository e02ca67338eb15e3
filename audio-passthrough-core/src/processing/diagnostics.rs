use std::io::Write;

use crate::models::error::PassthroughError;

/// Lowest `range` selecting the detailed dump; `RANGE_MIN - 1` selects the short one.
pub const RANGE_MIN: i32 = 4;
pub const RANGE_MAX: i32 = 5;

/// Error code recorded for a failed render transfer.
pub const WRITE_FRAME_ERROR_CODE: i32 = -2;
/// Error code recorded for a failed capture transfer.
pub const READ_FRAME_ERROR_CODE: i32 = -3;

/// One recorded transfer failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticsEntry {
    pub error_code: i32,
    /// Stream frame counter at the time of the failure.
    pub frames: u64,
    pub reason: String,
    pub timestamp: String,
    /// Position of this entry among all failures ever recorded.
    pub sequence: u64,
}

/// Fixed-capacity circular log of recent transfer failures.
///
/// Overflow behavior: overwrites the oldest entry. The total error count keeps
/// growing past the capacity and is never reset.
#[derive(Debug)]
pub struct DiagnosticsRing {
    entries: Vec<DiagnosticsEntry>,
    write_index: usize,
    capacity: usize,
    total_errors: u64,
}

impl DiagnosticsRing {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            write_index: 0,
            capacity,
            total_errors: 0,
        }
    }

    /// Record a failure, stamping it with the local wall-clock time.
    pub fn record(&mut self, error_code: i32, frames: u64, reason: impl Into<String>) {
        let entry = DiagnosticsEntry {
            error_code,
            frames,
            reason: reason.into(),
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            sequence: self.total_errors,
        };

        if self.entries.len() < self.capacity {
            self.entries.push(entry);
        } else {
            self.entries[self.write_index] = entry;
        }
        self.write_index = (self.write_index + 1) % self.capacity;
        self.total_errors += 1;
    }

    /// Entries currently held, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &DiagnosticsEntry> {
        let split = if self.entries.len() < self.capacity {
            0
        } else {
            self.write_index
        };
        self.entries[split..].iter().chain(self.entries[..split].iter())
    }

    /// Number of entries currently held.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Failures recorded since creation, including overwritten ones.
    pub fn total_errors(&self) -> u64 {
        self.total_errors
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Write the log to `sink`.
    ///
    /// `range == RANGE_MIN - 1` prints the short table, `RANGE_MIN..=RANGE_MAX`
    /// the detailed one; anything else prints an out-of-range notice.
    pub fn render(&self, range: i32, sink: &mut dyn Write) -> Result<(), PassthroughError> {
        self.render_inner(range, sink)
            .map_err(|e| PassthroughError::Internal(format!("failed to write dump: {}", e)))
    }

    fn render_inner(&self, range: i32, sink: &mut dyn Write) -> std::io::Result<()> {
        writeln!(sink, "Number of errors: {}", self.total_errors)?;
        if !(RANGE_MIN - 1..=RANGE_MAX).contains(&range) {
            writeln!(sink, "Out of range, invalid output")?;
            return Ok(());
        }

        if range < RANGE_MIN {
            writeln!(sink, "{:<5}  {:<10}  {}", "count", "errorCode", "Time")?;
            for entry in self.entries() {
                writeln!(sink, "{:<5}  {:<10}  {}", entry.sequence + 1, entry.error_code, entry.timestamp)?;
            }
        } else {
            writeln!(
                sink,
                "{:<5}  {:<10}  {:<20}  {:<15}  {}",
                "count", "errorCode", "frames", "fail reason", "Time"
            )?;
            for entry in self.entries() {
                writeln!(
                    sink,
                    "{:<5}  {:<10}  {:<20}  {:<15}  {}",
                    entry.sequence + 1,
                    entry.error_code,
                    entry.frames,
                    entry.reason,
                    entry.timestamp
                )?;
            }
        }
        Ok(())
    }
}
