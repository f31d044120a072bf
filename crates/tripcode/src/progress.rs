//! The console progress line.

/// Tracks the hash rate between successive progress lines.
#[derive(Debug)]
pub struct Progress {
    start: std::time::Instant,
    last_count: u64,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    /// Start measuring now.
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
            last_count: 0,
        }
    }

    /// Render the line for a new total. Meant to be called once a
    /// second, so the delta since the last call reads as a rate.
    pub fn line(&mut self, count: u64) -> String {
        let delta = count.saturating_sub(self.last_count);
        self.last_count = count;
        format_line(count, delta, self.start.elapsed().as_secs())
    }
}

/// `Hashes: <total> (<delta> hash/s) | Elapsed <secs> sec`
pub fn format_line(count: u64, per_sec: u64, elapsed_secs: u64) -> String {
    format!("Hashes: {count} ({per_sec} hash/s) | Elapsed {elapsed_secs} sec")
}
