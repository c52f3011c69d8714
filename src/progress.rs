//! For reporting what the pipeline is doing and aborting early

use std::io::Write;

/// A trait that is used to report progress to some consumer.
pub trait ProgressReporter {
    /// Called once, after the frame files have been collected and before any is decoded.
    fn frames_found(&mut self, _count: usize) {}

    /// Called after each frame has been written.
    ///
    /// This method may return `false` to abort processing.
    fn increase(&mut self) -> bool;

    /// Writing is done when `Writer::write()` returns. The caller reports it with a message.
    fn done(&mut self, _msg: &str) {}
}

/// No-op progress reporter
pub struct NoProgress {}

impl ProgressReporter for NoProgress {
    fn increase(&mut self) -> bool {
        true
    }
}

/// Prints one line per milestone, e.g. `Found 12 frames`.
///
/// Per-frame progress is not printed.
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Gives back the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ProgressReporter for ConsoleReporter<W> {
    fn frames_found(&mut self, count: usize) {
        // a closed stdout is not an encoding error
        let _ = writeln!(self.out, "Found {count} frames");
    }

    fn increase(&mut self) -> bool {
        true
    }

    fn done(&mut self, msg: &str) {
        let _ = writeln!(self.out, "{msg}");
        let _ = self.out.flush();
    }
}
