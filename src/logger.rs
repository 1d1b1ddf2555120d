// The event log: where the dispatch pipeline writes its formatted lines.
// The window shell keeps a capped buffer mirrored into an edit control; the
// headless shell streams lines straight to stdout.

use std::collections::VecDeque;
use std::io::{self, Write};

/// Destination for trace lines. Lines never contain a trailing newline.
pub trait LogSink {
    fn write_line(&mut self, line: &str);
}

impl LogSink for Vec<String> {
    fn write_line(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// Append-only, capped line buffer. Appending past the cap discards the
/// oldest line; the newest line is always retained.
#[derive(Debug)]
pub struct LogBuffer {
    lines: VecDeque<String>,
    max_lines: usize,
    evicted: u64,
}

impl LogBuffer {
    /// Creates a buffer holding at most `max_lines` lines (at least one).
    pub fn new(max_lines: usize) -> Self {
        let max_lines = max_lines.max(1);
        LogBuffer {
            lines: VecDeque::with_capacity(max_lines.min(1024)),
            max_lines,
            evicted: 0,
        }
    }

    /// Appends a line and returns the line it pushed out, if any.
    pub fn push(&mut self, line: &str) -> Option<String> {
        let evicted = if self.lines.len() == self.max_lines {
            self.evicted += 1;
            self.lines.pop_front()
        } else {
            None
        };
        self.lines.push_back(line.to_string());
        evicted
    }

    pub fn newest(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Total number of lines discarded so far.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// The retained text as the edit control shows it: CRLF after every line.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push_str("\r\n");
        }
        text
    }
}

impl LogSink for LogBuffer {
    fn write_line(&mut self, line: &str) {
        self.push(line);
    }
}

/// Streams lines to a writer. The first write error is kept and later
/// writes are skipped, so the caller can report it once.
pub struct WriterSink<W: Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        WriterSink { writer, error: None }
    }

    /// Flushes the writer and returns the first error seen, if any.
    pub fn finish(&mut self) -> io::Result<()> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()
    }

    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> LogSink for WriterSink<W> {
    fn write_line(&mut self, line: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.writer, "{line}") {
            self.error = Some(e);
        }
    }
}
