use crate::ingest::types::LogEntry;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Tees folded entries to a JSONL file that can be replayed later.
pub struct LogRecorder {
    writer: BufWriter<File>,
    written: usize,
}

impl LogRecorder {
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
            written: 0,
        })
    }

    pub fn record(&mut self, entry: &LogEntry) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, entry)?;
        writeln!(&mut self.writer)?;
        self.written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn written(&self) -> usize {
        self.written
    }
}
