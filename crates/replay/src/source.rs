//! JSON-lines tick source.
//!
//! One [`Tick`] object per line; blank lines are ignored.

use ladder_core::{Error, Result, Tick};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Iterator over ticks read from a line-oriented reader.
pub struct TickSource<R> {
    reader: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> TickSource<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }
}

impl TickSource<BufReader<File>> {
    /// Open a tick file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> Iterator for TickSource<R> {
    type Item = Result<Tick>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(Error::Io(e))),
            }
            self.line_no += 1;

            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }

            return Some(
                serde_json::from_str(line)
                    .map_err(|e| Error::data(format!("line {}: {}", self.line_no, e))),
            );
        }
    }
}
