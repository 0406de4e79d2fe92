use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::bus::Frame;

/// Append-only trace of observed frames, one candump-style line each:
/// `(epoch.micros) channel ID#HEX`.
pub struct TraceLog {
    out: BufWriter<File>,
    channel: String,
}

impl TraceLog {
    pub fn create(path: &Path, channel: &str) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            out: BufWriter::new(file),
            channel: channel.to_owned(),
        })
    }

    pub(crate) fn append(&mut self, frame: &Frame) -> io::Result<()> {
        let now = chrono::Utc::now();
        write!(
            self.out,
            "({}.{:06}) {} ",
            now.timestamp(),
            now.timestamp_subsec_micros(),
            self.channel
        )?;
        if frame.is_extended() {
            write!(self.out, "{:08X}#", frame.id())?;
        } else {
            write!(self.out, "{:03X}#", frame.id())?;
        }
        for byte in frame.data() {
            write!(self.out, "{byte:02X}")?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}
