//! Streaming FASTQ record reader
//!
//! Reads a FASTQ file one line at a time through a reused buffer, so memory
//! stays constant regardless of file size. Lines are handled as bytes, so a
//! stray non-UTF-8 byte never aborts a scan.

use crate::error::{QcError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

/// Lines per FASTQ record: header, sequence, separator, quality
pub const RECORD_LINES: u64 = 4;

const COUNT_CHUNK_SIZE: usize = 64 * 1024;

/// Open a FASTQ file for buffered reading
pub fn open_fastq(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| QcError::from_io(path, e))?;
    Ok(BufReader::new(file))
}

/// One sequencing read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastqRecord {
    pub header: String,
    pub sequence: Vec<u8>,
    pub separator: String,
    pub quality: Vec<u8>,
}

impl FastqRecord {
    /// Header with the leading `@` removed
    pub fn id(&self) -> &str {
        self.header.strip_prefix('@').unwrap_or(&self.header)
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Line iterator with trailing whitespace (including `\r\n`) removed
pub struct LineReader<R> {
    reader: R,
    buf: Vec<u8>,
    lines_read: u64,
    path: PathBuf,
}

impl LineReader<BufReader<File>> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Ok(Self::new(open_fastq(path)?, path))
    }
}

impl<R: BufRead> LineReader<R> {
    /// `path` is only used to label errors
    pub fn new<P: Into<PathBuf>>(reader: R, path: P) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(512),
            lines_read: 0,
            path: path.into(),
        }
    }

    pub fn next_line(&mut self) -> Result<Option<&[u8]>> {
        self.buf.clear();
        let n = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|e| QcError::from_io(&self.path, e))?;
        if n == 0 {
            return Ok(None);
        }
        self.lines_read += 1;

        let end = self
            .buf
            .iter()
            .rposition(|b| !b.is_ascii_whitespace())
            .map_or(0, |i| i + 1);
        Ok(Some(&self.buf[..end]))
    }

    /// Lines consumed so far, including any partial trailing record
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Groups lines into complete 4-line records.
///
/// A trailing window with fewer than four lines is never yielded, but its
/// lines still show up in [`FastqReader::lines_read`].
pub struct FastqReader<R> {
    lines: LineReader<R>,
    records_read: u64,
}

impl FastqReader<BufReader<File>> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_lines(LineReader::from_path(path)?))
    }
}

impl<R: BufRead> FastqReader<R> {
    pub fn new<P: Into<PathBuf>>(reader: R, path: P) -> Self {
        Self::from_lines(LineReader::new(reader, path))
    }

    fn from_lines(lines: LineReader<R>) -> Self {
        Self {
            lines,
            records_read: 0,
        }
    }

    pub fn next_record(&mut self) -> Result<Option<FastqRecord>> {
        let header = match self.lines.next_line()? {
            Some(line) => String::from_utf8_lossy(line).into_owned(),
            None => return Ok(None),
        };
        let sequence = match self.lines.next_line()? {
            Some(line) => line.to_vec(),
            None => return Ok(None),
        };
        let separator = match self.lines.next_line()? {
            Some(line) => String::from_utf8_lossy(line).into_owned(),
            None => return Ok(None),
        };
        let quality = match self.lines.next_line()? {
            Some(line) => line.to_vec(),
            None => return Ok(None),
        };

        self.records_read += 1;
        Ok(Some(FastqRecord {
            header,
            sequence,
            separator,
            quality,
        }))
    }

    pub fn lines_read(&self) -> u64 {
        self.lines.lines_read()
    }

    pub fn records_read(&self) -> u64 {
        self.records_read
    }
}

impl<R: BufRead> Iterator for FastqReader<R> {
    type Item = Result<FastqRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Count lines without decoding them.
///
/// A final line without a terminating newline still counts.
pub fn count_lines<P: AsRef<Path>>(path: P) -> Result<u64> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| QcError::from_io(path, e))?;
    let mut buf = vec![0u8; COUNT_CHUNK_SIZE];
    let mut lines = 0u64;
    let mut last_byte = None;

    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(QcError::from_io(path, e)),
        };
        lines += memchr::memchr_iter(b'\n', &buf[..n]).count() as u64;
        last_byte = Some(buf[n - 1]);
    }

    if matches!(last_byte, Some(b) if b != b'\n') {
        lines += 1;
    }
    Ok(lines)
}

/// Exact read count from the line count; the file must hold whole records
pub fn count_reads<P: AsRef<Path>>(path: P) -> Result<u64> {
    let path = path.as_ref();
    let lines = count_lines(path)?;
    if lines % RECORD_LINES != 0 {
        return Err(QcError::LineCount {
            path: path.to_path_buf(),
            lines,
        });
    }
    Ok(lines / RECORD_LINES)
}
