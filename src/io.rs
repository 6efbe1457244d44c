//! Line readers for hash files and potfiles.
//!
//! Small files go through a buffered reader; files at or above the mmap
//! threshold are memory-mapped and split on `\n` with `memchr`. Either way a
//! trailing `\r` is dropped and invalid UTF-8 is decoded lossily, so one bad
//! byte does not lose the whole file.
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use memmap2::Mmap;

/// Threshold in bytes above which inputs are memory-mapped.
pub const DEFAULT_MMAP_THRESHOLD_BYTES: u64 = 16 * 1024 * 1024; // 16 MiB

pub type LineIter = Box<dyn Iterator<Item = io::Result<String>> + Send + 'static>;

pub fn should_use_mmap(file_size_bytes: u64, threshold_bytes: u64) -> bool {
    file_size_bytes >= threshold_bytes
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

struct BufferedLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> Iterator for BufferedLines<R> {
    type Item = io::Result<String>;
    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                let line = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf);
                Some(Ok(decode_line(line)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

struct MmapLines {
    mmap: Mmap,
    pos: usize,
}

impl Iterator for MmapLines {
    type Item = io::Result<String>;
    fn next(&mut self) -> Option<Self::Item> {
        let data: &[u8] = &self.mmap;
        if self.pos >= data.len() {
            return None;
        }
        let rest = &data[self.pos..];
        let line = match memchr::memchr(b'\n', rest) {
            Some(off) => {
                self.pos += off + 1;
                &rest[..off]
            }
            None => {
                self.pos = data.len();
                rest
            }
        };
        Some(Ok(decode_line(line)))
    }
}

pub fn iter_lines_bufread<P: AsRef<Path>>(path: P) -> Result<LineIter> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    Ok(Box::new(BufferedLines {
        reader: BufReader::new(file),
        buf: Vec::new(),
    }))
}

pub fn iter_lines_mmap<P: AsRef<Path>>(path: P) -> Result<LineIter> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    // SAFETY: the map is read-only and inputs are not expected to change
    // while a report is being generated.
    let mmap = unsafe { Mmap::map(&file) }.with_context(|| format!("mmap {}", path.display()))?;
    Ok(Box::new(MmapLines { mmap, pos: 0 }))
}

/// Choose mmap or buffered reading from the file size.
pub fn iter_lines_auto<P: AsRef<Path>>(path: P, threshold_bytes: u64) -> Result<LineIter> {
    let path = path.as_ref();
    let meta = std::fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    if meta.is_file() && should_use_mmap(meta.len(), threshold_bytes) {
        iter_lines_mmap(path)
    } else {
        iter_lines_bufread(path)
    }
}

/// Read every line of `path`, failing on the first read error.
pub fn read_lines<P: AsRef<Path>>(path: P, threshold_bytes: u64) -> Result<Vec<String>> {
    let path = path.as_ref();
    iter_lines_auto(path, threshold_bytes)?
        .collect::<io::Result<Vec<String>>>()
        .with_context(|| format!("read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn buffered_and_mmap_agree() {
        let f = fixture(b"a:1\r\nb:2\n\nc:\xff3");
        let buffered = read_lines(f.path(), u64::MAX).unwrap();
        let mapped = read_lines(f.path(), 0).unwrap();
        assert_eq!(buffered, vec!["a:1", "b:2", "", "c:\u{fffd}3"]);
        assert_eq!(buffered, mapped);
    }

    #[test]
    fn keeps_surrounding_spaces() {
        let f = fixture(b"hash: pw \n");
        assert_eq!(read_lines(f.path(), 0).unwrap(), vec!["hash: pw "]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_lines("/nonexistent/graphcat/input.txt", 0).is_err());
        assert!(should_use_mmap(10, 10));
        assert!(!should_use_mmap(9, 10));
    }
}
