//! Byte-for-byte file comparison.
//!
//! The comparison never fails: unreadable or missing files count as
//! "not identical" so that a broken comparison cannot report equality.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::Path;

use tracing::{error, info, warn};

/// A point where two byte streams disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divergence {
    /// The bytes at `position` differ. `None` means that side had already
    /// ended.
    Byte {
        position: u64,
        left: Option<u8>,
        right: Option<u8>,
    },
    /// The streams have different lengths.
    SizeMismatch,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Divergence::Byte {
                position,
                left,
                right,
            } => write!(
                f,
                "difference at position {position}: {} != {}",
                fmt_byte(*left),
                fmt_byte(*right)
            ),
            Divergence::SizeMismatch => write!(f, "files differ in size"),
        }
    }
}

fn fmt_byte(byte: Option<u8>) -> String {
    match byte {
        Some(b) => format!("0x{b:02X}"),
        None => "EOF".to_string(),
    }
}

/// Walk both streams in lockstep and report every divergence to `report`.
///
/// Scanning continues past the first mismatch. Returns `Ok(true)` only when
/// both streams hold exactly the same bytes.
pub fn compare_streams<A: Read, B: Read>(
    left: A,
    right: B,
    mut report: impl FnMut(Divergence),
) -> io::Result<bool> {
    let mut left = BufReader::new(left).bytes();
    let mut right = BufReader::new(right).bytes();

    let mut identical = true;
    let mut lengths_differ = false;
    let mut position: u64 = 0;

    loop {
        let l = left.next().transpose()?;
        let r = right.next().transpose()?;

        if l.is_none() && r.is_none() {
            break;
        }
        if l.is_none() || r.is_none() {
            lengths_differ = true;
        }
        if l != r {
            identical = false;
            report(Divergence::Byte {
                position,
                left: l,
                right: r,
            });
        }
        position += 1;
    }

    // Both sides reported EOF together; make sure neither has anything left.
    let left_rest = left.next().transpose()?;
    let right_rest = right.next().transpose()?;
    if lengths_differ || left_rest.is_some() || right_rest.is_some() {
        identical = false;
        report(Divergence::SizeMismatch);
    }

    Ok(identical)
}

/// Compare two files, logging every divergence.
pub fn compare_files(left: &Path, right: &Path) -> bool {
    compare_files_with(left, right, |divergence| {
        warn!(%divergence, "files diverge");
    })
}

/// Compare two files, handing every divergence to `report`.
///
/// Open and read failures are logged and yield `false`.
pub fn compare_files_with(left: &Path, right: &Path, report: impl FnMut(Divergence)) -> bool {
    let result = File::open(left)
        .and_then(|l| File::open(right).map(|r| (l, r)))
        .and_then(|(l, r)| compare_streams(l, r, report));

    match result {
        Ok(identical) => {
            info!(?left, ?right, identical, "comparison complete");
            identical
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            error!(?left, ?right, error = %e, "file not found");
            false
        }
        Err(e) => {
            error!(?left, ?right, error = %e, "comparison failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tempfile::TempDir;
    use tracing_test::traced_test;

    use super::*;

    fn collect(left: &[u8], right: &[u8]) -> (bool, Vec<Divergence>) {
        let mut seen = Vec::new();
        let identical =
            compare_streams(Cursor::new(left), Cursor::new(right), |d| seen.push(d)).unwrap();
        (identical, seen)
    }

    #[test]
    fn identical_streams() {
        let (identical, seen) = collect(b"planar", b"planar");
        assert!(identical);
        assert!(seen.is_empty());
    }

    #[test]
    fn empty_streams_are_identical() {
        let (identical, seen) = collect(b"", b"");
        assert!(identical);
        assert!(seen.is_empty());
    }

    #[test]
    fn reports_every_differing_position() {
        let (identical, seen) = collect(&[1, 2, 3, 4], &[1, 9, 3, 8]);
        assert!(!identical);
        assert_eq!(
            seen,
            vec![
                Divergence::Byte { position: 1, left: Some(2), right: Some(9) },
                Divergence::Byte { position: 3, left: Some(4), right: Some(8) },
            ]
        );
    }

    #[test]
    fn extra_trailing_byte_is_a_size_mismatch() {
        let (identical, seen) = collect(&[1, 2], &[1, 2, 3]);
        assert!(!identical);
        assert_eq!(
            seen,
            vec![
                Divergence::Byte { position: 2, left: None, right: Some(3) },
                Divergence::SizeMismatch,
            ]
        );
    }

    /// Yields its first chunk, then reports EOF once, then yields the rest,
    /// like a file that is still being appended to.
    struct Growing {
        chunks: Vec<Vec<u8>>,
    }

    impl Read for Growing {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.chunks.is_empty() {
                return Ok(0);
            }
            let chunk = self.chunks.remove(0);
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn data_after_simultaneous_eof_is_a_size_mismatch() {
        let left = Growing {
            chunks: vec![vec![7], Vec::new(), vec![9]],
        };
        let mut seen = Vec::new();
        let identical = compare_streams(left, Cursor::new([7u8]), |d| seen.push(d)).unwrap();

        assert!(!identical);
        assert_eq!(seen, vec![Divergence::SizeMismatch]);
    }

    #[test]
    fn divergence_display() {
        let d = Divergence::Byte { position: 7, left: Some(0xAB), right: None };
        assert_eq!(d.to_string(), "difference at position 7: 0xAB != EOF");
        assert_eq!(Divergence::SizeMismatch.to_string(), "files differ in size");
    }

    #[test]
    #[traced_test]
    fn file_is_identical_to_itself() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.bin");
        std::fs::write(&path, (0..=255u8).collect::<Vec<_>>()).unwrap();
        assert!(compare_files(&path, &path));
    }

    #[test]
    #[traced_test]
    fn single_byte_difference_is_logged() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.bin");
        let b = tmp.path().join("b.bin");
        std::fs::write(&a, [0u8, 1, 2, 3, 4]).unwrap();
        std::fs::write(&b, [0u8, 1, 7, 3, 4]).unwrap();

        let mut seen = Vec::new();
        assert!(!compare_files_with(&a, &b, |d| seen.push(d)));
        assert_eq!(
            seen,
            vec![Divergence::Byte { position: 2, left: Some(2), right: Some(7) }]
        );

        assert!(!compare_files(&a, &b));
        assert!(logs_contain("difference at position 2"));
    }

    #[test]
    #[traced_test]
    fn missing_file_is_not_identical() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.bin");
        std::fs::write(&a, b"x").unwrap();
        let missing = tmp.path().join("missing.bin");

        assert!(!compare_files(&a, &missing));
        assert!(!compare_files(&missing, &a));
        assert!(logs_contain("file not found"));
    }

    #[test]
    #[traced_test]
    fn read_failure_is_not_identical() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.bin");
        std::fs::write(&a, b"x").unwrap();

        // Opening a directory succeeds on unix but reading it fails.
        assert!(!compare_files(&a, tmp.path()));
    }
}
