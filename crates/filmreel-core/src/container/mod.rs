//! The planar RGB container: a packed header followed by frames stored as
//! consecutive R, G and B planes.

pub mod decoder;
pub mod frame;
pub mod header;

use std::io::{ErrorKind, Read};

/// Fill `buf` from `reader`, stopping early only at end of stream.
/// Returns the number of bytes read, which is short only on EOF.
pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut read = 0;
    while read < buf.len() {
        match reader.read(&mut buf[read..]) {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(read)
}
