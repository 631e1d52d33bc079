//! Opening sample sources and destinations by name.
//!
//! The name `-` selects standard input or standard output, anything else is a
//! filesystem path.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};

/// Name that selects standard input or standard output.
pub const STDIO_NAME: &str = "-";

/// Open a readable byte stream.
///
/// # Errors
/// Returns the underlying IO error if the file cannot be opened.
pub fn open_input(path: &str) -> io::Result<Box<dyn Read>> {
    if path == STDIO_NAME {
        return Ok(Box::new(io::stdin()));
    }
    Ok(Box::new(File::open(path)?))
}

/// Open a writable byte stream, creating or truncating files.
///
/// # Errors
/// Returns the underlying IO error if the file cannot be created.
pub fn open_output(path: &str) -> io::Result<Box<dyn Write>> {
    if path == STDIO_NAME {
        return Ok(Box::new(io::stdout()));
    }
    Ok(Box::new(BufWriter::new(File::create(path)?)))
}

/// Fill `buf` from `reader` until it is full or the stream ends.
///
/// Interrupted reads are retried. Returns the number of bytes read, which is
/// only less than `buf.len()` at end of stream.
pub fn read_block<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
