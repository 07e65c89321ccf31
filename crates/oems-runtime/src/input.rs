//! Input loading
//!
//! The first line of the input file holds the elements as raw bytes, one
//! byte per element. The trailing newline, and anything after it, is ignored
//! and never read. At most `width + 1` bytes of the line are buffered.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use oems_core::{Element, OemsError, OemsResult};

/// Read exactly `width` elements from the first line of `path`
pub fn load_elements(path: &Path, width: usize) -> OemsResult<Vec<Element>> {
    let origin = path.display().to_string();
    let file = File::open(path).map_err(|e| input_error(&origin, e))?;
    read_elements(BufReader::new(file), width, &origin)
}

/// Parse the first line of `data`; `origin` names the source in errors
pub fn parse_elements(data: &[u8], width: usize, origin: &str) -> OemsResult<Vec<Element>> {
    read_elements(data, width, origin)
}

/// Read the first line from `reader`, stopping at its newline
pub fn read_elements<R: BufRead>(mut reader: R, width: usize, origin: &str) -> OemsResult<Vec<Element>> {
    let mut line = Vec::with_capacity(width + 1);
    let limit = width as u64 + 1;
    let read = reader
        .by_ref()
        .take(limit)
        .read_until(b'\n', &mut line)
        .map_err(|e| input_error(origin, e))?;
    if read == 0 {
        return Err(OemsError::EmptyInput(origin.to_string()));
    }

    let mut length = line.len();
    if line.last() == Some(&b'\n') {
        length -= 1;
    } else if read as u64 == limit {
        length += skip_line(&mut reader).map_err(|e| input_error(origin, e))?;
    }

    if length != width {
        return Err(OemsError::InputLength {
            expected: width,
            actual: length,
        });
    }
    line.truncate(width);
    Ok(line)
}

/// Consume the rest of an overlong line, returning how many bytes it held
fn skip_line<R: BufRead>(reader: &mut R) -> io::Result<usize> {
    let mut skipped = 0;
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(skipped);
        }
        match buf.iter().position(|b| *b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(skipped + end);
            }
            None => {
                let len = buf.len();
                reader.consume(len);
                skipped += len;
            }
        }
    }
}

fn input_error(origin: &str, err: io::Error) -> OemsError {
    OemsError::InputFile {
        path: origin.to_string(),
        reason: err.to_string(),
    }
}
