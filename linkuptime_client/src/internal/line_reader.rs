use std::{borrow::Cow, io};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Splits an inbound byte stream into protocol lines.
///
/// Lines may end in CRLF or a bare LF, and blank lines are skipped. Bytes
/// that aren't valid UTF-8 are replaced with U+FFFD, so a server description
/// in some other encoding only garbles that one line.
pub struct LineReader<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buf: Vec::new(),
        }
    }

    /// The next non-empty line, or `None` at end of stream.
    ///
    /// Cancel safe: a partly read line stays buffered until the next call.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            let read = self.reader.read_until(b'\n', &mut self.buf).await?;
            if read == 0 && self.buf.is_empty() {
                return Ok(None);
            }

            let line = decode(&self.buf);
            self.buf.clear();
            if !line.is_empty() {
                return Ok(Some(line));
            }
        }
    }
}

fn decode(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

    match String::from_utf8_lossy(raw) {
        Cow::Borrowed(line) => line.to_string(),
        Cow::Owned(line) => {
            tracing::debug!("Replaced invalid UTF-8 in {:?}", line);
            line
        }
    }
}
