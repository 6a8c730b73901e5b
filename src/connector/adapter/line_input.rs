use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

use crate::application::InputSource;
use crate::domain::DomainError;

/// [`InputSource`] over any async buffered reader, one line per call.
///
/// Line terminators (`\n` or `\r\n`) are stripped; nothing else is trimmed,
/// so blank lines come through as empty strings. Bytes that are not valid
/// UTF-8 are replaced with U+FFFD rather than rejected.
pub struct LineInput<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R> LineInput<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl LineInput<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R> InputSource for LineInput<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_line(&mut self) -> Result<Option<String>, DomainError> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
            return Ok(None);
        }

        if self.buf.ends_with(b"\n") {
            self.buf.pop();
            if self.buf.ends_with(b"\r") {
                self.buf.pop();
            }
        }

        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}
