//! Body transfer
//!
//! Bodies are copied verbatim from a reader to a writer until the reader
//! reports end of input. There is no framing: the byte count is whatever
//! the source yields before it ends.

use super::STREAM_BUFFER_LEN;
use std::io::{self, Read, Write};

/// Byte streamer with a reusable intermediate buffer
pub struct ByteStreamer {
    buffer: Vec<u8>,
}

impl ByteStreamer {
    /// Create a streamer with the default 1 MiB buffer
    pub fn new() -> Self {
        Self::with_buffer_len(STREAM_BUFFER_LEN)
    }

    /// Create a streamer with a custom buffer size
    pub fn with_buffer_len(len: usize) -> Self {
        ByteStreamer {
            buffer: vec![0u8; len.max(1)],
        }
    }

    /// Copy everything from `reader` into `writer`
    ///
    /// Returns the number of bytes copied. The writer is flushed once the
    /// reader is exhausted.
    pub fn copy<R, W>(&mut self, reader: &mut R, writer: &mut W) -> io::Result<u64>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let mut total = 0u64;

        loop {
            let n = match reader.read(&mut self.buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            writer.write_all(&self.buffer[..n])?;
            total += n as u64;
        }

        writer.flush()?;
        Ok(total)
    }
}

impl Default for ByteStreamer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy `reader` into `writer` with a fresh streamer
pub fn copy_stream<R, W>(reader: &mut R, writer: &mut W) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    ByteStreamer::new().copy(reader, writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader that hands out at most `step` bytes per call
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_copy_binary() {
        let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let mut out = Vec::new();

        let n = copy_stream(&mut Cursor::new(data.clone()), &mut out).unwrap();
        assert_eq!(n, 10_000);
        assert_eq!(out, data);
    }

    #[test]
    fn test_copy_empty() {
        let mut out = Vec::new();
        assert_eq!(copy_stream(&mut io::empty(), &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_copy_small_buffer_short_reads() {
        let data = b"\0\0zero bytes\0and more".to_vec();
        let mut reader = Trickle {
            data: data.clone(),
            pos: 0,
            step: 3,
        };
        let mut out = Vec::new();

        let mut streamer = ByteStreamer::with_buffer_len(2);
        assert_eq!(streamer.copy(&mut reader, &mut out).unwrap(), data.len() as u64);
        assert_eq!(out, data);
    }

    #[test]
    fn test_streamer_reuse() {
        let mut streamer = ByteStreamer::with_buffer_len(4);
        let mut out = Vec::new();

        streamer.copy(&mut Cursor::new(b"first".to_vec()), &mut out).unwrap();
        streamer.copy(&mut Cursor::new(b"second".to_vec()), &mut out).unwrap();
        assert_eq!(out, b"firstsecond");
    }
}
