//! Chunked draining of asynchronous input.

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Size of each read from a message stream.
pub(crate) const CHUNK_SIZE: usize = 8 * 1024;

/// Read `reader` to completion, handing every chunk to `sink` in order.
///
/// Returns the number of bytes consumed.
pub(crate) async fn drain<R, F>(mut reader: R, mut sink: F) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    F: FnMut(&[u8]),
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let n = reader.read(&mut buf).await?;

        if n == 0 {
            break;
        }

        sink(&buf[..n]);
        total += n as u64;
    }

    tracing::trace!(bytes = total, "drained message stream");
    Ok(total)
}
