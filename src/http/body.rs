//! Response body types
//!
//! Every response is a `ServeBody`: fixed bodies come from `full`/`empty`,
//! files are streamed by `FileBody` straight from the open handle.

use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::{Body, Bytes, Frame, SizeHint};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};

pub type ServeBody = UnsyncBoxBody<Bytes, io::Error>;

pub fn full(data: impl Into<Bytes>) -> ServeBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

pub fn empty() -> ServeBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Streams exactly `len` bytes of an open file, `chunk_size` at a time.
///
/// The handle is closed when the body is dropped: on completion, on a read
/// error, or when hyper abandons the body because the client went away.
/// A file that shrank after it was opened yields `UnexpectedEof`, which makes
/// hyper drop the connection instead of sending a short body as complete.
pub struct FileBody {
    file: File,
    remaining: u64,
    buf: Vec<u8>,
}

impl FileBody {
    pub fn new(file: File, len: u64, chunk_size: usize) -> Self {
        let capacity = usize::try_from(len).map_or(chunk_size, |l| l.min(chunk_size));
        Self {
            file,
            remaining: len,
            buf: vec![0; capacity.max(1)],
        }
    }

    pub fn boxed(self) -> ServeBody {
        BodyExt::boxed_unsync(self)
    }
}

impl Body for FileBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if this.remaining == 0 {
            return Poll::Ready(None);
        }

        let want = usize::try_from(this.remaining)
            .map_or(this.buf.len(), |r| r.min(this.buf.len()));
        let mut read_buf = ReadBuf::new(&mut this.buf[..want]);

        match Pin::new(&mut this.file).poll_read(cx, &mut read_buf) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(e)) => {
                this.remaining = 0;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(Ok(())) => {
                let filled = read_buf.filled();
                if filled.is_empty() {
                    let missing = this.remaining;
                    this.remaining = 0;
                    return Poll::Ready(Some(Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("file ended {missing} bytes early"),
                    ))));
                }
                this.remaining -= filled.len() as u64;
                Poll::Ready(Some(Ok(Frame::data(Bytes::copy_from_slice(filled)))))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.remaining == 0
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.remaining)
    }
}
