//! Response body that counts delivered bytes and logs when it is done

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, HttpBody};
use bytes::Bytes;
use http_body::{Frame, SizeHint};

use super::logging::RequestLogger;
use super::record::RequestRecord;
use crate::error::RequestErrors;

/// Record waiting for the response body to finish
struct PendingRecord {
    logger: RequestLogger,
    record: RequestRecord,
    errors: Option<RequestErrors>,
}

/// Wraps a response body, counting the bytes handed to the client.
///
/// The access record is emitted once, when the body reaches its end, fails,
/// or is dropped before completion.
pub(crate) struct LoggedBody {
    inner: Body,
    written: u64,
    pending: Option<PendingRecord>,
}

impl LoggedBody {
    pub(crate) fn new(
        inner: Body,
        logger: RequestLogger,
        record: RequestRecord,
        errors: Option<RequestErrors>,
    ) -> Self {
        Self {
            inner,
            written: 0,
            pending: Some(PendingRecord {
                logger,
                record,
                errors,
            }),
        }
    }

    fn finish(&mut self) {
        if let Some(PendingRecord {
            logger,
            mut record,
            errors,
        }) = self.pending.take()
        {
            record.bytes_out = i64::try_from(self.written).unwrap_or(i64::MAX);
            logger.log(&record, errors.as_ref());
        }
    }
}

impl HttpBody for LoggedBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);

        match &polled {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.written += data.len() as u64;
                }
                if this.inner.is_end_stream() {
                    this.finish();
                }
            }
            Poll::Ready(Some(Err(_))) | Poll::Ready(None) => this.finish(),
            Poll::Pending => {}
        }

        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for LoggedBody {
    fn drop(&mut self) {
        self.finish();
    }
}
