//! One GET attempt over libcurl, exposed as a pull-based body stream.
//!
//! Each attempt gets its own `Easy2` handle driven by its own `Multi` handle:
//! `open` pumps the transfer until the header block of the final response is
//! complete (or the transfer ends), and [`BodyStream::read`]
//! keeps pumping on demand, so nothing is buffered beyond what one
//! `perform` delivers.

use std::collections::VecDeque;
use std::io::{self, Read};
use std::str;
use std::time::Duration;

use curl::easy::{Easy2, Handler, WriteError};
use curl::multi::{Easy2Handle, Multi};

use crate::retry::AttemptError;

const MAX_REDIRECTIONS: u32 = 10;
const WAIT_SLICE: Duration = Duration::from_millis(100);

/// Status line of the most recent response (redirects and 1xx replace it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StatusLine {
    pub code: u16,
    pub reason: Option<String>,
}

/// Parse `HTTP/1.1 503 Service Unavailable` (or `HTTP/2 503`).
pub(crate) fn parse_status_line(line: &str) -> Option<StatusLine> {
    let line = line.trim_end();
    if !line.starts_with("HTTP/") {
        return None;
    }
    let mut parts = line.splitn(3, ' ');
    let _version = parts.next()?;
    let code = parts.next()?.trim().parse::<u16>().ok()?;
    let reason = parts
        .next()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);
    Some(StatusLine { code, reason })
}

/// Easy2 handler: tracks the status line and queues body bytes for the reader.
#[derive(Debug, Default)]
pub(crate) struct ResponseHandler {
    pub(crate) status: Option<StatusLine>,
    /// The current header block carried a `Location` header.
    location: bool,
    /// Header block of the final response (not 1xx, not a followed redirect)
    /// has ended.
    pub(crate) headers_done: bool,
    pub(crate) body: VecDeque<u8>,
    pub(crate) body_started: bool,
}

impl ResponseHandler {
    /// Whether curl moves past a response with this status instead of
    /// handing its body to `write`.
    fn is_intermediate(&self, code: u16) -> bool {
        (100..200).contains(&code) || ((300..400).contains(&code) && code != 304 && self.location)
    }
}

impl Handler for ResponseHandler {
    fn header(&mut self, data: &[u8]) -> bool {
        let Ok(line) = str::from_utf8(data) else {
            return true;
        };
        if let Some(status) = parse_status_line(line) {
            self.status = Some(status);
            self.location = false;
            self.headers_done = false;
        } else if line.trim_end().is_empty() {
            if let Some(code) = self.status.as_ref().map(|s| s.code) {
                self.headers_done = !self.is_intermediate(code);
            }
        } else if line
            .split_once(':')
            .is_some_and(|(name, _)| name.trim().eq_ignore_ascii_case("location"))
        {
            self.location = true;
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        self.body_started = true;
        self.body.extend(data);
        Ok(data.len())
    }
}

enum TransferState {
    Running,
    Done,
    Failed(curl::Error),
    /// The failure has already been reported to the reader.
    Reported,
}

/// Open HTTP 200 response body. Implements [`Read`]; dropping it detaches the
/// easy handle and closes the connection.
pub struct BodyStream {
    handle: Easy2Handle<ResponseHandler>,
    multi: Multi,
    state: TransferState,
}

impl std::fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BodyStream")
            .field("buffered", &self.handle.get_ref().body.len())
            .field("finished", &!matches!(self.state, TransferState::Running))
            .finish()
    }
}

impl BodyStream {
    /// Drive the transfer once: perform, collect completion, and wait briefly
    /// for socket activity if nothing is buffered yet.
    fn pump(&mut self) -> Result<(), curl::MultiError> {
        let running = self.multi.perform()?;
        let handle = &self.handle;
        let mut finished = None;
        self.multi.messages(|msg| {
            if let Some(res) = msg.result_for2(handle) {
                finished = Some(res);
            }
        });
        match finished {
            Some(Ok(())) => self.state = TransferState::Done,
            Some(Err(e)) => self.state = TransferState::Failed(e),
            None if running == 0 => self.state = TransferState::Done,
            None => {
                if self.handle.get_ref().body.is_empty() {
                    self.multi.wait(&mut [], WAIT_SLICE)?;
                }
            }
        }
        Ok(())
    }

    /// Takes a pending transfer failure, leaving the stream marked as reported.
    fn take_failure(&mut self) -> Option<curl::Error> {
        match std::mem::replace(&mut self.state, TransferState::Reported) {
            TransferState::Failed(e) => Some(e),
            other => {
                self.state = other;
                None
            }
        }
    }

    fn is_running(&self) -> bool {
        matches!(self.state, TransferState::Running)
    }

    fn has_final_headers(&self) -> bool {
        let handler = self.handle.get_ref();
        handler.headers_done || handler.body_started
    }
}

impl Read for BodyStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let body = &mut self.handle.get_mut().body;
            if !body.is_empty() {
                return body.read(buf);
            }
            if let Some(e) = self.take_failure() {
                let kind = if e.is_operation_timedout() {
                    io::ErrorKind::TimedOut
                } else {
                    io::ErrorKind::Other
                };
                return Err(io::Error::new(kind, e));
            }
            match self.state {
                TransferState::Running => {
                    self.pump().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
                }
                TransferState::Done => return Ok(0),
                TransferState::Failed(_) | TransferState::Reported => {
                    return Err(io::Error::new(
                        io::ErrorKind::Other,
                        "transfer already failed",
                    ));
                }
            }
        }
    }
}

fn easy_for(url: &str, timeout: Duration) -> Result<Easy2<ResponseHandler>, curl::Error> {
    let mut easy = Easy2::new(ResponseHandler::default());
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(MAX_REDIRECTIONS)?;
    easy.timeout(timeout)?;
    Ok(easy)
}

/// One GET attempt. Returns the open body on HTTP 200; any other status is
/// released here and reported as [`AttemptError::Status`]. Once the 200
/// headers are in, a failed transfer is left for [`BodyStream::read`].
pub(crate) fn open(url: &str, timeout: Duration) -> Result<BodyStream, AttemptError> {
    let easy = easy_for(url, timeout)?;
    let multi = Multi::new();
    let handle = multi.add2(easy)?;
    let mut stream = BodyStream {
        handle,
        multi,
        state: TransferState::Running,
    };

    while stream.is_running() && !stream.has_final_headers() {
        stream.pump()?;
    }

    let status = stream.handle.get_ref().status.clone();
    if !stream.has_final_headers() {
        if let Some(e) = stream.take_failure() {
            return Err(AttemptError::Transport(e));
        }
    }

    match status {
        Some(StatusLine { code: 200, .. }) => Ok(stream),
        Some(StatusLine { code, reason }) => {
            tracing::debug!(url, code, "rejecting response");
            drop(stream);
            Err(AttemptError::status(code, reason.as_deref()))
        }
        None => Err(AttemptError::MissingStatus),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_http1_status_line() {
        let s = parse_status_line("HTTP/1.1 503 Service Unavailable\r\n").unwrap();
        assert_eq!(s.code, 503);
        assert_eq!(s.reason.as_deref(), Some("Service Unavailable"));
    }

    #[test]
    fn parses_http2_status_line_without_reason() {
        let s = parse_status_line("HTTP/2 404\r\n").unwrap();
        assert_eq!(s.code, 404);
        assert!(s.reason.is_none());
    }

    #[test]
    fn ignores_other_header_lines() {
        assert!(parse_status_line("Content-Length: 12\r\n").is_none());
        assert!(parse_status_line("\r\n").is_none());
        assert!(parse_status_line("HTTP/1.1 abc\r\n").is_none());
    }

    #[test]
    fn handler_status_replaced_on_redirect() {
        let mut h = ResponseHandler::default();
        h.header(b"HTTP/1.1 302 Found\r\n");
        h.header(b"Location: http://other/\r\n");
        assert_eq!(h.status.as_ref().map(|s| s.code), Some(302));
        h.header(b"HTTP/1.1 200 OK\r\n");
        assert_eq!(h.status.as_ref().map(|s| s.code), Some(200));
        assert!(!h.body_started);
    }

    #[test]
    fn handler_headers_done_after_final_block() {
        let mut h = ResponseHandler::default();
        h.header(b"HTTP/1.1 200 OK\r\n");
        h.header(b"Content-Length: 10\r\n");
        assert!(!h.headers_done);
        h.header(b"\r\n");
        assert!(h.headers_done);
        assert!(!h.body_started);
    }

    #[test]
    fn handler_followed_redirect_block_is_not_final() {
        let mut h = ResponseHandler::default();
        h.header(b"HTTP/1.1 302 Found\r\n");
        h.header(b"location: http://other/\r\n");
        h.header(b"\r\n");
        assert!(!h.headers_done);
        h.header(b"HTTP/1.1 404 Not Found\r\n");
        assert!(!h.headers_done);
        h.header(b"\r\n");
        assert!(h.headers_done);
        assert_eq!(h.status.as_ref().map(|s| s.code), Some(404));
    }

    #[test]
    fn handler_informational_and_bare_redirect_blocks() {
        let mut h = ResponseHandler::default();
        h.header(b"HTTP/1.1 100 Continue\r\n");
        h.header(b"\r\n");
        assert!(!h.headers_done);

        let mut h = ResponseHandler::default();
        h.header(b"HTTP/1.1 301 Moved Permanently\r\n");
        h.header(b"\r\n");
        assert!(h.headers_done);
    }

    #[test]
    fn handler_queues_body() {
        let mut h = ResponseHandler::default();
        assert_eq!(h.write(b"abcd").unwrap(), 4);
        assert_eq!(h.write(b"ef").unwrap(), 2);
        assert!(h.body_started);
        assert_eq!(h.body.iter().copied().collect::<Vec<u8>>(), b"abcdef");
    }

    #[test]
    fn open_invalid_url_is_transport_error() {
        let err = open("not a url at all://", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, AttemptError::Transport(_)));
    }
}
