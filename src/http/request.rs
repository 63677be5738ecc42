use std::{collections::HashMap, time::Duration};

use tokio::io::{self, AsyncRead, AsyncReadExt};
use tracing::debug;

const HEADER_END: &[u8] = b"\r\n\r\n";
const MAX_HEADER_BYTES: usize = 64 * 1024;
const BODY_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default)]
pub struct Request {
    pub method: String,
    /// Path without the query string; matching ignores the query.
    pub path: String,
    pub headers: HashMap<String, String>,
}

impl Request {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
}

fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(HEADER_END.len()).position(|w| w == HEADER_END)
}

/// Parses the request line and headers. The body is not interpreted.
pub fn parse_http_request(head: &[u8]) -> Request {
    let text = String::from_utf8_lossy(head);
    let mut lines = text.lines();

    let mut parts = lines.next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let target = parts.next().unwrap_or("/");

    let path = match target.split_once('?') {
        Some((path, _query)) => path.to_string(),
        None => target.to_string(),
    };

    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    Request {
        method,
        path,
        headers,
    }
}

/// Discards up to `len` body bytes without buffering them. Stops early at
/// EOF; a client that stalls mid-body gets a `TimedOut` error.
async fn drain_body<S>(stream: &mut S, len: u64) -> io::Result<u64>
where
    S: AsyncRead + Unpin,
{
    let mut body = (&mut *stream).take(len);
    tokio::time::timeout(BODY_DRAIN_TIMEOUT, io::copy(&mut body, &mut io::sink()))
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "request body not received in time"))?
}

/// Reads one request off the stream, draining any declared body so the
/// client is not reset when the connection closes.
pub async fn read_http_request<S>(stream: &mut S) -> io::Result<Option<Request>>
where
    S: AsyncRead + Unpin,
{
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];

    let header_end = loop {
        if let Some(end) = find_header_end(&data) {
            break end;
        }
        if data.len() > MAX_HEADER_BYTES {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "request head too large"));
        }
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            if data.is_empty() {
                return Ok(None);
            }
            break data.len();
        }
        data.extend_from_slice(&buf[..n]);
    };

    let request = parse_http_request(&data[..header_end]);

    let body_start = (header_end + HEADER_END.len()).min(data.len());
    let already_read = data.len() - body_start;
    let remaining = request.content_length().saturating_sub(already_read);
    if remaining > 0 {
        drain_body(stream, remaining as u64).await?;
    }

    debug!(method = %request.method, path = %request.path, "request parsed");
    Ok(Some(request))
}
