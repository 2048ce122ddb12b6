//! Minimal HTTP/1.1 framing
//!
//! One request per connection: the request is read in full, answered, and
//! the connection is closed.

use crate::{Result, WebError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Longest accepted request line or header line
const MAX_LINE_BYTES: u64 = 8 * 1024;

/// Most header lines accepted in one request
const MAX_HEADERS: usize = 100;

/// HTTP status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const METHOD_NOT_ALLOWED: StatusCode = StatusCode(405);
    pub const REQUEST_TIMEOUT: StatusCode = StatusCode(408);
    pub const PAYLOAD_TOO_LARGE: StatusCode = StatusCode(413);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Standard reason phrase
    pub fn reason(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            408 => "Request Timeout",
            413 => "Payload Too Large",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, self.reason())
    }
}

/// Request method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

impl Method {
    fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "POST" => Method::Post,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Other(other) => other,
        }
    }
}

/// A fully read request
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Request {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Attach a url-encoded form body
    pub fn with_form(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.headers.push((
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        ));
        self.body = body.into();
        self
    }

    /// Request path without the query string
    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map_or(self.target.as_str(), |(path, _)| path)
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A response ready to be written
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// HTML page
    pub fn html(body: String) -> Self {
        Self::new(StatusCode::OK)
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body(body)
    }

    /// Plain-text error page, e.g. "404 PAGE NOT FOUND"
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::new(status)
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_body(format!("{} {}\n", status.as_u16(), message))
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Serialize the response; `Content-Length` always matches the body
    pub async fn write_to<W: AsyncWrite + Unpin>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut head = format!("HTTP/1.1 {}\r\n", self.status);
        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        head.push_str("Connection: close\r\n\r\n");

        writer.write_all(head.as_bytes()).await?;
        writer.write_all(&self.body).await?;
        writer.flush().await
    }
}

/// Read one line (without its terminator), bounded by `MAX_LINE_BYTES`
async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let read = (&mut *reader)
        .take(MAX_LINE_BYTES)
        .read_until(b'\n', &mut buf)
        .await?;
    if read == 0 {
        return Ok(None);
    }
    if buf.last() != Some(&b'\n') {
        return Err(WebError::MalformedRequest(
            "line too long or truncated".to_string(),
        ));
    }

    buf.pop();
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    String::from_utf8(buf)
        .map(Some)
        .map_err(|_| WebError::MalformedRequest("non UTF-8 header".to_string()))
}

/// Declared body length; every `Content-Length` header must agree
fn content_length(request: &Request) -> Result<usize> {
    let mut length = None;

    for (_, value) in request
        .headers
        .iter()
        .filter(|(key, _)| key.eq_ignore_ascii_case("Content-Length"))
    {
        // Digits only: `usize::from_str` would also take a leading `+`
        let parsed = value
            .bytes()
            .all(|b| b.is_ascii_digit())
            .then(|| value.parse::<usize>().ok())
            .flatten()
            .ok_or_else(|| WebError::MalformedRequest(format!("bad Content-Length: {value}")))?;

        match length {
            Some(previous) if previous != parsed => {
                return Err(WebError::MalformedRequest(
                    "conflicting Content-Length headers".to_string(),
                ));
            }
            _ => length = Some(parsed),
        }
    }

    Ok(length.unwrap_or(0))
}

/// Read a request; `Ok(None)` if the peer closed before sending anything
pub async fn read_request<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    max_body_bytes: usize,
) -> Result<Option<Request>> {
    let Some(request_line) = read_line(reader).await? else {
        return Ok(None);
    };

    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(WebError::MalformedRequest(format!(
            "bad request line: {request_line:?}"
        )));
    };
    if !version.starts_with("HTTP/1.") {
        return Err(WebError::MalformedRequest(format!(
            "unsupported version: {version}"
        )));
    }

    let mut request = Request::new(Method::parse(method), target);

    loop {
        let line = read_line(reader)
            .await?
            .ok_or_else(|| WebError::MalformedRequest("unexpected end of headers".to_string()))?;
        if line.is_empty() {
            break;
        }
        if request.headers.len() == MAX_HEADERS {
            return Err(WebError::MalformedRequest("too many headers".to_string()));
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| WebError::MalformedRequest(format!("bad header: {line:?}")))?;
        request
            .headers
            .push((name.trim().to_string(), value.trim().to_string()));
    }

    if request
        .header("Transfer-Encoding")
        .is_some_and(|encoding| !encoding.eq_ignore_ascii_case("identity"))
    {
        return Err(WebError::MalformedRequest(
            "chunked request bodies are not supported".to_string(),
        ));
    }

    let length = content_length(&request)?;
    if length > max_body_bytes {
        return Err(WebError::BodyTooLarge {
            size: length,
            limit: max_body_bytes,
        });
    }

    let mut body = vec![0; length];
    reader
        .read_exact(&mut body)
        .await
        .map_err(|_| WebError::MalformedRequest("truncated request body".to_string()))?;
    request.body = body;

    Ok(Some(request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn parse(raw: &str) -> Result<Option<Request>> {
        let mut reader = BufReader::new(raw.as_bytes());
        read_request(&mut reader, 1024).await
    }

    #[tokio::test]
    async fn test_read_get() {
        let request = parse("GET /static/style.css?v=2 HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path(), "/static/style.css");
        assert_eq!(request.header("host"), Some("localhost"));
        assert!(request.body.is_empty());
    }

    #[tokio::test]
    async fn test_read_post_body() {
        let raw = "POST / HTTP/1.1\r\nContent-Length: 13\r\n\r\ntextToPrint=A";
        let request = parse(raw).await.unwrap().unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body, b"textToPrint=A");
    }

    #[tokio::test]
    async fn test_bare_newlines_are_accepted() {
        let request = parse("GET / HTTP/1.0\nHost: x\n\n").await.unwrap().unwrap();
        assert_eq!(request.path(), "/");
    }

    #[tokio::test]
    async fn test_empty_connection() {
        assert!(parse("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_request_line() {
        assert!(matches!(
            parse("GARBAGE\r\n\r\n").await,
            Err(WebError::MalformedRequest(_))
        ));
        assert!(matches!(
            parse("GET / SPDY/3\r\n\r\n").await,
            Err(WebError::MalformedRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_body_limit() {
        let raw = "POST / HTTP/1.1\r\nContent-Length: 4096\r\n\r\n";
        assert!(matches!(
            parse(raw).await,
            Err(WebError::BodyTooLarge {
                size: 4096,
                limit: 1024
            })
        ));
    }

    #[tokio::test]
    async fn test_content_length_must_be_digits() {
        for value in ["+13", "-1", "", "1 3", "0x0d"] {
            let raw = format!("POST / HTTP/1.1\r\nContent-Length: {value}\r\n\r\ntextToPrint=A");
            assert!(
                matches!(parse(&raw).await, Err(WebError::MalformedRequest(_))),
                "Content-Length: {value:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_repeated_content_length() {
        let raw = "POST / HTTP/1.1\r\nContent-Length: 13\r\ncontent-length: 13\r\n\r\ntextToPrint=A";
        let request = parse(raw).await.unwrap().unwrap();
        assert_eq!(request.body, b"textToPrint=A");

        let raw = "POST / HTTP/1.1\r\nContent-Length: 13\r\nContent-Length: 2\r\n\r\ntextToPrint=A";
        assert!(matches!(parse(raw).await, Err(WebError::MalformedRequest(_))));
    }

    #[tokio::test]
    async fn test_chunked_rejected() {
        let raw = "POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n0\r\n\r\n";
        assert!(matches!(parse(raw).await, Err(WebError::MalformedRequest(_))));
    }

    #[tokio::test]
    async fn test_response_framing() {
        let response = Response::error(StatusCode::NOT_FOUND, "PAGE NOT FOUND");
        let mut out = Vec::new();
        response.write_to(&mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.contains("Content-Length: 19\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.ends_with("\r\n\r\n404 PAGE NOT FOUND\n"));
    }
}
