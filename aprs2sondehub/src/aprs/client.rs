//! APRS-IS stream client.
//!
//! One [`AprsIsClient`] owns one server. Each call to
//! [`AprsIsClient::connect`] is one TCP session: connect, send the login
//! line, then feed every non-comment line to the [`LineHandler`] until the
//! server closes the connection. Reconnecting is the caller's decision.
//!
//! Outbound frames go through an [`AprsIsSender`], a cloneable handle to
//! the write half of the current session. Sending while disconnected
//! fails softly.

use std::future::Future;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};

use super::error::StreamError;
use super::passcode::login_line;
use crate::{SOFTWARE_NAME, VERSION};

/// Filtered-feed port of APRS-IS servers.
pub const DEFAULT_APRS_IS_PORT: u16 = 14580;

/// Lines longer than this, terminator included, are dropped without being
/// dispatched. No more than this is ever buffered for one line.
const MAX_LINE_LENGTH: usize = 2048;

/// Connection settings for one APRS-IS server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AprsIsConfig {
    /// Server hostname.
    pub host: String,

    /// Server port.
    pub port: u16,
}

impl AprsIsConfig {
    /// Config for `host` on the default filtered port.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_APRS_IS_PORT,
        }
    }

    /// Overrides the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

/// Receiver of feed lines for a session.
///
/// Server comments (`#` lines) never reach the handler. The sender passed
/// alongside each line belongs to the session the line arrived on.
pub trait LineHandler: Send + Sync {
    /// Handle one trimmed line from the feed.
    fn handle_line(&self, line: String, sender: &AprsIsSender) -> impl Future<Output = ()> + Send;
}

/// Counters for a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Non-empty lines read from the server.
    pub lines_received: u64,

    /// Server comment and keepalive lines dropped.
    pub comments: u64,

    /// Lines handed to the handler.
    pub lines_dispatched: u64,

    /// Lines over the length limit, skipped unread.
    pub oversized: u64,
}

/// Handle for writing frames to the current session of one server.
#[derive(Clone)]
pub struct AprsIsSender {
    host: Arc<str>,
    writer: Arc<Mutex<Option<OwnedWriteHalf>>>,
}

impl AprsIsSender {
    fn new(host: &str) -> Self {
        Self {
            host: Arc::from(host),
            writer: Arc::new(Mutex::new(None)),
        }
    }

    /// Host this sender writes to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Writes one frame followed by CRLF.
    ///
    /// Returns `false` when there is no open session or the write fails.
    /// A failed write closes the write half so later sends fail fast.
    pub async fn send(&self, frame: &str) -> bool {
        let mut guard = self.writer.lock().await;

        let Some(writer) = guard.as_mut() else {
            warn!(host = %self.host, frame, "Cannot send frame, not connected");
            return false;
        };

        let mut line = String::with_capacity(frame.len() + 2);
        line.push_str(frame);
        line.push_str("\r\n");

        match writer.write_all(line.as_bytes()).await {
            Ok(()) => {
                debug!(host = %self.host, frame, "Frame sent");
                true
            }
            Err(e) => {
                warn!(host = %self.host, frame, error = %e, "Failed to send frame");
                *guard = None;
                false
            }
        }
    }

    async fn attach(&self, writer: OwnedWriteHalf) {
        *self.writer.lock().await = Some(writer);
    }

    async fn detach(&self) {
        self.writer.lock().await.take();
    }
}

/// Client for one APRS-IS server.
pub struct AprsIsClient {
    config: AprsIsConfig,
    sender: AprsIsSender,
}

impl AprsIsClient {
    /// Create a client; no connection is made until [`connect`](Self::connect).
    pub fn new(config: AprsIsConfig) -> Self {
        let sender = AprsIsSender::new(&config.host);
        Self { config, sender }
    }

    /// Server hostname.
    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Handle for outbound frames; stays valid across reconnects.
    pub fn sender(&self) -> AprsIsSender {
        self.sender.clone()
    }

    /// Releases the write half of an abandoned session.
    ///
    /// Needed only when a [`connect`](Self::connect) future is dropped
    /// before it returns; a finished session detaches itself.
    pub async fn disconnect(&self) {
        self.sender.detach().await;
    }

    /// Runs one session until the server closes the connection.
    ///
    /// Logs in as `login` with a budlist filter of `filter` callsigns.
    pub async fn connect<H: LineHandler>(
        &self,
        login: &str,
        filter: &[String],
        handler: &H,
    ) -> Result<SessionSummary, StreamError> {
        let host = self.config.host.clone();
        let port = self.config.port;

        let stream = TcpStream::connect((host.as_str(), port))
            .await
            .map_err(|source| StreamError::Connect {
                host: host.clone(),
                port,
                source,
            })?;

        info!(host = %host, port, "Connected to APRS-IS server");

        let (read_half, mut write_half) = stream.into_split();

        let login = login_line(login, SOFTWARE_NAME, VERSION, filter);
        write_half
            .write_all(login.as_bytes())
            .await
            .map_err(|source| StreamError::Login {
                host: host.clone(),
                source,
            })?;
        debug!(host = %host, filter_len = filter.len(), "Login sent");

        self.sender.attach(write_half).await;
        let result = self.read_loop(read_half, handler).await;
        self.sender.detach().await;

        match &result {
            Ok(summary) => info!(
                host = %host,
                lines_received = summary.lines_received,
                comments = summary.comments,
                lines_dispatched = summary.lines_dispatched,
                oversized = summary.oversized,
                "APRS-IS session closed"
            ),
            Err(e) => warn!(host = %host, error = %e, "APRS-IS session failed"),
        }

        result
    }

    async fn read_loop<H: LineHandler>(
        &self,
        read_half: OwnedReadHalf,
        handler: &H,
    ) -> Result<SessionSummary, StreamError> {
        let mut reader = BufReader::new(read_half);
        let mut buffer = Vec::with_capacity(512);
        let mut summary = SessionSummary::default();

        loop {
            buffer.clear();
            let read = read_bounded_line(&mut reader, &mut buffer, MAX_LINE_LENGTH + 1)
                .await
                .map_err(|source| self.read_error(source))?;

            if read == 0 {
                return Ok(summary);
            }

            if buffer.len() > MAX_LINE_LENGTH {
                let mut skipped = buffer.len();
                if buffer.last() != Some(&b'\n') {
                    skipped += skip_line(&mut reader, &mut buffer)
                        .await
                        .map_err(|source| self.read_error(source))?;
                }
                summary.oversized += 1;
                debug!(host = %self.config.host, len = skipped, "Dropping oversized line");
                continue;
            }

            let text = String::from_utf8_lossy(&buffer);
            let line = text.trim();
            if line.is_empty() {
                continue;
            }
            summary.lines_received += 1;

            if line.starts_with('#') {
                summary.comments += 1;
                self.log_server_comment(line);
                continue;
            }

            summary.lines_dispatched += 1;
            handler.handle_line(line.to_string(), &self.sender).await;
        }
    }

    fn read_error(&self, source: std::io::Error) -> StreamError {
        StreamError::Read {
            host: self.config.host.clone(),
            source,
        }
    }

    fn log_server_comment(&self, line: &str) {
        let host = &self.config.host;
        match login_verified(line) {
            Some(true) => info!(host = %host, response = line, "Login accepted"),
            Some(false) => {
                warn!(host = %host, response = line, "Login not verified, check passcode")
            }
            None => trace!(host = %host, comment = line, "Server comment"),
        }
    }
}

/// Reads up to and including the next `\n`, but never more than `limit`
/// bytes. Returns the number of bytes read; zero means end of stream.
async fn read_bounded_line<R>(
    reader: &mut R,
    buffer: &mut Vec<u8>,
    limit: usize,
) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    (&mut *reader).take(limit as u64).read_until(b'\n', buffer).await
}

/// Discards the rest of the current line, one bounded chunk at a time.
///
/// Returns the number of bytes skipped. `scratch` is clobbered.
async fn skip_line<R>(reader: &mut R, scratch: &mut Vec<u8>) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut skipped = 0;
    loop {
        scratch.clear();
        let read = read_bounded_line(reader, scratch, MAX_LINE_LENGTH).await?;
        skipped += read;
        if read == 0 || scratch.last() == Some(&b'\n') {
            return Ok(skipped);
        }
    }
}

/// Classifies a server comment as a login response.
///
/// `Some(true)` for a verified login, `Some(false)` for an unverified one
/// and `None` for any other comment.
fn login_verified(comment: &str) -> Option<bool> {
    if !comment.contains("logresp") {
        return None;
    }
    Some(!comment.contains(" unverified"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use tokio::net::TcpListener;

    const LINE: &str = "SQ2IPS-11>APLIGA,NOHUB,qAR,SR9NDJ-10:/123456h5030.00N/01915.00EO180/012/A=032810";

    /// Keeps every line it is handed.
    #[derive(Default)]
    struct RecordingHandler {
        lines: StdMutex<Vec<String>>,
    }

    impl LineHandler for RecordingHandler {
        async fn handle_line(&self, line: String, _sender: &AprsIsSender) {
            self.lines.lock().unwrap().push(line);
        }
    }

    /// Serves one session on loopback: reads the login, writes `chunks` in
    /// order, then closes. Returns what the client dispatched.
    async fn serve_once(chunks: Vec<Vec<u8>>) -> (SessionSummary, Vec<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut stream = BufReader::new(stream);
            let mut login = String::new();
            stream.read_line(&mut login).await.unwrap();
            for chunk in chunks {
                stream.get_mut().write_all(&chunk).await.unwrap();
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            login
        });

        let client = AprsIsClient::new(AprsIsConfig::new("127.0.0.1").with_port(port));
        let handler = RecordingHandler::default();
        let filter = vec!["SQ2IPS-11".to_string()];
        let summary = tokio::time::timeout(
            Duration::from_secs(5),
            client.connect("N0CALL", &filter, &handler),
        )
        .await
        .expect("session did not end")
        .unwrap();

        let login = server.await.unwrap();
        assert!(login.starts_with("user N0CALL pass 13023 "));

        let lines = handler.lines.into_inner().unwrap();
        (summary, lines)
    }

    #[test]
    fn test_login_response_classification() {
        assert_eq!(
            login_verified("# logresp N0CALL verified, server T2POLAND"),
            Some(true)
        );
        assert_eq!(
            login_verified("# logresp N0CALL unverified, server T2POLAND"),
            Some(false)
        );
        assert_eq!(login_verified("# aprsc 2.1.14-g5e22b37"), None);
        assert_eq!(login_verified("# 11 Jul 2024 10:00:00 GMT T2POLAND"), None);
    }

    #[tokio::test]
    async fn test_comments_never_reach_handler() {
        let feed = format!(
            "# aprsc 2.1.14-g5e22b37\r\n\
             # logresp N0CALL unverified, server T2POLAND\r\n\
             {}\r\n\
             \r\n\
             # 11 Jul 2024 10:00:00 GMT T2POLAND\r\n",
            LINE
        );

        let (summary, lines) = serve_once(vec![feed.into_bytes()]).await;

        assert_eq!(lines, vec![LINE.to_string()]);
        assert_eq!(
            summary,
            SessionSummary {
                lines_received: 4,
                comments: 3,
                lines_dispatched: 1,
                oversized: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_oversized_line_skipped_without_buffering() {
        // Several writes with no terminator, then the line finally ends and a
        // normal packet follows.
        let mut chunks = vec![b"A".repeat(3000); 4];
        chunks.push(format!("AAAA\r\n{}\r\n", LINE).into_bytes());

        let (summary, lines) = serve_once(chunks).await;

        assert_eq!(lines, vec![LINE.to_string()]);
        assert_eq!(summary.oversized, 1);
        assert_eq!(summary.lines_received, 1);
        assert_eq!(summary.lines_dispatched, 1);
    }

    #[tokio::test]
    async fn test_line_at_length_limit_is_kept() {
        let longest = format!("{}{}", LINE, "x".repeat(MAX_LINE_LENGTH - LINE.len() - 1));
        let too_long = format!("{}x", longest);
        let feed = format!("{}\n{}\n{}\r\n", longest, too_long, LINE);

        let (summary, lines) = serve_once(vec![feed.into_bytes()]).await;

        assert_eq!(lines, vec![longest, LINE.to_string()]);
        assert_eq!(summary.oversized, 1);
    }

    #[tokio::test]
    async fn test_unterminated_last_line_dispatched() {
        let (summary, lines) = serve_once(vec![LINE.as_bytes().to_vec()]).await;

        assert_eq!(lines, vec![LINE.to_string()]);
        assert_eq!(summary.lines_dispatched, 1);
    }

    #[test]
    fn test_default_port() {
        let config = AprsIsConfig::new("euro.aprs2.net");
        assert_eq!(config.port, 14580);
        assert_eq!(config.host, "euro.aprs2.net");
        assert_eq!(config.with_port(10152).port, 10152);
    }

    #[tokio::test]
    async fn test_send_without_session_fails_softly() {
        let client = AprsIsClient::new(AprsIsConfig::new("localhost"));
        let sender = client.sender();
        assert!(!sender.send("N0CALL>APZHUB:>test").await);
        assert_eq!(sender.host(), "localhost");
    }
}
