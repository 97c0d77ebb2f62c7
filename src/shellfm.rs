/*
 *  shellfm.rs
 *
 *  shellfm-lcd - shell-fm on the front panel
 *	(c) 2020-25 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use std::future::Future;
use std::time::Duration;
use log::debug;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::status::Sample;

/// Field separator requested in the info format string
const FIELD_SEP: &str = "||";
/// artist, album, title, remaining seconds
const INFO_QUERY: &str = "info %a||%l||%t||%R";
const VOLUME_QUERY: &str = "info %v";
/// Replies are a single short line; anything bigger is not shell-fm
const MAX_REPLY: u64 = 4096;

/// Errors talking to the shell-fm socket
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// What the core needs from the audio daemon
pub trait DaemonClient: Send + Sync + 'static {
    /// Current track details; `None` when the daemon is unreachable or idle
    fn query(&self) -> impl Future<Output = Option<Sample>> + Send;

    /// Fire a single command line at the daemon
    fn send_command(&self, command: &str) -> impl Future<Output = Result<(), DaemonError>> + Send;

    /// Current output volume, if the daemon reports one
    fn volume(&self) -> impl Future<Output = Option<u8>> + Send;
}

/// Parse the reply to `INFO_QUERY`
pub fn parse_info(reply: &str) -> Result<Sample, DaemonError> {
    let line = reply.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Err(DaemonError::Protocol("empty reply".to_string()));
    }
    let fields: Vec<&str> = line.split(FIELD_SEP).collect();
    if fields.len() != 4 {
        return Err(DaemonError::Protocol(format!("expected 4 fields, got {}", fields.len())));
    }
    let remaining_seconds = fields[3]
        .trim()
        .parse::<i64>()
        .map_err(|_| DaemonError::Protocol(format!("remaining time '{}' is not a number", fields[3])))?;

    Ok(Sample {
        artist: fields[0].to_string(),
        album: fields[1].to_string(),
        title: fields[2].to_string(),
        remaining_seconds,
    })
}

/// Client for the shell-fm network interface: one connection per request
#[derive(Debug, Clone)]
pub struct ShellFmClient {
    host: String,
    port: u16,
    timeout: Duration,
}

impl ShellFmClient {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Open, write one line, read until the daemon closes, close.
    pub async fn request(&self, line: &str) -> Result<String, DaemonError> {
        timeout(self.timeout, self.exchange(line))
            .await
            .map_err(|_| DaemonError::Timeout(self.timeout))?
    }

    async fn exchange(&self, line: &str) -> Result<String, DaemonError> {
        let mut stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        stream.write_all(line.as_bytes()).await?;
        stream.write_all(b"\n").await?;
        stream.flush().await?;

        let mut buf = Vec::with_capacity(256);
        (&mut stream).take(MAX_REPLY).read_to_end(&mut buf).await?;
        String::from_utf8(buf).map_err(|e| DaemonError::Protocol(format!("reply is not UTF-8: {}", e)))
    }
}

impl DaemonClient for ShellFmClient {
    async fn query(&self) -> Option<Sample> {
        match self.request(INFO_QUERY).await.and_then(|reply| parse_info(&reply)) {
            Ok(sample) => Some(sample),
            Err(e) => {
                debug!("shell-fm at {} gave no data: {}", self.address(), e);
                None
            }
        }
    }

    async fn send_command(&self, command: &str) -> Result<(), DaemonError> {
        debug!("shell-fm <- {}", command);
        self.request(command).await.map(|_| ())
    }

    async fn volume(&self) -> Option<u8> {
        let reply = self.request(VOLUME_QUERY).await.ok()?;
        reply.trim().parse::<u8>().ok()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncBufReadExt;
    use tokio::net::TcpListener;

    #[test]
    fn test_parse_info() {
        let s = parse_info("Boards of Canada||Geogaddi||Alpha and Omega||187\n").unwrap();
        assert_eq!(s.artist, "Boards of Canada");
        assert_eq!(s.album, "Geogaddi");
        assert_eq!(s.title, "Alpha and Omega");
        assert_eq!(s.remaining_seconds, 187);
    }

    #[test]
    fn test_parse_info_rejects_garbage() {
        assert!(matches!(parse_info(""), Err(DaemonError::Protocol(_))));
        assert!(matches!(parse_info("\n"), Err(DaemonError::Protocol(_))));
        assert!(matches!(parse_info("a||b||c"), Err(DaemonError::Protocol(_))));
        assert!(matches!(parse_info("a||b||c||soon"), Err(DaemonError::Protocol(_))));
    }

    #[test]
    fn test_parse_info_keeps_empty_fields() {
        let s = parse_info("||||Stream||-3").unwrap();
        assert_eq!(s.artist, "");
        assert_eq!(s.title, "Stream");
        assert_eq!(s.remaining_seconds, -3);
    }

    /// One-shot fake shell-fm: records the request line and answers with `reply`
    async fn serve_once(reply: &'static str) -> (u16, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read, mut write) = stream.into_split();
            let mut line = String::new();
            tokio::io::BufReader::new(read).read_line(&mut line).await.unwrap();
            write.write_all(reply.as_bytes()).await.unwrap();
            write.shutdown().await.unwrap();
            line
        });
        (port, handle)
    }

    #[tokio::test]
    async fn test_query_round_trip() {
        let (port, server) = serve_once("Autechre||Amber||Montreal||301\n").await;
        let client = ShellFmClient::new("127.0.0.1", port, Duration::from_secs(2));

        let sample = client.query().await.expect("sample");
        assert_eq!(sample.title, "Montreal");
        assert_eq!(sample.remaining_seconds, 301);
        assert_eq!(server.await.unwrap(), format!("{}\n", INFO_QUERY));
    }

    #[tokio::test]
    async fn test_volume_query() {
        let (port, _server) = serve_once("64\n").await;
        let client = ShellFmClient::new("127.0.0.1", port, Duration::from_secs(2));
        assert_eq!(client.volume().await, Some(64));
    }

    #[tokio::test]
    async fn test_empty_reply_is_no_data() {
        let (port, _server) = serve_once("").await;
        let client = ShellFmClient::new("127.0.0.1", port, Duration::from_secs(2));
        assert_eq!(client.query().await, None);
    }

    #[tokio::test]
    async fn test_refused_connection_is_no_data() {
        // bind then drop to find a port nobody listens on
        let port = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap().port()
        };
        let client = ShellFmClient::new("127.0.0.1", port, Duration::from_millis(500));
        assert_eq!(client.query().await, None);
        assert!(client.send_command("pause").await.is_err());
    }

    #[tokio::test]
    async fn test_silent_daemon_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _server = tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });
        let client = ShellFmClient::new("127.0.0.1", port, Duration::from_millis(100));
        assert!(matches!(client.request("info").await, Err(DaemonError::Timeout(_))));
    }
}
