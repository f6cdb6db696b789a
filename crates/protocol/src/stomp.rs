//! STOMP 1.2 text frame codec
//!
//! Frames travel as WebSocket text messages. A frame is a command line,
//! header lines, a blank line, the body and a terminating NUL octet. A bare
//! end-of-line between frames is a heart-beat.
//!
//! Header values are escaped (`\\`, `\n`, `\r`, `\c`) in every frame except
//! CONNECT and CONNECTED.

use std::fmt;

/// Errors produced while decoding a STOMP frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("unknown STOMP command: {0}")]
    UnknownCommand(String),
    #[error("malformed header line: {0}")]
    MalformedHeader(String),
    #[error("invalid escape sequence in header: {0}")]
    InvalidEscape(String),
    #[error("invalid content-length header: {0}")]
    InvalidContentLength(String),
    #[error("frame body shorter than content-length ({expected} > {actual})")]
    Truncated { expected: usize, actual: usize },
    #[error("frame body is not valid UTF-8")]
    InvalidUtf8,
    #[error("frame ended before the header block was terminated")]
    UnterminatedHeaders,
}

/// STOMP frame commands (client and server).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Connect,
    Stomp,
    Connected,
    Send,
    Subscribe,
    Unsubscribe,
    Ack,
    Nack,
    Begin,
    Commit,
    Abort,
    Disconnect,
    Message,
    Receipt,
    Error,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Connect => "CONNECT",
            Command::Stomp => "STOMP",
            Command::Connected => "CONNECTED",
            Command::Send => "SEND",
            Command::Subscribe => "SUBSCRIBE",
            Command::Unsubscribe => "UNSUBSCRIBE",
            Command::Ack => "ACK",
            Command::Nack => "NACK",
            Command::Begin => "BEGIN",
            Command::Commit => "COMMIT",
            Command::Abort => "ABORT",
            Command::Disconnect => "DISCONNECT",
            Command::Message => "MESSAGE",
            Command::Receipt => "RECEIPT",
            Command::Error => "ERROR",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let cmd = match s {
            "CONNECT" => Command::Connect,
            "STOMP" => Command::Stomp,
            "CONNECTED" => Command::Connected,
            "SEND" => Command::Send,
            "SUBSCRIBE" => Command::Subscribe,
            "UNSUBSCRIBE" => Command::Unsubscribe,
            "ACK" => Command::Ack,
            "NACK" => Command::Nack,
            "BEGIN" => Command::Begin,
            "COMMIT" => Command::Commit,
            "ABORT" => Command::Abort,
            "DISCONNECT" => Command::Disconnect,
            "MESSAGE" => Command::Message,
            "RECEIPT" => Command::Receipt,
            "ERROR" => Command::Error,
            _ => return None,
        };
        Some(cmd)
    }

    /// CONNECT and CONNECTED frames carry raw header values.
    fn escapes_headers(self) -> bool {
        !matches!(self, Command::Connect | Command::Connected)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single STOMP frame.
///
/// Headers keep their wire order. When a header is repeated, the first
/// occurrence is the one that counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Append a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Look up a header value (first occurrence).
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    // =========================================================================
    // Client frame constructors
    // =========================================================================

    /// CONNECT frame. Heart-beating is disabled; the transport's own
    /// keep-alive is relied upon.
    pub fn connect(host: &str) -> Self {
        Frame::new(Command::Connect)
            .header("accept-version", "1.2,1.1")
            .header("host", host)
            .header("heart-beat", "0,0")
    }

    /// SUBSCRIBE frame with extra headers (e.g. `username`).
    pub fn subscribe(id: &str, destination: &str, extra: &[(String, String)]) -> Self {
        let mut frame = Frame::new(Command::Subscribe)
            .header("id", id)
            .header("destination", destination);
        frame.headers.extend(extra.iter().cloned());
        frame
    }

    /// SEND frame with a JSON body.
    pub fn send(destination: &str, body: impl Into<String>) -> Self {
        Frame::new(Command::Send)
            .header("destination", destination)
            .header("content-type", "application/json")
            .with_body(body)
    }

    pub fn disconnect() -> Self {
        Frame::new(Command::Disconnect)
    }

    // =========================================================================
    // Codec
    // =========================================================================

    /// Encode to wire text, including the trailing NUL.
    ///
    /// A `content-length` header is added for non-empty bodies unless one
    /// is already present.
    pub fn encode(&self) -> String {
        let escape = self.command.escapes_headers();
        let mut out = String::with_capacity(64 + self.body.len());
        out.push_str(self.command.as_str());
        out.push('\n');

        for (name, value) in &self.headers {
            if escape {
                out.push_str(&escape_header(name));
                out.push(':');
                out.push_str(&escape_header(value));
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }
        if !self.body.is_empty() && self.get_header("content-length").is_none() {
            out.push_str("content-length:");
            out.push_str(&self.body.len().to_string());
            out.push('\n');
        }

        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Decode one frame from wire text.
    ///
    /// Returns `Ok(None)` for a heart-beat (text made only of end-of-lines).
    pub fn decode(raw: &str) -> Result<Option<Frame>, FrameError> {
        let text = raw.trim_start_matches(['\r', '\n']);
        if text.is_empty() || text == "\0" {
            return Ok(None);
        }

        let (command_line, mut rest) = split_line(text).ok_or(FrameError::UnterminatedHeaders)?;
        let command = Command::parse(command_line)
            .ok_or_else(|| FrameError::UnknownCommand(command_line.to_string()))?;
        let escape = command.escapes_headers();

        let mut headers = Vec::new();
        loop {
            let (line, remaining) = split_line(rest).ok_or(FrameError::UnterminatedHeaders)?;
            rest = remaining;
            if line.is_empty() {
                break;
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| FrameError::MalformedHeader(line.to_string()))?;
            if escape {
                headers.push((unescape_header(name)?, unescape_header(value)?));
            } else {
                headers.push((name.to_string(), value.to_string()));
            }
        }

        let mut frame = Frame {
            command,
            headers,
            body: String::new(),
        };

        frame.body = match frame.get_header("content-length") {
            Some(len) => {
                let expected: usize = len
                    .trim()
                    .parse()
                    .map_err(|_| FrameError::InvalidContentLength(len.to_string()))?;
                let bytes = rest.as_bytes();
                if bytes.len() < expected {
                    return Err(FrameError::Truncated {
                        expected,
                        actual: bytes.len(),
                    });
                }
                std::str::from_utf8(&bytes[..expected])
                    .map_err(|_| FrameError::InvalidUtf8)?
                    .to_string()
            }
            None => match rest.find('\0') {
                Some(end) => rest[..end].to_string(),
                None => rest.to_string(),
            },
        };

        Ok(Some(frame))
    }
}

/// Split off one line, accepting LF or CRLF endings.
fn split_line(text: &str) -> Option<(&str, &str)> {
    let idx = text.find('\n')?;
    let line = text[..idx].strip_suffix('\r').unwrap_or(&text[..idx]);
    Some((line, &text[idx + 1..]))
}

fn escape_header(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_header(value: &str) -> Result<String, FrameError> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            _ => return Err(FrameError::InvalidEscape(value.to_string())),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_send_frame() {
        let frame = Frame::send("/app/game/move", r#"{"x":3}"#);
        assert_eq!(
            frame.encode(),
            "SEND\ndestination:/app/game/move\ncontent-type:application/json\ncontent-length:7\n\n{\"x\":3}\0"
        );
    }

    #[test]
    fn test_encode_empty_body_has_no_content_length() {
        let encoded = Frame::disconnect().encode();
        assert_eq!(encoded, "DISCONNECT\n\n\0");
    }

    #[test]
    fn test_connect_headers_are_not_escaped() {
        let encoded = Frame::connect("localhost:8081").encode();
        assert!(encoded.contains("host:localhost:8081\n"));
        assert!(encoded.starts_with("CONNECT\naccept-version:1.2,1.1\n"));
    }

    #[test]
    fn test_subscribe_escapes_header_values() {
        let extra = vec![("username".to_string(), "a:b".to_string())];
        let encoded = Frame::subscribe("sub-0", "/topic/lobby", &extra).encode();
        assert!(encoded.contains("username:a\\cb\n"));
    }

    #[test]
    fn test_decode_message_frame() {
        let raw = "MESSAGE\ndestination:/topic/lobby\nsubscription:sub-0\nmessage-id:1\n\n[]\0";
        let frame = Frame::decode(raw).unwrap().unwrap();
        assert_eq!(frame.command, Command::Message);
        assert_eq!(frame.get_header("subscription"), Some("sub-0"));
        assert_eq!(frame.body, "[]");
    }

    #[test]
    fn test_decode_heartbeat() {
        assert_eq!(Frame::decode("\n").unwrap(), None);
        assert_eq!(Frame::decode("\r\n\r\n").unwrap(), None);
    }

    #[test]
    fn test_decode_crlf_and_leading_heartbeat() {
        let raw = "\nCONNECTED\r\nversion:1.2\r\n\r\n\0";
        let frame = Frame::decode(raw).unwrap().unwrap();
        assert_eq!(frame.command, Command::Connected);
        assert_eq!(frame.get_header("version"), Some("1.2"));
    }

    #[test]
    fn test_decode_uses_content_length_for_body() {
        let raw = "MESSAGE\ncontent-length:4\n\na\0bc\0";
        let frame = Frame::decode(raw).unwrap().unwrap();
        assert_eq!(frame.body, "a\0bc");
    }

    #[test]
    fn test_decode_truncated_body() {
        let raw = "MESSAGE\ncontent-length:10\n\nabc\0";
        assert_eq!(
            Frame::decode(raw),
            Err(FrameError::Truncated {
                expected: 10,
                actual: 4
            })
        );
    }

    #[test]
    fn test_decode_unescapes_headers() {
        let raw = "MESSAGE\nmessage:line\\nbreak\\c\\\\\n\n\0";
        let frame = Frame::decode(raw).unwrap().unwrap();
        assert_eq!(frame.get_header("message"), Some("line\nbreak:\\"));
    }

    #[test]
    fn test_decode_rejects_bad_escape() {
        let raw = "MESSAGE\nmessage:bad\\t\n\n\0";
        assert!(matches!(
            Frame::decode(raw),
            Err(FrameError::InvalidEscape(_))
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_command() {
        assert_eq!(
            Frame::decode("HELLO\n\n\0"),
            Err(FrameError::UnknownCommand("HELLO".to_string()))
        );
    }

    #[test]
    fn test_decode_rejects_header_without_colon() {
        assert!(matches!(
            Frame::decode("MESSAGE\nnocolon\n\n\0"),
            Err(FrameError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_first_repeated_header_wins() {
        let raw = "MESSAGE\nfoo:first\nfoo:second\n\n\0";
        let frame = Frame::decode(raw).unwrap().unwrap();
        assert_eq!(frame.get_header("foo"), Some("first"));
    }

    #[test]
    fn test_decode_error_frame_body_without_nul() {
        let frame = Frame::decode("ERROR\nmessage:oops\n\nbroker said no")
            .unwrap()
            .unwrap();
        assert_eq!(frame.command, Command::Error);
        assert_eq!(frame.body, "broker said no");
    }
}
