//! Recursive-descent parser from a raw header block to an [`HttpRequest`].
//!
//! Grammar, over `\r\n`-separated lines:
//!
//! ```text
//! request     = *empty-line status-line *header-line [ empty-line body ]
//! status-line = method SP request-target SP protocol
//! header-line = name ": " value
//! ```

use std::iter::Peekable;
use std::str::Split;

use crate::protocol::{CRLF, HttpHeader, HttpRequest, KEY_VALUE_DELIMITER, Method, ParseError, Version};

type Lines<'a> = Peekable<Split<'a, &'static str>>;

#[derive(Debug)]
pub struct RequestParser;

impl RequestParser {
    pub fn parse(raw: &str) -> Result<HttpRequest, ParseError> {
        let mut lines = raw.split(CRLF).peekable();

        let status_line = loop {
            match lines.next() {
                Some("") => {}
                Some(line) => break line,
                None => return Err(ParseError::EmptyStatusLine),
            }
        };

        let (method, uri, version) = parse_status_line(status_line, &mut lines)?;
        let header = parse_header(&mut lines)?;
        let body = parse_body(lines);

        Ok(HttpRequest::new(method, uri, version, header, body))
    }
}

fn parse_status_line<'a>(status_line: &'a str, lines: &mut Lines<'_>) -> Result<(Method, &'a str, Version), ParseError> {
    let mut tokens = status_line.split_whitespace();

    let Some(method_token) = tokens.next() else {
        // a whitespace-only block has no status line at all
        if lines.any(|line| !line.trim().is_empty()) {
            return Err(ParseError::MethodExpected);
        }
        return Err(ParseError::EmptyStatusLine);
    };
    let method = Method::from_token(method_token).ok_or_else(|| ParseError::unsupported_method(method_token))?;

    let uri = tokens.next().ok_or(ParseError::UriExpected)?;

    let protocol_token = tokens.next().ok_or(ParseError::ProtocolExpected)?;
    let version = Version::from_token(protocol_token).ok_or_else(|| ParseError::unsupported_protocol(protocol_token))?;

    if let Some(extra) = tokens.next() {
        return Err(ParseError::unexpected_status_line_token(extra));
    }

    Ok((method, uri, version))
}

fn parse_header(lines: &mut Lines<'_>) -> Result<HttpHeader, ParseError> {
    let mut header = HttpHeader::new();

    while let Some(line) = lines.next_if(|line| !line.is_empty()) {
        let (name, value) = line.split_once(KEY_VALUE_DELIMITER).ok_or_else(|| ParseError::invalid_header_field(line))?;
        header.append(name, value);
    }

    Ok(header)
}

fn parse_body(lines: Lines<'_>) -> Option<String> {
    let mut rest: Vec<&str> = lines.skip_while(|line| line.is_empty()).collect();
    while rest.last().is_some_and(|line| line.is_empty()) {
        rest.pop();
    }

    if rest.is_empty() {
        return None;
    }

    Some(rest.iter().flat_map(|line| [*line, CRLF]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::HeaderField;
    use indoc::indoc;

    fn crlf(text: &str) -> String {
        text.replace('\n', CRLF)
    }

    #[test]
    fn parse_full_request() {
        let raw = crlf(indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        If-None-Match: "abc"
        Connection: close
        "##});

        let request = RequestParser::parse(&raw).unwrap();

        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.uri(), "/index.html");
        assert_eq!(request.version(), Version::Http11);
        assert_eq!(request.header().len(), 3);
        assert_eq!(request.header().get("Host"), Some("127.0.0.1:8080"));
        assert_eq!(request.header().value_of(HeaderField::IfNoneMatch), Some("\"abc\""));
        assert!(request.header().is_connection_close());
        assert_eq!(request.body(), None);
    }

    #[test]
    fn folds_repeated_header() {
        let raw = "HEAD / HTTP/1.0\r\nAccept: first\r\nAccept: second\r\n";
        let request = RequestParser::parse(raw).unwrap();

        assert_eq!(request.header().get("Accept"), Some("first,second"));
        assert_eq!(request.header().len(), 1);
    }

    #[test]
    fn header_value_keeps_its_spacing() {
        let request = RequestParser::parse("GET / HTTP/1.1\r\nX-Padded: value \r\nX-Colon: a: b\r\n").unwrap();

        assert_eq!(request.header().get("X-Padded"), Some("value "));
        assert_eq!(request.header().get("X-Colon"), Some("a: b"));
    }

    #[test]
    fn lines_after_header_section_are_body() {
        let request = RequestParser::parse("GET / HTTP/1.1\r\nHost: a\r\n\r\nline one\r\nline two\r\n").unwrap();

        assert_eq!(request.header().len(), 1);
        assert_eq!(request.body(), Some("line one\r\nline two\r\n"));
    }

    #[test]
    fn empty_body_is_absent() {
        let request = RequestParser::parse("GET / HTTP/1.1\r\nHost: a\r\n\r\n\r\n").unwrap();
        assert_eq!(request.body(), None);
    }

    #[test]
    fn leading_empty_lines_are_separators() {
        let request = RequestParser::parse("\r\n\r\nHEAD /a HTTP/1.0\r\n").unwrap();
        assert_eq!(request.method(), Method::Head);
        assert_eq!(request.uri(), "/a");
    }

    #[test]
    fn status_line_failures() {
        let cases: [(&str, fn(&ParseError) -> bool); 9] = [
            ("", |e| matches!(e, ParseError::EmptyStatusLine)),
            ("   \r\n", |e| matches!(e, ParseError::EmptyStatusLine)),
            ("  \r\nHost: a\r\n", |e| matches!(e, ParseError::MethodExpected)),
            ("POST / HTTP/1.1\r\n", |e| matches!(e, ParseError::UnsupportedMethod { token } if token == "POST")),
            ("GET\r\n", |e| matches!(e, ParseError::UriExpected)),
            ("GET /\r\n", |e| matches!(e, ParseError::ProtocolExpected)),
            ("HEAD / GarbageHTTP/1.1\r\n", |e| matches!(e, ParseError::UnsupportedProtocol { token } if token == "GarbageHTTP/1.1")),
            ("GET / HTTP/1.1 extra\r\n", |e| matches!(e, ParseError::UnexpectedStatusLineToken { token } if token == "extra")),
            ("GET / HTTP/1.1\r\nHost:a\r\n", |e| matches!(e, ParseError::InvalidHeaderField { line } if line == "Host:a")),
        ];

        for (raw, check) in cases {
            let error = RequestParser::parse(raw).unwrap_err();
            assert!(check(&error), "{raw:?} gave {error:?}");
        }
    }
}
