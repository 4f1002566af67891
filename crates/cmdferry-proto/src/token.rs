use crate::error::{ProtoError, Result};

/// Default maximum payload size: 1 MiB.
///
/// Payloads are shell command strings, not bulk data; the bound exists so
/// a corrupt or hostile length token cannot drive the receive allocation.
pub const DEFAULT_MAX_PAYLOAD: usize = 1024 * 1024;

/// Longest length token the receiver will buffer.
///
/// `usize::MAX` is 20 decimal digits; anything longer cannot be a valid
/// token and marks the stream as corrupt.
pub const MAX_TOKEN_LEN: usize = 20;

/// Configuration for a transfer.
#[derive(Debug, Clone)]
pub struct ProtoConfig {
    /// Maximum payload size in bytes. Default: 1 MiB.
    pub max_payload: usize,
}

impl Default for ProtoConfig {
    fn default() -> Self {
        Self {
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// Encode a payload length as its decimal text token.
pub fn encode_length(len: usize) -> String {
    len.to_string()
}

/// Decode a length token and bound-check the result.
///
/// The token must consist solely of ASCII digits — no sign, whitespace,
/// or terminator bytes. An empty token means the producer closed the
/// length channel without writing one.
pub fn decode_length(token: &[u8], max_payload: usize) -> Result<usize> {
    if token.is_empty() {
        return Err(ProtoError::Closed);
    }

    if !token.iter().all(u8::is_ascii_digit) {
        return Err(ProtoError::MalformedToken(token_preview(token)));
    }

    // All-digit UTF-8; parse can only fail on overflow.
    let text = std::str::from_utf8(token).map_err(|_| ProtoError::MalformedToken(token_preview(token)))?;
    let len = text
        .parse::<usize>()
        .map_err(|_| ProtoError::MalformedToken(token_preview(token)))?;

    if len > max_payload {
        return Err(ProtoError::PayloadTooLarge {
            size: len,
            max: max_payload,
        });
    }

    Ok(len)
}

/// Printable preview of an invalid token for diagnostics.
pub(crate) fn token_preview(token: &[u8]) -> String {
    const PREVIEW_LEN: usize = 32;
    let preview: String = token
        .iter()
        .take(PREVIEW_LEN)
        .flat_map(|b| std::ascii::escape_default(*b))
        .map(char::from)
        .collect();
    if token.len() > PREVIEW_LEN {
        format!("\"{preview}…\" ({} bytes)", token.len())
    } else {
        format!("\"{preview}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        for len in [0usize, 1, 10, 9_999, 10_000, DEFAULT_MAX_PAYLOAD] {
            let token = encode_length(len);
            let decoded = decode_length(token.as_bytes(), DEFAULT_MAX_PAYLOAD).unwrap();
            assert_eq!(decoded, len);
        }
    }

    #[test]
    fn zero_is_a_valid_length() {
        assert_eq!(decode_length(b"0", DEFAULT_MAX_PAYLOAD).unwrap(), 0);
    }

    #[test]
    fn rejects_non_digit_bytes() {
        for token in [&b"12a"[..], b"-5", b" 10", b"10\n", b"0x1f", b"ten"] {
            let result = decode_length(token, DEFAULT_MAX_PAYLOAD);
            assert!(
                matches!(result, Err(ProtoError::MalformedToken(_))),
                "token {token:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_overflowing_token() {
        let token = "9".repeat(MAX_TOKEN_LEN + 1);
        let result = decode_length(token.as_bytes(), usize::MAX);
        assert!(matches!(result, Err(ProtoError::MalformedToken(_))));
    }

    #[test]
    fn rejects_length_above_bound() {
        let result = decode_length(b"1025", 1024);
        assert!(matches!(
            result,
            Err(ProtoError::PayloadTooLarge {
                size: 1025,
                max: 1024
            })
        ));
    }

    #[test]
    fn empty_token_is_closed_channel() {
        let result = decode_length(b"", DEFAULT_MAX_PAYLOAD);
        assert!(matches!(result, Err(ProtoError::Closed)));
    }

    #[test]
    fn preview_escapes_control_bytes() {
        let preview = token_preview(b"12\x00ab");
        assert!(preview.contains("\\x00"));
    }
}
