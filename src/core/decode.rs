//! Decoding of base64 configuration options.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

/// Outcome of decoding one configuration option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// Option unset, empty, or decoding to whitespace only.
    Absent,
    /// Option set but not valid base64, or not UTF-8 once decoded.
    Invalid,
    Present(String),
}

impl Decoded {
    pub fn as_present(&self) -> Option<&str> {
        match self {
            Decoded::Present(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Decoded::Absent)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Decoded::Invalid)
    }
}

#[derive(Debug, Error)]
enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decoded content is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn decode_text(encoded: &str) -> Result<String, DecodeError> {
    // Wrapped output from `base64 -w 76` is accepted.
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD.decode(compact)?;
    Ok(String::from_utf8(bytes)?)
}

/// Decode an optional base64 option into UTF-8 text.
///
/// `option` names the setting in log messages. Never fails; malformed
/// input is logged and reported as [`Decoded::Invalid`]. Content that is
/// blank once decoded carries nothing to write and is [`Decoded::Absent`].
pub fn decode(option: &str, encoded: Option<&str>) -> Decoded {
    let encoded = match encoded {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Decoded::Absent,
    };
    match decode_text(encoded) {
        Ok(text) if text.trim().is_empty() => Decoded::Absent,
        Ok(text) => Decoded::Present(text),
        Err(e) => {
            tracing::error!(option, error = %e, "failed to decode {} content", option);
            Decoded::Invalid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    #[test]
    fn test_roundtrip_utf8() {
        for text in ["console x1 { master localhost; }", "ünïcødé\nlines\n", "a"] {
            let encoded = encode(text.as_bytes());
            assert_eq!(
                decode("config-file", Some(&encoded)),
                Decoded::Present(text.to_string())
            );
        }
    }

    #[test]
    fn test_absent_when_unset_or_empty() {
        assert_eq!(decode("config-file", None), Decoded::Absent);
        assert_eq!(decode("config-file", Some("")), Decoded::Absent);
        assert_eq!(decode("config-file", Some("  \n")), Decoded::Absent);
    }

    #[test]
    fn test_blank_content_is_absent() {
        assert_eq!(decode("passwd-file", Some(&encode(b"\n\n"))), Decoded::Absent);
        assert_eq!(decode("config-file", Some(&encode(b" \t \n"))), Decoded::Absent);
    }

    #[test]
    fn test_invalid_alphabet() {
        assert_eq!(decode("config-file", Some("not base64!!")), Decoded::Invalid);
        assert_eq!(decode("config-file", Some("%%%%")), Decoded::Invalid);
    }

    #[test]
    fn test_invalid_padding() {
        assert_eq!(decode("config-file", Some("YWJj=")), Decoded::Invalid);
    }

    #[test]
    fn test_invalid_utf8_after_decode() {
        let encoded = encode(&[0x67, 0x61, 0xff, 0xfe, 0x00, 0xc3]);
        assert_eq!(decode("passwd-file", Some(&encoded)), Decoded::Invalid);
    }

    #[test]
    fn test_wrapped_input_accepted() {
        let text = "x".repeat(120);
        let encoded = encode(text.as_bytes());
        let (head, tail) = encoded.split_at(76);
        let wrapped = format!("{}\n{}\n", head, tail);
        assert_eq!(decode("config-file", Some(&wrapped)), Decoded::Present(text));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Decoded::Present("a".into()).as_present(), Some("a"));
        assert!(Decoded::Absent.is_absent());
        assert!(Decoded::Invalid.is_invalid());
        assert_eq!(Decoded::Invalid.as_present(), None);
    }
}
