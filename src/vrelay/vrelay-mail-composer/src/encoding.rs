/*
 * vRelay HTTP to SMTP relay gateway
 * Copyright (C) 2023 viridIT SAS
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or any later version.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT
 * ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
 * FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License along with
 * this program. If not, see https://www.gnu.org/licenses/.
 *
*/

use base64::Engine;

/// Longest line a `7bit` body may carry before we fall back to
/// quoted-printable (RFC 5321 SHOULD limit, minus CRLF).
const SEVEN_BIT_LINE_MAX: usize = 78;

/// Content transfer encoding of one MIME leaf.
///
/// Raw 8-bit is deliberately absent: everything non-ASCII is re-encoded so
/// the message survives any transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
pub enum TransferEncoding {
    /// Plain ASCII with short lines, written as-is.
    #[strum(serialize = "7bit")]
    SevenBit,
    /// Mostly-readable text encoding, used for any non-trivial text.
    #[strum(serialize = "quoted-printable")]
    QuotedPrintable,
    /// Binary-safe encoding, used for attachments.
    #[strum(serialize = "base64")]
    Base64,
}

impl TransferEncoding {
    /// Pick the encoding for a text leaf.
    #[must_use]
    pub fn for_text(text: &str) -> Self {
        if text.is_ascii() && text.lines().all(|l| l.len() <= SEVEN_BIT_LINE_MAX) {
            Self::SevenBit
        } else {
            Self::QuotedPrintable
        }
    }

    /// Encode a payload, producing CRLF separated lines ready to be
    /// written below the part headers.
    #[must_use]
    pub fn encode(self, payload: &[u8]) -> String {
        match self {
            Self::SevenBit => String::from_utf8_lossy(payload).into_owned(),
            Self::QuotedPrintable => quoted_printable::encode_to_str(payload),
            Self::Base64 => wrap_base64(payload),
        }
    }
}

/// Rewrite bare LF and bare CR line breaks as CRLF; RFC 5321 forbids
/// anything else on the wire.
pub(crate) fn normalize_crlf(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\r\n");
            }
            '\n' => out.push_str("\r\n"),
            c => out.push(c),
        }
    }
    out
}

/// Base64 with lines wrapped at the 76 column limit of RFC 2045.
fn wrap_base64(payload: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(payload);
    encoded
        .as_bytes()
        .chunks(76)
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// RFC 2047 encoded word for header values, applied only when the value
/// contains non-ASCII characters.
#[must_use]
pub fn encoded_word(value: &str) -> String {
    if value.is_ascii() {
        return value.to_owned();
    }
    format!(
        "=?UTF-8?B?{}?=",
        base64::engine::general_purpose::STANDARD.encode(value.as_bytes())
    )
}

/// RFC 2231/2047 `filename` parameter for a `Content-Disposition` header.
#[must_use]
pub fn filename_parameter(name: &str) -> String {
    if name.is_ascii() {
        format!("filename=\"{}\"", name.replace('"', ""))
    } else {
        let mut escaped = String::with_capacity(name.len() * 3);
        for byte in name.as_bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'-' | b'_') {
                escaped.push(char::from(*byte));
            } else {
                escaped.push_str(&format!("%{byte:02X}"));
            }
        }
        format!("filename*=UTF-8''{escaped}")
    }
}

/// Is the declared MIME type a syntactically valid `type/subtype`?
#[must_use]
pub(crate) fn mime_type_is_valid(declared: &str) -> bool {
    fn is_token(s: &str) -> bool {
        !s.is_empty()
            && s.bytes().all(|b| {
                b.is_ascii_alphanumeric() || matches!(b, b'-' | b'+' | b'.' | b'_')
            })
    }

    matches!(
        declared.split_once('/'),
        Some((ty, subtype)) if is_token(ty) && is_token(subtype)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("hello", TransferEncoding::SevenBit)]
    #[case("héllo", TransferEncoding::QuotedPrintable)]
    #[case("привет", TransferEncoding::QuotedPrintable)]
    fn text_encoding_choice(#[case] text: &str, #[case] expected: TransferEncoding) {
        assert_eq!(TransferEncoding::for_text(text), expected);
    }

    #[test]
    fn long_ascii_lines_use_quoted_printable() {
        let text = "a".repeat(200);
        assert_eq!(
            TransferEncoding::for_text(&text),
            TransferEncoding::QuotedPrintable
        );
    }

    #[test]
    fn seven_bit_is_identity() {
        assert_eq!(TransferEncoding::SevenBit.encode(b"hello"), "hello");
    }

    #[test]
    fn base64_wraps_at_76() {
        let encoded = TransferEncoding::Base64.encode(&[0_u8; 100]);
        assert!(encoded.lines().all(|l| l.len() <= 76));
        let rejoined = encoded.replace("\r\n", "");
        assert_eq!(
            base64::engine::general_purpose::STANDARD
                .decode(rejoined)
                .unwrap(),
            vec![0_u8; 100]
        );
    }

    #[test]
    fn quoted_printable_round_trips() {
        let encoded = TransferEncoding::QuotedPrintable.encode("héllo wörld".as_bytes());
        let decoded =
            quoted_printable::decode(encoded, quoted_printable::ParseMode::Strict).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "héllo wörld");
    }

    #[rstest]
    #[case("line one\nline two", "line one\r\nline two")]
    #[case("line one\rline two", "line one\r\nline two")]
    #[case("line one\r\nline two", "line one\r\nline two")]
    #[case("trailing\n", "trailing\r\n")]
    fn line_breaks_are_rewritten_as_crlf(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_crlf(input), expected);
    }

    #[test]
    fn ascii_header_values_stay_clear() {
        assert_eq!(encoded_word("Hi"), "Hi");
    }

    #[test]
    fn non_ascii_header_values_become_encoded_words() {
        let encoded = encoded_word("Grüße");
        assert!(encoded.starts_with("=?UTF-8?B?"));
        assert!(encoded.ends_with("?="));
    }

    #[rstest]
    #[case("application/pdf", true)]
    #[case("image/svg+xml", true)]
    #[case("pdf", false)]
    #[case("application/", false)]
    #[case("appli cation/pdf", false)]
    fn mime_type_syntax(#[case] declared: &str, #[case] valid: bool) {
        assert_eq!(mime_type_is_valid(declared), valid);
    }

    #[test]
    fn ascii_filename_is_quoted() {
        assert_eq!(filename_parameter("report.pdf"), "filename=\"report.pdf\"");
    }

    #[test]
    fn non_ascii_filename_uses_rfc2231() {
        let param = filename_parameter("résumé.pdf");
        assert!(param.starts_with("filename*=UTF-8''"));
        assert!(!param.contains('é'));
    }
}
