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

use crate::encoding::{
    encoded_word, filename_parameter, mime_type_is_valid, normalize_crlf, TransferEncoding,
};
use crate::message::{Body, Leaf, Mail, MultipartKind};
use vrelay_common::{Mailbox, RecipientRole, Transmission};

/// Fallback for attachments declaring an invalid MIME type.
const GENERIC_BINARY: &str = "application/octet-stream";

/// Headers the composer derives itself. A custom header colliding with one
/// of these is dropped, the derived value wins.
const DERIVED_HEADERS: &[&str] = &[
    "From",
    "To",
    "Cc",
    "Bcc",
    "Subject",
    "Content-Type",
    "Content-Transfer-Encoding",
    "MIME-Version",
];

/// Internal invariant violation while composing an already-validated
/// transmission. Reaching this is a defect, not a user error.
#[derive(Debug, thiserror::Error)]
pub enum ComposerError {
    /// The transmission carries neither a body representation nor an
    /// attachment, so the body tree would be empty.
    #[error("transmission produced an empty body tree")]
    EmptyBody,
    /// The stamped date could not be formatted.
    #[error("failed to format the Date header: {0}")]
    DateFormat(#[from] time::error::Format),
}

/// The non-deterministic inputs of a composition, captured so the
/// conversion itself stays a pure function.
#[derive(Debug, Clone)]
pub struct Stamp {
    /// `Message-ID` value, without the angle brackets.
    pub message_id: String,
    /// Creation time for the `Date` header.
    pub date: time::OffsetDateTime,
}

impl Stamp {
    /// A fresh stamp: random uuid qualified by the sender's domain.
    #[must_use]
    pub fn generate(sender: &Mailbox) -> Self {
        Self {
            message_id: format!("{}@{}", uuid::Uuid::new_v4(), sender.address.domain()),
            date: time::OffsetDateTime::now_utc(),
        }
    }

    /// Boundary for the `nth` multipart branch, derived from the message
    /// id so a given stamp always yields the same message bytes.
    fn boundary(&self, nth: usize) -> String {
        let token: String = self
            .message_id
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(24)
            .collect();
        format!("----=_vrelay_{nth}_{token}")
    }
}

/// Convert a validated transmission into a transmittable message, stamping
/// a fresh message id and date.
///
/// # Errors
///
/// * an internal invariant was violated, see [`ComposerError`]
pub fn compose(transmission: &Transmission) -> Result<Mail, ComposerError> {
    compose_with(transmission, &Stamp::generate(&transmission.sender))
}

/// Deterministic composition: same transmission and stamp, same message.
///
/// # Errors
///
/// * an internal invariant was violated, see [`ComposerError`]
pub fn compose_with(transmission: &Transmission, stamp: &Stamp) -> Result<Mail, ComposerError> {
    let body = build_body(transmission, stamp)?;

    let mut mail = Mail {
        headers: address_headers(transmission),
        body,
    };

    mail.headers.push((
        "Subject".to_owned(),
        encoded_word(&transmission.subject),
    ));
    mail.headers
        .push(("MIME-Version".to_owned(), "1.0".to_owned()));

    // Custom headers land after the derived block; names colliding with a
    // derived header are dropped so `From`/`To`/... cannot be spoofed.
    for (name, value) in &transmission.headers {
        if DERIVED_HEADERS
            .iter()
            .any(|derived| derived.eq_ignore_ascii_case(name))
        {
            continue;
        }
        mail.push_header_unique(name.clone(), value.clone());
    }

    // Identification headers only when not supplied by the caller.
    mail.push_header_unique("Message-ID", format!("<{}>", stamp.message_id));
    if mail.get_header("Date").is_none() {
        let date = stamp
            .date
            .format(&time::format_description::well_known::Rfc2822)?;
        mail.headers.push(("Date".to_owned(), date));
    }

    Ok(mail)
}

fn address_headers(transmission: &Transmission) -> Vec<(String, String)> {
    let mut headers = vec![(
        "From".to_owned(),
        render_mailbox(&transmission.sender),
    )];

    // Bcc recipients travel in the envelope only.
    for (role, header) in [(RecipientRole::To, "To"), (RecipientRole::Cc, "Cc")] {
        let list = transmission
            .recipients_with_role(role)
            .map(|r| render_mailbox(&r.mailbox))
            .collect::<Vec<_>>();
        if !list.is_empty() {
            headers.push((header.to_owned(), list.join(", ")));
        }
    }

    headers
}

/// A mailbox as written in a header, display name encoded when non-ASCII.
fn render_mailbox(mailbox: &Mailbox) -> String {
    match &mailbox.name {
        Some(name) if !name.is_ascii() => {
            format!("{} <{}>", encoded_word(name), mailbox.address)
        }
        _ => mailbox.to_string(),
    }
}

fn build_body(transmission: &Transmission, stamp: &Stamp) -> Result<Body, ComposerError> {
    let mut alternatives = Vec::new();
    if let Some(text) = &transmission.text {
        alternatives.push(text_leaf("text/plain", text));
    }
    if let Some(html) = &transmission.html {
        alternatives.push(text_leaf("text/html", html));
    }

    let content = match alternatives.len() {
        0 if transmission.attachments.is_empty() => return Err(ComposerError::EmptyBody),
        0 => None,
        1 => Some(alternatives.remove(0)),
        _ => Some(Body::Branch {
            kind: MultipartKind::Alternative,
            boundary: stamp.boundary(1),
            parts: alternatives,
        }),
    };

    if transmission.attachments.is_empty() {
        // `content` is Some here: the zero-leaf case returned above.
        return content.ok_or(ComposerError::EmptyBody);
    }

    let mut parts = Vec::with_capacity(transmission.attachments.len() + 1);
    parts.extend(content);
    for attachment in &transmission.attachments {
        let mime_type = if mime_type_is_valid(&attachment.mime_type) {
            attachment.mime_type.as_str()
        } else {
            GENERIC_BINARY
        };
        parts.push(Body::Leaf(Leaf {
            content_type: mime_type.to_owned(),
            transfer_encoding: TransferEncoding::Base64,
            disposition: Some(format!(
                "attachment; {}",
                filename_parameter(&attachment.name)
            )),
            payload: attachment.payload.clone(),
        }));
    }

    Ok(Body::Branch {
        kind: MultipartKind::Mixed,
        boundary: stamp.boundary(0),
        parts,
    })
}

fn text_leaf(mime_type: &str, text: &str) -> Body {
    // Line breaks are normalized before the payload is stored, so every
    // encoding emits CRLF only.
    let text = normalize_crlf(text);
    Body::Leaf(Leaf {
        content_type: format!("{mime_type}; charset=utf-8"),
        transfer_encoding: TransferEncoding::for_text(&text),
        disposition: None,
        payload: text.into_bytes(),
    })
}
