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

use crate::{Mailbox, Recipient, RecipientRole};

/// One attachment of a transmission, payload already decoded.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Attachment {
    /// Filename shown to the receiving client.
    pub name: String,
    /// Declared MIME type, kept verbatim if syntactically valid.
    pub mime_type: String,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
}

/// A validated transmission: the semantic content of one email send
/// request, owned by the handler for the duration of one HTTP call.
///
/// Invariants, enforced by the parser that builds it:
/// * `sender` and at least one recipient are present and syntactically
///   valid,
/// * custom header names do not collide with derived headers,
/// * `subject`, `text` and `html` may be empty but were present as fields.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Transmission {
    /// Sender, becomes both `From` and the envelope reverse path.
    pub sender: Mailbox,
    /// Non-empty recipient list.
    pub recipients: Vec<Recipient>,
    /// Subject text, possibly empty.
    pub subject: String,
    /// Plain text representation of the body.
    pub text: Option<String>,
    /// HTML representation of the body.
    pub html: Option<String>,
    /// Validated custom headers, in submission order, names deduplicated
    /// case-insensitively with last-write-wins.
    pub headers: Vec<(String, String)>,
    /// Attachments, in submission order.
    pub attachments: Vec<Attachment>,
}

impl Transmission {
    /// Recipients holding the given role, submission order preserved.
    #[inline]
    pub fn recipients_with_role(
        &self,
        role: RecipientRole,
    ) -> impl Iterator<Item = &Recipient> + '_ {
        self.recipients.iter().filter(move |r| r.role == role)
    }
}
