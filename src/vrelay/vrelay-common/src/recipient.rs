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

use crate::Mailbox;

/// Which recipient header a recipient belongs to.
///
/// `Bcc` recipients receive the message through the envelope but never
/// appear in the transmitted header block.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    serde::Deserialize,
    serde::Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecipientRole {
    /// Primary recipient, listed in the `To` header.
    #[default]
    To,
    /// Carbon copy, listed in the `Cc` header.
    Cc,
    /// Blind carbon copy, envelope only.
    Bcc,
}

/// One recipient of a transmission.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Recipient {
    /// Where the message is delivered and, unless blind, displayed.
    pub mailbox: Mailbox,
    /// Header placement of this recipient.
    pub role: RecipientRole,
    /// Provider-schema substitution data, carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitution_data: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Recipient {
    /// A primary (`To`) recipient with no substitution data.
    #[must_use]
    #[inline]
    pub fn new(mailbox: Mailbox) -> Self {
        Self {
            mailbox,
            role: RecipientRole::To,
            substitution_data: None,
        }
    }

    /// Same mailbox with another role.
    #[must_use]
    #[inline]
    pub fn with_role(mut self, role: RecipientRole) -> Self {
        self.role = role;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr;

    #[test]
    fn default_role_is_to() {
        let rcpt = Recipient::new(Mailbox::new(addr!("a@example.com")));
        assert_eq!(rcpt.role, RecipientRole::To);
    }

    #[test]
    fn role_round_trips_through_strings() {
        for role in [RecipientRole::To, RecipientRole::Cc, RecipientRole::Bcc] {
            assert_eq!(role.to_string().parse::<RecipientRole>().unwrap(), role);
        }
    }
}
