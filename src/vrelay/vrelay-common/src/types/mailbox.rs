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

use super::Address;

/// An address with an optional display name, i.e. one RFC 5322 mailbox.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Mailbox {
    /// Display name, shown by mail clients next to the address.
    pub name: Option<String>,
    /// The address itself.
    pub address: Address,
}

impl Mailbox {
    /// Build a mailbox without a display name.
    #[must_use]
    #[inline]
    pub const fn new(address: Address) -> Self {
        Self {
            name: None,
            address,
        }
    }

    /// Build a mailbox with a display name.
    #[must_use]
    #[inline]
    pub fn with_name(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: Some(name.into()),
            address,
        }
    }
}

impl From<Address> for Mailbox {
    #[inline]
    fn from(address: Address) -> Self {
        Self::new(address)
    }
}

/// Renders `"Display Name" <user@domain>`, or the bare address when there
/// is no display name. Non-ASCII names are encoded at composition time,
/// not here.
impl std::fmt::Display for Mailbox {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "\"{}\" <{}>", name.replace('"', "\\\""), self.address),
            None => write!(f, "{}", self.address),
        }
    }
}
