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

use super::Body;

/// The outbound message: an ordered header block and a MIME body tree.
///
/// Every header name appears at most once; the composer enforces the
/// derived-wins rule before a header lands here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    /// `(name, value)` pairs, in emission order. Values are already
    /// encoded-word escaped where needed.
    pub headers: Vec<(String, String)>,
    /// The body tree, at least one content leaf.
    pub body: Body,
}

impl Mail {
    /// Value of the first header with the given name, case-insensitive.
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Append a header unless one with the same name is already present.
    pub fn push_header_unique(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if self.get_header(&name).is_none() {
            self.headers.push((name, value.into()));
        }
    }

    /// The `Message-ID` stamped at composition time.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.get_header("Message-ID")
    }
}
