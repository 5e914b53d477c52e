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

use crate::TransferEncoding;

/// Grouping semantic of a multipart branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum MultipartKind {
    /// Equivalent representations of the same content, best last.
    #[strum(serialize = "multipart/alternative")]
    Alternative,
    /// Independent parts, all to be presented (body plus attachments).
    #[strum(serialize = "multipart/mixed")]
    Mixed,
}

/// A single content part: its own type, encoding and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Complete `Content-Type` value, parameters included.
    pub content_type: String,
    /// How the payload is written on the wire.
    pub transfer_encoding: TransferEncoding,
    /// Complete `Content-Disposition` value, for attachment parts.
    pub disposition: Option<String>,
    /// Decoded payload bytes.
    pub payload: Vec<u8>,
}

/// The MIME body tree. Always carries at least one content leaf in a
/// well-formed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// A single part.
    Leaf(Leaf),
    /// A multipart container.
    Branch {
        /// Grouping semantic.
        kind: MultipartKind,
        /// Boundary separating the nested parts.
        boundary: String,
        /// Nested parts, order significant.
        parts: Vec<Body>,
    },
}

impl Body {
    /// Number of content leaves in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Branch { parts, .. } => parts.iter().map(Self::leaf_count).sum(),
        }
    }

    /// Depth-first iterator over the leaves.
    pub fn leaves(&self) -> Box<dyn Iterator<Item = &Leaf> + '_> {
        match self {
            Self::Leaf(leaf) => Box::new(std::iter::once(leaf)),
            Self::Branch { parts, .. } => Box::new(parts.iter().flat_map(Self::leaves)),
        }
    }

    /// The `Content-Type` value this node contributes to its enclosing
    /// header block.
    #[must_use]
    pub fn content_type(&self) -> String {
        match self {
            Self::Leaf(leaf) => leaf.content_type.clone(),
            Self::Branch { kind, boundary, .. } => {
                format!("{kind}; boundary=\"{boundary}\"")
            }
        }
    }
}
