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

//! Turns a validated [`vrelay_common::Transmission`] into an RFC 5322 /
//! MIME message and serializes it to its wire form.
//!
//! The conversion is pure: the only non-deterministic inputs (message id,
//! date) are captured in a [`Stamp`] that the caller may supply.

#![doc(html_no_source)]
#![deny(missing_docs)]
#![forbid(unsafe_code)]
//
#![warn(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod compose;
mod encoding;
mod render;

/// The outbound message model: ordered headers and a MIME body tree.
pub mod message {
    mod body;
    mod mail;

    pub use body::{Body, Leaf, MultipartKind};
    pub use mail::Mail;
}

pub use compose::{compose, compose_with, ComposerError, Stamp};
pub use encoding::{encoded_word, TransferEncoding};
