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

//! Inbound provider schemas.
//!
//! Each supported provider format implements [`RequestParser`]: raw body
//! bytes plus the declared content type, in; a validated
//! [`vrelay_common::Transmission`], out. The handler selects the parser
//! by route, so adding another provider means adding another
//! implementation, not touching the pipeline.

#![doc(html_no_source)]
#![deny(missing_docs)]
#![forbid(unsafe_code)]
//
#![warn(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod sparkpost;

pub use error::{FieldError, ValidationError};
pub use sparkpost::SparkPost;

use vrelay_common::Transmission;

/// An abstract transmission request parser.
///
/// Implementations are pure: same bytes, same outcome, no I/O.
pub trait RequestParser: Send + Sync {
    /// Decode and validate one request body.
    ///
    /// All problems are collected into a single [`ValidationError`] so the
    /// caller sees every offending field at once.
    ///
    /// # Errors
    ///
    /// * the declared content type is not supported
    /// * the body is not valid for the provider schema
    /// * a semantic rule is violated (addresses, reserved headers, ...)
    fn parse(
        &self,
        body: &[u8],
        content_type: Option<&str>,
    ) -> Result<Transmission, ValidationError>;
}
