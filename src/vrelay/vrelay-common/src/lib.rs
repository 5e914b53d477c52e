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

//! vRelay common types: addresses, recipients and the transmission model
//! shared by every crate of the workspace.

#![doc(html_no_source)]
#![deny(missing_docs)]
#![forbid(unsafe_code)]
//
#![warn(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod recipient;
mod transmission;

/// Base types used across the gateway.
pub mod types {
    mod address;
    mod mailbox;

    pub use address::Address;
    pub use mailbox::Mailbox;
}

pub use recipient::{Recipient, RecipientRole};
pub use transmission::{Attachment, Transmission};
pub use types::{Address, Mailbox};
