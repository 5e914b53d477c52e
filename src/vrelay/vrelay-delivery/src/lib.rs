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

//! Relaying of composed messages to the upstream SMTP server.
//!
//! The [`Transport`] trait hides the wire: the HTTP handler only knows it
//! hands over envelope plus message bytes and gets back a
//! [`DeliveryOutcome`] or a [`TransportError`] sorted by retryability.

#![doc(html_no_source)]
#![deny(missing_docs)]
#![forbid(unsafe_code)]
//
#![warn(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod smtp;

pub use smtp::SmtpRelay;

use vrelay_common::Transmission;

/// How a delivery attempt went, whole-message granularity.
///
/// The upstream server accepts or rejects the transaction as one unit, so
/// one of the two counters is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// Envelope recipients the upstream accepted.
    pub accepted: usize,
    /// Envelope recipients the upstream rejected.
    pub rejected: usize,
}

impl DeliveryOutcome {
    /// The whole transaction was accepted.
    #[must_use]
    pub const fn accepted(recipient_count: usize) -> Self {
        Self {
            accepted: recipient_count,
            rejected: 0,
        }
    }
}

/// A failed delivery attempt, sorted by whether retrying can help.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The upstream could not be reached or asked to come back later.
    #[error("transient delivery failure: {0}")]
    Transient(String),
    /// The upstream refused the message for good.
    #[error("permanent delivery failure: {0}")]
    Permanent(String),
}

impl TransportError {
    /// Whether a later retry of the same request can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<lettre::transport::smtp::Error> for TransportError {
    fn from(error: lettre::transport::smtp::Error) -> Self {
        // 5xx replies and malformed submissions will fail identically on
        // retry, everything else is worth another attempt.
        if error.is_permanent() || error.is_client() {
            Self::Permanent(error.to_string())
        } else {
            Self::Transient(error.to_string())
        }
    }
}

/// An abstract mail relay.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Relay one composed message.
    ///
    /// # Errors
    ///
    /// * [`TransportError::Transient`] when a retry can help
    /// * [`TransportError::Permanent`] when it cannot
    async fn send(
        &self,
        envelope: &lettre::address::Envelope,
        message: &[u8],
    ) -> Result<DeliveryOutcome, TransportError>;
}

/// Build the SMTP envelope of a transmission: the sender as reverse path,
/// every recipient (visible or not) as a forward path.
///
/// # Errors
///
/// When an address does not convert to its wire form. Addresses were
/// syntax-checked on ingestion, so this is a defect.
pub fn envelope(transmission: &Transmission) -> anyhow::Result<lettre::address::Envelope> {
    Ok(lettre::address::Envelope::new(
        Some(transmission.sender.address.to_lettre()?),
        transmission
            .recipients
            .iter()
            .map(|recipient| recipient.mailbox.address.to_lettre())
            .collect::<anyhow::Result<Vec<_>>>()?,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vrelay_common::{addr, Mailbox, Recipient, RecipientRole};

    #[test]
    fn envelope_includes_hidden_recipients() {
        let transmission = Transmission {
            sender: Mailbox::new(addr!("a@example.com")),
            recipients: vec![
                Recipient::new(Mailbox::new(addr!("b@example.com"))),
                Recipient::new(Mailbox::new(addr!("hidden@example.com")))
                    .with_role(RecipientRole::Bcc),
            ],
            subject: String::new(),
            text: Some(String::new()),
            html: None,
            headers: vec![],
            attachments: vec![],
        };

        let envelope = envelope(&transmission).unwrap();
        assert_eq!(envelope.from().unwrap().to_string(), "a@example.com");
        let to: Vec<_> = envelope.to().iter().map(ToString::to_string).collect();
        assert_eq!(to, ["b@example.com", "hidden@example.com"]);
    }

    #[test]
    fn accepted_outcome_rejects_nothing() {
        let outcome = DeliveryOutcome::accepted(3);
        assert_eq!(outcome.accepted, 3);
        assert_eq!(outcome.rejected, 0);
    }

    #[test]
    fn transient_errors_are_retryable() {
        assert!(TransportError::Transient("451".to_owned()).is_retryable());
        assert!(!TransportError::Permanent("550".to_owned()).is_retryable());
    }
}
