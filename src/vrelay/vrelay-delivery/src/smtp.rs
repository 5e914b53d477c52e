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

use crate::{DeliveryOutcome, Transport, TransportError};
use lettre::{
    transport::smtp::{authentication::Credentials, PoolConfig},
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use vrelay_config::{field::FieldSmtp, TlsMode};

/// The production [`Transport`]: a pooled SMTP client towards the
/// configured upstream relay.
pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    send_timeout: std::time::Duration,
}

impl SmtpRelay {
    /// Build the client from its configuration. Must run inside a tokio
    /// runtime (the pool spawns its reaper there); connections towards
    /// the relay are dialed lazily on first use.
    ///
    /// # Errors
    ///
    /// When the TLS parameters for the relay host cannot be established.
    pub fn new(config: &FieldSmtp) -> anyhow::Result<Self> {
        let builder = match config.tls {
            TlsMode::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            }
            TlsMode::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            }
            TlsMode::Tunnel => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
        };

        let builder = builder
            .port(config.port)
            .pool_config(PoolConfig::new().max_size(config.pool_max_size));

        let builder = match &config.credentials {
            Some(credentials) => builder.credentials(Credentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            )),
            None => builder,
        };

        Ok(Self {
            transport: builder.build(),
            send_timeout: config.send_timeout,
        })
    }
}

#[async_trait::async_trait]
impl Transport for SmtpRelay {
    #[tracing::instrument(skip_all, fields(recipient_count = envelope.to().len()))]
    async fn send(
        &self,
        envelope: &lettre::address::Envelope,
        message: &[u8],
    ) -> Result<DeliveryOutcome, TransportError> {
        let response = tokio::time::timeout(
            self.send_timeout,
            self.transport.send_raw(envelope, message),
        )
        .await
        .map_err(|_elapsed| {
            TransportError::Transient(format!(
                "no reply from the relay within {}s",
                self.send_timeout.as_secs()
            ))
        })??;

        tracing::debug!(code = %response.code(), "message relayed");
        Ok(DeliveryOutcome::accepted(envelope.to().len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vrelay_config::FieldSmtpCredentials;

    #[tokio::test]
    async fn client_builds_for_every_tls_mode() {
        for tls in [TlsMode::None, TlsMode::StartTls, TlsMode::Tunnel] {
            let config = FieldSmtp {
                host: "smtp.example.com".to_owned(),
                tls,
                ..FieldSmtp::default()
            };
            assert!(SmtpRelay::new(&config).is_ok());
        }
    }

    #[tokio::test]
    async fn client_builds_with_credentials() {
        let config = FieldSmtp {
            credentials: Some(FieldSmtpCredentials {
                username: "relay".to_owned(),
                password: "hunter2".to_owned(),
            }),
            ..FieldSmtp::default()
        };
        assert!(SmtpRelay::new(&config).is_ok());
    }
}
