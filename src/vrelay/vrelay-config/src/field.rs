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

/// The root of the configuration tree.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// The inbound HTTP endpoint.
    pub api: FieldApi,
    /// The outbound SMTP relay.
    pub smtp: FieldSmtp,
    /// Logging.
    pub logs: FieldLogs,
    /// Where this configuration was loaded from, if it came from a file.
    #[serde(skip)]
    pub path: Option<std::path::PathBuf>,
}

/// The inbound HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FieldApi {
    /// Name of the gateway, reported by the healthcheck. Defaults to the
    /// machine hostname.
    pub name: String,
    /// Address and port the HTTP server binds.
    pub addr: std::net::SocketAddr,
}

/// The outbound SMTP relay.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FieldSmtp {
    /// Hostname or address of the relay.
    pub host: String,
    /// Port of the relay.
    pub port: u16,
    /// Transport layer security of the connection.
    pub tls: TlsMode,
    /// Deadline for one complete SMTP exchange.
    #[serde(with = "humantime_serde")]
    pub send_timeout: std::time::Duration,
    /// Connections kept open towards the relay.
    pub pool_max_size: u32,
    // Last field: TOML wants plain values written before tables.
    /// Credentials for SMTP AUTH, plain relays need none.
    pub credentials: Option<FieldSmtpCredentials>,
}

/// Credentials for SMTP AUTH.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSmtpCredentials {
    /// AUTH username.
    pub username: String,
    /// AUTH password.
    pub password: String,
}

/// Transport layer security of the SMTP connection.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TlsMode {
    /// Plain text, for relays on a trusted network.
    #[default]
    None,
    /// Plain connection upgraded with `STARTTLS`.
    StartTls,
    /// TLS from the first byte (submissions, port 465).
    Tunnel,
}

/// Logging.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FieldLogs {
    /// Filter directives, `tracing_subscriber` syntax.
    pub level: Vec<String>,
}
