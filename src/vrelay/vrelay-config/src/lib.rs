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

//! The gateway configuration, loaded from a TOML file.
//!
//! Every field carries a default so an empty file (or no file at all) is a
//! valid configuration that listens on localhost and relays through a local
//! SMTP server on port 25.

#![doc(html_no_source)]
#![deny(missing_docs)]
#![forbid(unsafe_code)]
//
#![warn(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod default;
/// The configuration fields.
pub mod field;

pub use field::{Config, FieldApi, FieldLogs, FieldSmtp, FieldSmtpCredentials, TlsMode};

impl Config {
    /// Read and validate a configuration file.
    ///
    /// # Errors
    ///
    /// * the file could not be read
    /// * the file is not valid TOML for the configuration schema
    /// * a field fails [`Config::validate`]
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|error| anyhow::anyhow!("cannot read '{}': {error}", path.display()))?;
        let mut config = Self::from_toml(&content)?;
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse and validate a configuration from its TOML source.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_toml_file`], minus the I/O.
    pub fn from_toml(input: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the semantic rules the TOML schema cannot express.
    ///
    /// # Errors
    ///
    /// * the SMTP host is empty or the port is zero
    /// * credentials are present but the username is empty
    /// * a log directive does not parse
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.smtp.host.is_empty(), "`smtp.host` must not be empty");
        anyhow::ensure!(self.smtp.port != 0, "`smtp.port` must not be zero");

        if let Some(credentials) = &self.smtp.credentials {
            anyhow::ensure!(
                !credentials.username.is_empty(),
                "`smtp.credentials.username` must not be empty"
            );
        }

        for directive in &self.logs.level {
            directive
                .parse::<tracing_subscriber::filter::Directive>()
                .map_err(|error| {
                    anyhow::anyhow!("invalid log directive '{directive}': {error}")
                })?;
        }

        Ok(())
    }

    /// Render the effective configuration back to TOML, defaults included.
    ///
    /// # Errors
    ///
    /// When a field cannot be serialized, which a loaded configuration
    /// cannot trigger.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Copy with the AUTH password blanked out, for anything that prints
    /// or logs the configuration.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(credentials) = &mut config.smtp.credentials {
            credentials.password = "<redacted>".to_owned();
        }
        config
    }

    /// The log directives, parsed.
    ///
    /// # Panics
    ///
    /// If the configuration was not validated first.
    #[must_use]
    pub fn log_directives(&self) -> Vec<tracing_subscriber::filter::Directive> {
        self.logs
            .level
            .iter()
            .map(|directive| directive.parse().expect("validated on load"))
            .collect()
    }
}
