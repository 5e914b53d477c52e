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

use crate::field::{Config, FieldApi, FieldLogs, FieldSmtp, TlsMode};

impl Default for Config {
    fn default() -> Self {
        Self {
            api: FieldApi::default(),
            smtp: FieldSmtp::default(),
            logs: FieldLogs::default(),
            path: None,
        }
    }
}

impl Default for FieldApi {
    fn default() -> Self {
        Self {
            name: Self::hostname(),
            addr: Self::default_addr(),
        }
    }
}

impl FieldApi {
    pub(crate) fn hostname() -> String {
        hostname::get()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|_| "localhost".to_owned())
    }

    pub(crate) fn default_addr() -> std::net::SocketAddr {
        "127.0.0.1:8080".parse().expect("hardcoded value is valid")
    }
}

impl Default for FieldSmtp {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            tls: TlsMode::default(),
            send_timeout: Self::default_send_timeout(),
            pool_max_size: Self::default_pool_max_size(),
            credentials: None,
        }
    }
}

impl FieldSmtp {
    pub(crate) fn default_host() -> String {
        "localhost".to_owned()
    }

    pub(crate) const fn default_port() -> u16 {
        25
    }

    pub(crate) const fn default_send_timeout() -> std::time::Duration {
        std::time::Duration::from_secs(30)
    }

    pub(crate) const fn default_pool_max_size() -> u32 {
        16
    }
}

impl Default for FieldLogs {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

impl FieldLogs {
    pub(crate) fn default_level() -> Vec<String> {
        vec!["info".to_owned()]
    }
}
