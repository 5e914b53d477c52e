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

//! The HTTP face of the gateway.
//!
//! One route per inbound provider schema plus a healthcheck, all glued to
//! the composer and the SMTP relay through [`AppState`].

#![doc(html_no_source)]
#![deny(missing_docs)]
#![forbid(unsafe_code)]
//
#![warn(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod args;
mod handler;

pub use args::Args;

use vrelay_api::{RequestParser, SparkPost};
use vrelay_config::Config;
use vrelay_delivery::Transport;

/// Everything a request handler needs, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// The loaded configuration.
    pub config: std::sync::Arc<Config>,
    /// The outbound relay.
    pub transport: std::sync::Arc<dyn Transport>,
    /// The inbound schema.
    pub parser: std::sync::Arc<dyn RequestParser>,
}

impl AppState {
    /// Wire the state for the SparkPost schema.
    #[must_use]
    pub fn new(config: Config, transport: std::sync::Arc<dyn Transport>) -> Self {
        Self {
            config: std::sync::Arc::new(config),
            transport,
            parser: std::sync::Arc::new(SparkPost),
        }
    }
}

/// The route table.
///
/// `GET` routes answer `HEAD` as well, axum derives it.
#[must_use]
pub fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/healthcheck", axum::routing::get(handler::healthcheck))
        .route(
            "/sparkpost/api/v1/transmissions",
            axum::routing::post(handler::create_transmission),
        )
        .with_state(state)
}

/// Initialize the tracing subsystem from the configured directives.
///
/// # Errors
///
/// When a global subscriber is already installed.
pub fn init_logs(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with({
            let mut filter = tracing_subscriber::EnvFilter::default();
            for directive in config.log_directives() {
                filter = filter.add_directive(directive);
            }
            filter
        })
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false),
        )
        .try_init()?;

    Ok(())
}

/// Bind the API socket, with the failing address in the error.
///
/// # Errors
///
/// When the address cannot be bound.
pub async fn socket_bind_anyhow(
    addr: std::net::SocketAddr,
) -> anyhow::Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|error| anyhow::anyhow!("failed to bind socket on addr: '{addr}': {error}"))
}
