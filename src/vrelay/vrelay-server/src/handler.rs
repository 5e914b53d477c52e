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

use crate::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use vrelay_api::ValidationError;
use vrelay_delivery::TransportError;
use vrelay_mail_composer::compose;

#[derive(serde::Serialize)]
pub(crate) struct HealthBody {
    name: String,
    version: &'static str,
}

/// Liveness probe, also answers `HEAD`.
pub(crate) async fn healthcheck(State(state): State<AppState>) -> Json<HealthBody> {
    Json(HealthBody {
        name: state.config.api.name.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(serde::Serialize)]
struct ResultsBody {
    results: TransmissionResults,
}

#[derive(serde::Serialize)]
struct TransmissionResults {
    id: String,
    total_accepted_recipients: usize,
    total_rejected_recipients: usize,
}

#[derive(serde::Serialize)]
struct ErrorsBody {
    errors: Vec<ErrorItem>,
}

#[derive(serde::Serialize)]
struct ErrorItem {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    code: &'static str,
}

const CODE_VALIDATION: &str = "validation";
const CODE_DEFECT: &str = "internal";
const CODE_TRANSIENT: &str = "transport_transient";
const CODE_PERMANENT: &str = "transport_permanent";

/// One transmission request, start to finish: parse, compose, relay.
///
/// Each stage short-circuits to its own status code, nothing is retried.
#[tracing::instrument(skip_all)]
pub(crate) async fn create_transmission(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let transmission = match state.parser.parse(&body, content_type) {
        Ok(transmission) => transmission,
        Err(error) => return rejected(&error),
    };

    let mail = match compose(&transmission) {
        Ok(mail) => mail,
        Err(error) => {
            tracing::error!(%error, "message composition failed");
            return failed(CODE_DEFECT, &error.to_string());
        }
    };
    let envelope = match vrelay_delivery::envelope(&transmission) {
        Ok(envelope) => envelope,
        Err(error) => {
            tracing::error!(%error, "envelope construction failed");
            return failed(CODE_DEFECT, "could not build the SMTP envelope");
        }
    };

    let id = mail
        .message_id()
        .unwrap_or_default()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .to_owned();

    match state.transport.send(&envelope, &mail.to_wire()).await {
        Ok(outcome) => {
            tracing::info!(
                id = %id,
                accepted = outcome.accepted,
                rejected = outcome.rejected,
                "transmission relayed"
            );
            (
                StatusCode::OK,
                Json(ResultsBody {
                    results: TransmissionResults {
                        id,
                        total_accepted_recipients: outcome.accepted,
                        total_rejected_recipients: outcome.rejected,
                    },
                }),
            )
                .into_response()
        }
        Err(error) => {
            tracing::warn!(
                %error,
                host = %state.config.smtp.host,
                retryable = error.is_retryable(),
                "delivery failed"
            );
            match error {
                TransportError::Transient(message) => {
                    status_with(StatusCode::BAD_GATEWAY, CODE_TRANSIENT, &message)
                }
                TransportError::Permanent(message) => failed(CODE_PERMANENT, &message),
            }
        }
    }
}

fn rejected(error: &ValidationError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorsBody {
            errors: error
                .errors
                .iter()
                .map(|field_error| ErrorItem {
                    message: field_error.message.clone(),
                    description: Some(field_error.field.clone()),
                    code: CODE_VALIDATION,
                })
                .collect(),
        }),
    )
        .into_response()
}

fn failed(code: &'static str, message: &str) -> Response {
    status_with(StatusCode::INTERNAL_SERVER_ERROR, code, message)
}

fn status_with(status: StatusCode, code: &'static str, message: &str) -> Response {
    (
        status,
        Json(ErrorsBody {
            errors: vec![ErrorItem {
                message: message.to_owned(),
                description: None,
                code,
            }],
        }),
    )
        .into_response()
}
