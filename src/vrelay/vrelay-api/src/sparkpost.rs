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

use crate::{FieldError, RequestParser, ValidationError};
use base64::Engine;
use vrelay_common::{Address, Attachment, Mailbox, Recipient, RecipientRole, Transmission};

/// Header names the gateway derives itself; supplying them as custom
/// headers would double-set or spoof the derived block.
const RESERVED_HEADERS: &[&str] = &[
    "from",
    "to",
    "bcc",
    "subject",
    "content-type",
    "content-transfer-encoding",
    "mime-version",
];

/// The SparkPost transmission-creation schema.
///
/// Blind and carbon copies follow the SparkPost convention: a recipient
/// whose `address.header_to` points at another address is not shown in
/// `To`; it becomes `Cc` when listed in the request's `cc` header and
/// `Bcc` otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparkPost;

// Unknown provider fields (`options`, `campaign_id`, ...) are accepted
// and ignored, only what can be relayed is decoded.
#[derive(Debug, serde::Deserialize)]
struct TransmissionDto {
    recipients: Option<Vec<RecipientDto>>,
    content: Option<ContentDto>,
}

#[derive(Debug, serde::Deserialize)]
struct RecipientDto {
    address: Option<AddressDto>,
    #[serde(default)]
    substitution_data: Option<serde_json::Map<String, serde_json::Value>>,
}

/// SparkPost allows both `"a@b.c"` and `{"email": ..., "name": ...}`.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum AddressDto {
    Email(String),
    Full {
        email: Option<String>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        header_to: Option<String>,
    },
}

#[derive(Debug, serde::Deserialize)]
struct ContentDto {
    from: Option<AddressDto>,
    subject: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    headers: Option<std::collections::BTreeMap<String, String>>,
    #[serde(default)]
    attachments: Option<Vec<AttachmentDto>>,
}

#[derive(Debug, serde::Deserialize)]
struct AttachmentDto {
    name: Option<String>,
    r#type: Option<String>,
    data: Option<String>,
}

impl RequestParser for SparkPost {
    fn parse(
        &self,
        body: &[u8],
        content_type: Option<&str>,
    ) -> Result<Transmission, ValidationError> {
        check_content_type(content_type)?;

        let mut deserializer = serde_json::Deserializer::from_slice(body);
        let dto: TransmissionDto = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|error| {
                ValidationError::single(error.path().to_string(), error.inner().to_string())
            })?;

        let mut errors = Vec::new();

        let content = match dto.content {
            Some(content) => content,
            None => {
                errors.push(FieldError::new("content", "field is required"));
                return Err(ValidationError { errors });
            }
        };

        let sender = parse_sender(content.from.as_ref(), &mut errors);
        let subject = match content.subject {
            Some(subject) => subject,
            None => {
                errors.push(FieldError::new("content.subject", "field is required"));
                String::new()
            }
        };
        if content.text.is_none() && content.html.is_none() {
            errors.push(FieldError::new(
                "content",
                "at least one of `text` or `html` is required",
            ));
        }

        let headers = parse_headers(content.headers, &mut errors);
        let cc_header = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("cc"))
            .map(|(_, value)| value.clone());

        let recipients = parse_recipients(dto.recipients, cc_header.as_deref(), &mut errors);
        let attachments = parse_attachments(content.attachments, &mut errors);

        // A missing sender always comes with a collected error.
        let sender = match sender {
            Some(sender) if errors.is_empty() => sender,
            _ => return Err(ValidationError { errors }),
        };

        // The `cc` header is consumed: the `Cc` header is re-derived from
        // the recipient roles by the composer.
        let headers = headers
            .into_iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("cc"))
            .collect();

        Ok(Transmission {
            sender,
            recipients,
            subject,
            text: content.text,
            html: content.html,
            headers,
            attachments,
        })
    }
}

fn check_content_type(content_type: Option<&str>) -> Result<(), ValidationError> {
    let declared = content_type.unwrap_or_default();
    let essence = declared.split(';').next().unwrap_or_default().trim();
    if essence.eq_ignore_ascii_case("application/json") {
        Ok(())
    } else {
        Err(ValidationError::single(
            "content-type",
            format!("expected 'application/json', got '{declared}'"),
        ))
    }
}

fn parse_sender(from: Option<&AddressDto>, errors: &mut Vec<FieldError>) -> Option<Mailbox> {
    let Some(from) = from else {
        errors.push(FieldError::new("content.from", "field is required"));
        return None;
    };
    match parse_mailbox(from) {
        Ok((mailbox, _header_to)) => Some(mailbox),
        Err(message) => {
            errors.push(FieldError::new("content.from", message));
            None
        }
    }
}

/// Decode one address DTO into a mailbox plus its `header_to` marker.
fn parse_mailbox(dto: &AddressDto) -> Result<(Mailbox, Option<String>), String> {
    let (email, name, header_to) = match dto {
        AddressDto::Email(email) => (Some(email.as_str()), None, None),
        AddressDto::Full {
            email,
            name,
            header_to,
        } => (email.as_deref(), name.clone(), header_to.clone()),
    };

    let Some(email) = email else {
        return Err("`email` is required".to_owned());
    };
    let address = email
        .parse::<Address>()
        .map_err(|error| error.to_string())?;

    let mailbox = match name {
        Some(name) => Mailbox::with_name(name, address),
        None => Mailbox::new(address),
    };
    Ok((mailbox, header_to))
}

fn parse_recipients(
    recipients: Option<Vec<RecipientDto>>,
    cc_header: Option<&str>,
    errors: &mut Vec<FieldError>,
) -> Vec<Recipient> {
    let Some(recipients) = recipients else {
        errors.push(FieldError::new("recipients", "field is required"));
        return Vec::new();
    };
    if recipients.is_empty() {
        errors.push(FieldError::new("recipients", "must not be empty"));
        return Vec::new();
    }

    let mut parsed = Vec::with_capacity(recipients.len());
    for (index, dto) in recipients.into_iter().enumerate() {
        let field = format!("recipients[{index}].address");
        let Some(address) = dto.address else {
            errors.push(FieldError::new(field, "field is required"));
            continue;
        };
        match parse_mailbox(&address) {
            Ok((mailbox, header_to)) => {
                let role = recipient_role(&mailbox, header_to.as_deref(), cc_header);
                parsed.push(Recipient {
                    mailbox,
                    role,
                    substitution_data: dto.substitution_data,
                });
            }
            Err(message) => errors.push(FieldError::new(field, message)),
        }
    }
    parsed
}

/// SparkPost convention: `header_to` set to another address hides the
/// recipient from `To`; the request's `cc` header decides Cc vs Bcc.
fn recipient_role(
    mailbox: &Mailbox,
    header_to: Option<&str>,
    cc_header: Option<&str>,
) -> RecipientRole {
    match header_to {
        Some(target) if !target.eq_ignore_ascii_case(mailbox.address.full()) => {
            let email = mailbox.address.full();
            let listed_as_cc = cc_header.is_some_and(|cc| {
                cc.split(',')
                    .any(|entry| addr_spec_of(entry).eq_ignore_ascii_case(email))
            });
            if listed_as_cc {
                RecipientRole::Cc
            } else {
                RecipientRole::Bcc
            }
        }
        _ => RecipientRole::To,
    }
}

/// The addr-spec of one header list entry, whole address only: either the
/// part between angle brackets or the trimmed entry itself.
fn addr_spec_of(entry: &str) -> &str {
    let entry = entry.trim();
    match (entry.find('<'), entry.rfind('>')) {
        (Some(open), Some(close)) if open < close => &entry[open + 1..close],
        _ => entry,
    }
}

/// Case-insensitive last-write-wins dedup, reserved names rejected.
fn parse_headers(
    headers: Option<std::collections::BTreeMap<String, String>>,
    errors: &mut Vec<FieldError>,
) -> Vec<(String, String)> {
    let mut parsed: Vec<(String, String)> = Vec::new();
    for (name, value) in headers.unwrap_or_default() {
        if RESERVED_HEADERS
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(&name))
        {
            errors.push(FieldError::new(
                format!("content.headers.{name}"),
                "header is derived by the gateway and cannot be supplied",
            ));
            continue;
        }
        if let Some(existing) = parsed
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            existing.1 = value;
        } else {
            parsed.push((name, value));
        }
    }
    parsed
}

fn parse_attachments(
    attachments: Option<Vec<AttachmentDto>>,
    errors: &mut Vec<FieldError>,
) -> Vec<Attachment> {
    let mut parsed = Vec::new();
    for (index, dto) in attachments.unwrap_or_default().into_iter().enumerate() {
        let field = |leaf: &str| format!("content.attachments[{index}].{leaf}");

        let name = match dto.name {
            Some(name) if !name.is_empty() => Some(name),
            _ => {
                errors.push(FieldError::new(field("name"), "field is required"));
                None
            }
        };
        let mime_type = match dto.r#type {
            Some(mime_type) => Some(mime_type),
            None => {
                errors.push(FieldError::new(field("type"), "field is required"));
                None
            }
        };
        let payload = match dto.data {
            Some(data) => match base64::engine::general_purpose::STANDARD.decode(data) {
                Ok(payload) => Some(payload),
                Err(error) => {
                    errors.push(FieldError::new(
                        field("data"),
                        format!("invalid base64 payload: {error}"),
                    ));
                    None
                }
            },
            None => {
                errors.push(FieldError::new(field("data"), "field is required"));
                None
            }
        };

        if let (Some(name), Some(mime_type), Some(payload)) = (name, mime_type, payload) {
            parsed.push(Attachment {
                name,
                mime_type,
                payload,
            });
        }
    }
    parsed
}
