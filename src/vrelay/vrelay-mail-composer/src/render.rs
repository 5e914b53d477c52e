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

use crate::message::{Body, Leaf, Mail};

impl Mail {
    /// Serialize the message to its on-wire form, CRLF line endings.
    #[must_use]
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = String::with_capacity(1024);

        for (name, value) in &self.headers {
            write_header(&mut out, name, value);
        }
        write_header(&mut out, "Content-Type", &self.body.content_type());
        if let Body::Leaf(leaf) = &self.body {
            write_header(
                &mut out,
                "Content-Transfer-Encoding",
                &leaf.transfer_encoding.to_string(),
            );
        }
        out.push_str("\r\n");

        match &self.body {
            Body::Leaf(leaf) => {
                out.push_str(&leaf.transfer_encoding.encode(&leaf.payload));
                out.push_str("\r\n");
            }
            Body::Branch { .. } => {
                out.push_str("This is a multi-part message in MIME format.\r\n");
                write_branch_parts(&mut out, &self.body);
            }
        }

        out.into_bytes()
    }
}

/// Write the parts of a branch between its boundaries. The branch's own
/// `Content-Type` has already been written by the caller.
fn write_branch_parts(out: &mut String, branch: &Body) {
    let Body::Branch { boundary, parts, .. } = branch else {
        return;
    };

    for part in parts {
        out.push_str(&format!("\r\n--{boundary}\r\n"));
        match part {
            Body::Leaf(leaf) => write_leaf(out, leaf),
            nested @ Body::Branch { .. } => {
                write_header(out, "Content-Type", &nested.content_type());
                out.push_str("\r\n");
                write_branch_parts(out, nested);
            }
        }
    }
    out.push_str(&format!("\r\n--{boundary}--\r\n"));
}

fn write_leaf(out: &mut String, leaf: &Leaf) {
    write_header(out, "Content-Type", &leaf.content_type);
    write_header(
        out,
        "Content-Transfer-Encoding",
        &leaf.transfer_encoding.to_string(),
    );
    if let Some(disposition) = &leaf.disposition {
        write_header(out, "Content-Disposition", disposition);
    }
    out.push_str("\r\n");
    out.push_str(&leaf.transfer_encoding.encode(&leaf.payload));
    out.push_str("\r\n");
}

fn write_header(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push_str(": ");
    out.push_str(value);
    out.push_str("\r\n");
}

#[cfg(test)]
mod tests {
    use crate::compose::{compose_with, Stamp};
    use vrelay_common::{addr, Attachment, Mailbox, Recipient, Transmission};

    fn stamp() -> Stamp {
        Stamp {
            message_id: "fixed-id@example.com".to_owned(),
            date: time::macros::datetime!(2023-04-01 12:00:00 UTC),
        }
    }

    fn transmission() -> Transmission {
        Transmission {
            sender: Mailbox::new(addr!("a@example.com")),
            recipients: vec![Recipient::new(Mailbox::new(addr!("b@example.com")))],
            subject: "Hi".to_owned(),
            text: Some("hello".to_owned()),
            html: None,
            headers: vec![],
            attachments: vec![],
        }
    }

    #[test]
    fn single_leaf_message_has_no_boundary() {
        let mail = compose_with(&transmission(), &stamp()).unwrap();
        let wire = String::from_utf8(mail.to_wire()).unwrap();

        assert!(wire.contains("From: a@example.com\r\n"));
        assert!(wire.contains("To: b@example.com\r\n"));
        assert!(wire.contains("Subject: Hi\r\n"));
        assert!(wire.contains("Content-Type: text/plain; charset=utf-8\r\n"));
        assert!(wire.contains("Content-Transfer-Encoding: 7bit\r\n"));
        assert!(wire.contains("\r\n\r\nhello\r\n"));
        assert!(!wire.contains("boundary"));
    }

    #[test]
    fn alternative_message_writes_both_parts() {
        let mut tx = transmission();
        tx.html = Some("<p>hello</p>".to_owned());
        let mail = compose_with(&tx, &stamp()).unwrap();
        let wire = String::from_utf8(mail.to_wire()).unwrap();

        assert!(wire.contains("Content-Type: multipart/alternative; boundary="));
        assert!(wire.contains("Content-Type: text/plain; charset=utf-8"));
        assert!(wire.contains("Content-Type: text/html; charset=utf-8"));
        // closing boundary
        assert!(wire.trim_end().ends_with("--"));
    }

    #[test]
    fn mixed_message_nests_the_alternative() {
        let mut tx = transmission();
        tx.html = Some("<p>hello</p>".to_owned());
        tx.attachments.push(Attachment {
            name: "doc.pdf".to_owned(),
            mime_type: "application/pdf".to_owned(),
            payload: b"%PDF".to_vec(),
        });
        let mail = compose_with(&tx, &stamp()).unwrap();
        let wire = String::from_utf8(mail.to_wire()).unwrap();

        assert!(wire.contains("Content-Type: multipart/mixed; boundary="));
        assert!(wire.contains("Content-Type: multipart/alternative; boundary="));
        assert!(wire.contains("Content-Disposition: attachment; filename=\"doc.pdf\""));
        assert!(wire.contains("Content-Transfer-Encoding: base64"));
    }

    #[test]
    fn wire_form_is_crlf_only() {
        let mail = compose_with(&transmission(), &stamp()).unwrap();
        let wire = String::from_utf8(mail.to_wire()).unwrap();
        let stripped = wire.replace("\r\n", "");
        assert!(!stripped.chars().any(|c| c == '\r' || c == '\n'));
    }

    #[test]
    fn multi_line_text_reaches_the_wire_without_bare_line_breaks() {
        let mut tx = transmission();
        tx.text = Some("line one\nline two\rline three".to_owned());
        let mail = compose_with(&tx, &stamp()).unwrap();
        let wire = String::from_utf8(mail.to_wire()).unwrap();

        assert!(wire.contains("line one\r\nline two\r\nline three"));
        let stripped = wire.replace("\r\n", "");
        assert!(!stripped.chars().any(|c| c == '\r' || c == '\n'));
    }
}
