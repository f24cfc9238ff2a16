//! Labeled text framing for Base64 key bodies.
//!
//! Framing is `-----BEGIN <label>-----\n<body>\n-----END <label>-----`.
//! Extraction tolerates arbitrary line wrapping of the body and ignores
//! anything outside the first matching BEGIN/END span.

use crate::errors::KsError;
use std::fmt;

pub const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";
pub const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";

/// A label plus its Base64 body.
///
/// Debug output omits the body, which may hold private key material.
#[derive(Clone, PartialEq, Eq)]
pub struct PemBlock {
    pub label: String,
    pub body: String,
}

impl fmt::Debug for PemBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PemBlock")
            .field("label", &self.label)
            .field("body_len", &self.body.len())
            .finish()
    }
}

impl fmt::Display for PemBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "-----BEGIN {label}-----\n{body}\n-----END {label}-----",
            label = self.label,
            body = self.body
        )
    }
}

impl PemBlock {
    pub fn new(label: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            body: body.into(),
        }
    }

    /// Extract the block labeled `label` from `text`.
    ///
    /// Lines are scanned in order. The line containing `BEGIN <label>` opens
    /// capture and is not itself captured; the line containing `END <label>`
    /// closes it and ends the scan. Captured lines are trimmed and joined with
    /// no separator.
    pub fn extract(text: &str, label: &str) -> Result<Self, KsError> {
        let begin_marker = format!("BEGIN {label}");
        let end_marker = format!("END {label}");

        let mut capturing = false;
        let mut closed = false;
        let mut body = String::new();

        for line in text.lines() {
            if capturing {
                if line.contains(&end_marker) {
                    closed = true;
                    break;
                }
                body.push_str(line.trim());
            } else if line.contains(&begin_marker) {
                capturing = true;
            }
        }

        if !capturing {
            return Err(KsError::KeyFormat(format!(
                "Missing '-----BEGIN {label}-----' marker"
            )));
        }
        if !closed {
            return Err(KsError::KeyFormat(format!(
                "Missing '-----END {label}-----' marker"
            )));
        }
        if body.is_empty() {
            return Err(KsError::KeyFormat(format!("Empty {label} block")));
        }

        Ok(Self {
            label: label.to_string(),
            body,
        })
    }
}
