//! Tolerant extraction from backend response bodies.
//!
//! The backend has shipped two envelope shapes, `{status, msg, data}` and
//! `{success, data, message}`, and nests the identity object inconsistently.
//! Rather than probing ad hoc at every call site, each extractor runs an
//! ordered list of probes and stops at the first hit.

use serde_json::Value;

use crate::User;

type Probe = fn(&Value) -> Option<&Value>;

/// Identity probes, most-specific first. A candidate only counts if it carries
/// an `id` field.
const USER_PROBES: &[Probe] = &[
    |v| v.get("data").and_then(|d| d.get("user")),
    |v| v.get("user"),
    |v| v.get("data"),
];

const TOKEN_PROBES: &[Probe] = &[
    |v| v.get("token"),
    |v| v.get("data").and_then(|d| d.get("token")),
];

const MESSAGE_PROBES: &[Probe] = &[
    |v| v.get("msg"),
    |v| v.get("message"),
    |v| v.get("data").and_then(|d| d.get("message")),
];

pub fn extract_user(body: &Value) -> Option<User> {
    for probe in USER_PROBES {
        let Some(candidate) = probe(body) else {
            continue;
        };

        if candidate.get("id").is_none() {
            continue;
        }

        match serde_json::from_value(candidate.clone()) {
            Ok(user) => return Some(user),
            Err(_) => continue,
        }
    }

    None
}

pub fn extract_token(body: &Value) -> Option<String> {
    for probe in TOKEN_PROBES {
        if let Some(token) = probe(body).and_then(Value::as_str) {
            if !token.is_empty() {
                return Some(token.to_owned());
            }
        }
    }

    None
}

pub fn extract_message(body: &Value) -> Option<String> {
    for probe in MESSAGE_PROBES {
        if let Some(msg) = probe(body).and_then(Value::as_str) {
            if !msg.is_empty() {
                return Some(msg.to_owned());
            }
        }
    }

    None
}
