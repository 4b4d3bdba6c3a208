//! Stateless mail-sending wrapper over the SendGrid v3 HTTP API.
//!
//! Validates the recipient sets, builds the provider payload, and performs a
//! single POST. No retry; the caller decides whether to try again.

use crate::error::{Error, Result};
use crate::settings::MailSettings;
use serde_json::{json, Value};
use std::collections::HashSet;

/// Provider batch limit on the combined to/cc/bcc count.
pub const MAX_RECIPIENTS: usize = 990;

#[derive(Debug, Clone, Default)]
pub struct Message {
    pub subject: String,
    pub body: String,
    pub from_email: String,
    pub from_name: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
}

/// Lowercased, order-preserving dedupe of the `to` set. Runs before the
/// recipient count and before the payload is built, so a repeated address
/// neither inflates the count nor reaches the provider twice.
fn normalized_to(to: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    to.iter()
        .map(|e| e.to_lowercase())
        .filter(|e| seen.insert(e.clone()))
        .collect()
}

/// Recipient-set checks, run before any network traffic.
pub fn validate(msg: &Message) -> Result<()> {
    let to = normalized_to(&msg.to);
    let total = to.len() + msg.cc.len() + msg.bcc.len();
    if total > MAX_RECIPIENTS {
        return Err(Error::TooManyRecipients(total));
    }

    let to_set: HashSet<&str> = to.iter().map(|e| e.as_str()).collect();
    for email in msg.cc.iter().chain(msg.bcc.iter()) {
        if to_set.contains(email.to_lowercase().as_str()) {
            return Err(Error::DuplicateRecipient(email.clone()));
        }
    }
    Ok(())
}

fn email_list(emails: &[String]) -> Value {
    Value::Array(
        emails
            .iter()
            .map(|e| json!({ "email": e }))
            .collect::<Vec<_>>(),
    )
}

/// SendGrid v3 request body:
/// `personalizations[].to/cc/bcc`, `from.email`/`from.name`,
/// `content[].type/value`. cc/bcc are omitted entirely when empty.
pub fn build_payload(msg: &Message) -> Value {
    let mut personalization = json!({
        "to": email_list(&normalized_to(&msg.to)),
        "subject": msg.subject,
    });
    if !msg.cc.is_empty() {
        personalization["cc"] = email_list(&msg.cc);
    }
    if !msg.bcc.is_empty() {
        personalization["bcc"] = email_list(&msg.bcc);
    }

    json!({
        "personalizations": [personalization],
        "from": {
            "email": msg.from_email,
            "name": msg.from_name,
        },
        "content": [
            {
                "type": "text/plain",
                "value": msg.body,
            }
        ],
    })
}

/// Validate, build the payload, POST it once. Any non-2xx response or
/// transport failure surfaces as `Error::Mail` with the status and body.
pub fn send(settings: &MailSettings, msg: &Message) -> Result<()> {
    validate(msg)?;
    let payload = build_payload(msg);

    let client = reqwest::blocking::Client::new();
    let response = client
        .post(&settings.api_url)
        .bearer_auth(&settings.api_key)
        .json(&payload)
        .send()
        .map_err(|e| Error::Mail {
            status: 0,
            body: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(Error::Mail {
            status: status.as_u16(),
            body,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> Message {
        Message {
            subject: "weekly report".to_string(),
            body: "all green".to_string(),
            from_email: "admin@example.com".to_string(),
            from_name: "Site Admin".to_string(),
            to: vec!["a@example.com".to_string()],
            ..Message::default()
        }
    }

    #[test]
    fn too_many_recipients_fails_before_send() {
        let mut msg = message();
        msg.to = (0..1000).map(|i| format!("user{}@example.com", i)).collect();
        let err = validate(&msg).unwrap_err();
        assert!(matches!(err, Error::TooManyRecipients(1000)));
    }

    #[test]
    fn exactly_at_limit_is_allowed() {
        let mut msg = message();
        msg.to = (0..MAX_RECIPIENTS)
            .map(|i| format!("user{}@example.com", i))
            .collect();
        assert!(validate(&msg).is_ok());
    }

    #[test]
    fn duplicate_to_entries_collapse() {
        let mut msg = message();
        msg.to = vec!["A@Example.com".to_string(), "a@example.com".to_string()];
        assert!(validate(&msg).is_ok());

        let payload = build_payload(&msg);
        let to = payload["personalizations"][0]["to"].as_array().unwrap();
        assert_eq!(to.len(), 1);
        assert_eq!(to[0]["email"], "a@example.com");
    }

    #[test]
    fn repeated_to_address_does_not_inflate_the_count() {
        let mut msg = message();
        // 991 entries, but only 990 distinct addresses
        msg.to = (0..MAX_RECIPIENTS)
            .map(|i| format!("user{}@example.com", i))
            .collect();
        msg.to.push("USER0@example.com".to_string());
        assert!(validate(&msg).is_ok());
    }

    #[test]
    fn duplicate_between_to_and_cc_fails() {
        let mut msg = message();
        msg.cc = vec!["A@Example.com".to_string()];
        let err = validate(&msg).unwrap_err();
        assert!(matches!(err, Error::DuplicateRecipient(_)));
    }

    #[test]
    fn duplicate_between_to_and_bcc_fails() {
        let mut msg = message();
        msg.bcc = vec!["a@example.com".to_string()];
        assert!(matches!(
            validate(&msg).unwrap_err(),
            Error::DuplicateRecipient(_)
        ));
    }

    #[test]
    fn payload_shape() {
        let mut msg = message();
        msg.cc = vec!["c@example.com".to_string()];
        let payload = build_payload(&msg);

        assert_eq!(
            payload["personalizations"][0]["to"][0]["email"],
            "a@example.com"
        );
        assert_eq!(
            payload["personalizations"][0]["cc"][0]["email"],
            "c@example.com"
        );
        // no bcc key when the set is empty
        assert!(payload["personalizations"][0].get("bcc").is_none());
        assert_eq!(payload["from"]["email"], "admin@example.com");
        assert_eq!(payload["from"]["name"], "Site Admin");
        assert_eq!(payload["content"][0]["type"], "text/plain");
        assert_eq!(payload["content"][0]["value"], "all green");
    }
}
