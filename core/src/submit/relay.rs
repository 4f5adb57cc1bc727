//! Form relay transport.
//!
//! Isolated from the submission flow so network concerns stay in one place.
//! The relay call is blocking; the controller runs it on the runtime's
//! blocking pool.

use serde::Serialize;

use super::{FormSubmission, SubmitError};

const USER_AGENT: &str = "Sparkwave-Site-Contact-Form";

/// JSON body posted to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayPayload {
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(rename = "_subject")]
    pub subject: String,
}

impl From<&FormSubmission> for RelayPayload {
    fn from(form: &FormSubmission) -> Self {
        Self {
            name: form.name.clone(),
            email: form.email.clone(),
            message: form.message.clone(),
            subject: format!("New contact form submission from {}", form.name),
        }
    }
}

/// Status line and body of a relay response, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl RelayResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `error` field of a JSON body, else `HTTP <status>: <text>`.
    #[must_use]
    pub fn error_message(&self) -> String {
        serde_json::from_str::<serde_json::Value>(&self.body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP {}: {}", self.status, self.status_text))
    }
}

/// Sends one submission. Returns any response the server gave; `Err` only when none was obtained.
pub trait FormRelay: Send + Sync {
    fn post(&self, url: &str, payload: &RelayPayload) -> Result<RelayResponse, SubmitError>;
}

/// [`FormRelay`] over `ureq`.
pub struct UreqRelay {
    agent: ureq::Agent,
}

impl UreqRelay {
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().user_agent(USER_AGENT).build(),
        }
    }
}

impl Default for UreqRelay {
    fn default() -> Self {
        Self::new()
    }
}

fn read_response(resp: ureq::Response) -> RelayResponse {
    let status = resp.status();
    let status_text = resp.status_text().to_string();
    let body = resp.into_string().unwrap_or_else(|e| {
        log::debug!("Relay response body unreadable: {}", e);
        String::new()
    });
    RelayResponse {
        status,
        status_text,
        body,
    }
}

impl FormRelay for UreqRelay {
    fn post(&self, url: &str, payload: &RelayPayload) -> Result<RelayResponse, SubmitError> {
        match self
            .agent
            .post(url)
            .set("Content-Type", "application/json")
            .set("Accept", "application/json")
            .send_json(payload)
        {
            Ok(resp) => Ok(read_response(resp)),
            Err(ureq::Error::Status(_, resp)) => Ok(read_response(resp)),
            Err(ureq::Error::Transport(t)) => Err(SubmitError::Transport(t.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, status_text: &str, body: &str) -> RelayResponse {
        RelayResponse {
            status,
            status_text: status_text.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn payload_adds_subject_line() {
        let form = FormSubmission {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "Hello".to_string(),
        };
        let json = serde_json::to_value(RelayPayload::from(&form)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Ada",
                "email": "ada@example.com",
                "message": "Hello",
                "_subject": "New contact form submission from Ada"
            })
        );
    }

    #[test]
    fn ok_range_is_success() {
        assert!(response(200, "OK", "").is_success());
        assert!(response(204, "No Content", "").is_success());
        assert!(!response(302, "Found", "").is_success());
        assert!(!response(422, "Unprocessable Entity", "").is_success());
    }

    #[test]
    fn error_message_prefers_body_error_field() {
        let r = response(422, "Unprocessable Entity", r#"{"error":"Invalid email"}"#);
        assert_eq!(r.error_message(), "Invalid email");
    }

    #[test]
    fn error_message_falls_back_to_status() {
        assert_eq!(
            response(500, "Internal Server Error", "<html>oops</html>").error_message(),
            "HTTP 500: Internal Server Error"
        );
        assert_eq!(
            response(400, "Bad Request", r#"{"errors":[]}"#).error_message(),
            "HTTP 400: Bad Request"
        );
    }
}
