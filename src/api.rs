use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::PersonRecord;

/// Transport and contract failures from the backend. Wrapped into
/// descriptive variants at this boundary; callers decide how to surface
/// them. No automatic retries.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("backend error: {0}")]
    Backend(String),
    #[error("malformed response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonSummary {
    #[serde(alias = "personId", alias = "person_id")]
    pub id: String,
    #[serde(alias = "fullName", default)]
    pub full_name: String,
    #[serde(
        alias = "generation_number",
        alias = "generation_level",
        default
    )]
    pub generation: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AncestorsResponse {
    pub person: PersonRecord,
    #[serde(alias = "ancestorsChain", default)]
    pub ancestors_chain: Vec<PersonRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub requester_name: String,
    pub requester_email: String,
    pub message: String,
    pub person_id: String,
    pub person_name: String,
}

pub struct ApiClient {
    base: String,
    http: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            http: reqwest::blocking::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<PersonSummary>, ApiError> {
        let response = self
            .http
            .get(self.url("/api/search"))
            .query(&[("q", query), ("limit", &limit.to_string())])
            .send()?;
        decode(response)
    }

    pub fn person(&self, id: &str) -> Result<PersonRecord, ApiError> {
        let response = self.http.get(self.url(&format!("/api/person/{id}"))).send()?;
        decode(response)
    }

    pub fn ancestors(&self, id: &str) -> Result<AncestorsResponse, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("/api/ancestors/{id}")))
            .send()?;
        decode(response)
    }

    /// Partial update: only the supplied fields change.
    pub fn update_person(&self, id: &str, fields: &Value) -> Result<(), ApiError> {
        let response = self
            .http
            .put(self.url(&format!("/api/person/{id}")))
            .json(fields)
            .send()?;
        let _: Value = decode(response)?;
        Ok(())
    }

    /// Returns the backend's confirmation message.
    pub fn delete_person(&self, id: &str, password: &str) -> Result<String, ApiError> {
        let response = self
            .http
            .delete(self.url(&format!("/api/person/{id}")))
            .json(&serde_json::json!({ "password": password }))
            .send()?;
        let value: Value = decode(response)?;
        Ok(value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    pub fn verify_password(&self, password: &str, action: &str) -> Result<bool, ApiError> {
        let response = self
            .http
            .post(self.url("/api/admin/verify-password"))
            .json(&serde_json::json!({ "password": password, "action": action }))
            .send()?;
        let value: Value = decode(response)?;
        Ok(value
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }

    pub fn send_edit_request(&self, request: &EditRequest) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url("/api/send-edit-request-email"))
            .json(request)
            .send()?;
        let _: Value = decode(response)?;
        Ok(())
    }

    /// Full export: one search sweep, then a record fetch per hit. The
    /// backend has no bulk endpoint, so this is the contract-shaped way to
    /// feed the tree pipeline from the API.
    pub fn fetch_all_records(&self, limit: usize) -> Result<Vec<PersonRecord>, ApiError> {
        let summaries = self.search("", limit)?;
        let mut records = Vec::with_capacity(summaries.len());
        for summary in summaries {
            records.push(self.person(&summary.id)?);
        }
        Ok(records)
    }
}

/// Status check + `{error}` envelope check + typed decode, in that order,
/// so the caller always gets the most specific failure available.
fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::blocking::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: truncate(&body),
        });
    }
    let value: Value =
        serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return Err(ApiError::Backend(error.to_string()));
    }
    serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
}

fn truncate(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &body[..end])
    }
}
