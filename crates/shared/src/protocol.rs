use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CERTIDAO_ROUTE: &str = "/api/certidao";

/// Key that namespaces the record in request bodies.
pub const ENVELOPE_KEY: &str = "certidao";

/// Flat record shape expected by the spreadsheet script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertidaoRecord {
    #[serde(rename = "empresa")]
    pub company: String,
    #[serde(rename = "cnpj")]
    pub tax_id: String,
    /// Notification addresses joined with `", "`.
    pub email: String,
    #[serde(rename = "tipoDocumento")]
    pub document_type: String,
    #[serde(rename = "orgao")]
    pub issuing_body: String,
    #[serde(rename = "dataEmissao")]
    pub issued_on: String,
    #[serde(rename = "fimVigencia")]
    pub valid_until: String,
    #[serde(rename = "statusNovoVenc")]
    pub status_note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertidaoEnvelope {
    pub certidao: CertidaoRecord,
}

/// Envelope the relay writes when it answers on its own behalf.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Stand-in for a downstream body that is not JSON.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            raw: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Mirrors how the browser side and the spreadsheet script evaluate loose JSON flags.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// First truthy field among `keys`, rendered as text.
pub fn first_truthy_text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find(|field| is_truthy(field))
        .map(|field| match field {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
