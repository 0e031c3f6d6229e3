//! Wire contract with the controller.
//!
//! Outbound traffic is an [`Envelope`] whose `message` is itself JSON text.
//! Some payload fields (`relatedFiles`, `data`, `path`) are JSON text once
//! more; the controller decodes each level separately.

use overlay::{BoxModelSnapshot, PathEntry, RuleInfo};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::error::ProtocolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeType {
    Livedata,
    Message,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: EnvelopeType,
    pub message: String,
}

impl Envelope {
    pub fn livedata<T: Serialize>(payload: &T) -> Result<Self, ProtocolError> {
        let message = serde_json::to_string(payload).map_err(ProtocolError::Encode)?;
        Ok(Self {
            kind: EnvelopeType::Livedata,
            message,
        })
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self {
            kind: EnvelopeType::Message,
            message: text.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Decode `message` back into a JSON value.
    pub fn payload(&self) -> Result<Value, ProtocolError> {
        serde_json::from_str(&self.message).map_err(ProtocolError::Parse)
    }
}

fn as_json_text<T: Serialize, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    let text = serde_json::to_string(value).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&text)
}

/// `{relatedFiles, source}`: files the page depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceList {
    #[serde(serialize_with = "as_json_text")]
    pub related_files: Vec<String>,
    pub source: String,
}

/// `{data, path, boxmodel, refresh}`: everything the inspector shows for one
/// element.
#[derive(Debug, Clone, Serialize)]
pub struct InspectionData {
    #[serde(serialize_with = "as_json_text")]
    pub data: Vec<RuleInfo>,
    #[serde(serialize_with = "as_json_text")]
    pub path: Vec<PathEntry>,
    pub boxmodel: BoxModelSnapshot,
    pub refresh: bool,
}

/// `{path, boxmodel, livedataRefresh: true}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxModelRefresh {
    #[serde(serialize_with = "as_json_text")]
    pub path: Vec<PathEntry>,
    pub boxmodel: BoxModelSnapshot,
    pub livedata_refresh: bool,
}

/// What an inbound message asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    ResourceDataRefresh,
    LiveDataRefresh,
    Inspect,
    /// Anything else; closes the inspect pane.
    Other,
}

/// JavaScript truthiness of a decoded field.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

impl Inbound {
    /// Classify a message. Flags are checked in priority order.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text).map_err(ProtocolError::Parse)?;
        let inbound = if truthy(value.get("resourcedataRefresh")) {
            Inbound::ResourceDataRefresh
        } else if truthy(value.get("livedataRefresh")) {
            Inbound::LiveDataRefresh
        } else if truthy(value.get("inspect")) {
            Inbound::Inspect
        } else {
            Inbound::Other
        };
        debug!(?inbound, "inbound message");
        Ok(inbound)
    }
}
