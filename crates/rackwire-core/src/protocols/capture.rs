//! Placeholder parser for device families without a documented layout.
//!
//! It claims its namespaces so their traffic is not reported as unroutable,
//! validates the topic shape and keeps the payload as-is: parsed JSON when
//! the payload is JSON, otherwise the text as a JSON string. It reports
//! `ParserKind::Capture` so callers can tell it apart from real decoders.

use serde_json::Value;
use tracing::debug;

use super::common::{TopicParts, topic_in_namespace};
use super::error::ParseError;
use super::message::{DeviceFamily, MessageBody, ParsedMessage, RawMessage};
use super::router::{ParserKind, ProtocolParser};

pub const DEFAULT_NAMESPACE: &str = "G6000Upload";

#[derive(Debug, Clone)]
pub struct CaptureParser {
    namespaces: Vec<String>,
}

impl CaptureParser {
    pub fn new<I, S>(namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            namespaces: namespaces.into_iter().map(Into::into).collect(),
        }
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }
}

impl Default for CaptureParser {
    fn default() -> Self {
        Self::new([DEFAULT_NAMESPACE])
    }
}

impl ProtocolParser for CaptureParser {
    fn name(&self) -> &'static str {
        "capture"
    }

    fn family(&self) -> DeviceFamily {
        DeviceFamily::Generic
    }

    fn kind(&self) -> ParserKind {
        ParserKind::Capture
    }

    fn can_handle(&self, topic: &str) -> bool {
        self.namespaces
            .iter()
            .any(|namespace| topic_in_namespace(topic, namespace))
    }

    fn parse(&self, raw: &RawMessage) -> Result<ParsedMessage, ParseError> {
        let parts = TopicParts::parse(&raw.topic)?;
        let payload = serde_json::from_slice::<Value>(&raw.payload).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&raw.payload).into_owned())
        });
        debug!(
            namespace = parts.namespace,
            device_id = parts.device_id,
            "captured payload without a decoder"
        );
        Ok(ParsedMessage::new(
            parts,
            DeviceFamily::Generic,
            "capture",
            MessageBody::Capture { payload },
            raw,
        ))
    }
}
