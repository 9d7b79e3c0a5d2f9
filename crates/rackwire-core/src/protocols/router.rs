use thiserror::Error;
use tracing::debug;

use crate::config::PipelineConfig;

use super::capture::CaptureParser;
use super::error::ParseError;
use super::message::{DeviceFamily, ParsedMessage, RawMessage};
use super::v5008::V5008Parser;
use super::v6800::V6800Parser;

/// Whether a parser decodes a documented layout or only captures payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserKind {
    Specified,
    Capture,
}

/// A device family parser: owns a set of topics and decodes their payloads.
pub trait ProtocolParser: Send + Sync {
    fn name(&self) -> &'static str;

    fn family(&self) -> DeviceFamily;

    fn kind(&self) -> ParserKind {
        ParserKind::Specified
    }

    fn can_handle(&self, topic: &str) -> bool;

    fn parse(&self, raw: &RawMessage) -> Result<ParsedMessage, ParseError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("no parser owns topic '{topic}'")]
    Unroutable { topic: String },
}

/// Ordered parser list; the first parser that owns a topic wins.
pub struct ParserRouter {
    parsers: Vec<Box<dyn ProtocolParser>>,
}

impl ParserRouter {
    pub fn new(parsers: Vec<Box<dyn ProtocolParser>>) -> Self {
        Self { parsers }
    }

    /// V5008, V6800, then a capture parser for `G6000Upload`.
    pub fn with_defaults() -> Self {
        Self::from_config(&PipelineConfig::default())
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut parsers: Vec<Box<dyn ProtocolParser>> = vec![
            Box::new(V5008Parser::with_namespace(&config.v5008_namespace)),
            Box::new(V6800Parser::with_namespace(&config.v6800_namespace)),
        ];
        if !config.capture_namespaces.is_empty() {
            parsers.push(Box::new(CaptureParser::new(
                config.capture_namespaces.iter().cloned(),
            )));
        }
        Self::new(parsers)
    }

    pub fn route(&self, topic: &str) -> Result<&dyn ProtocolParser, RouteError> {
        let parser = self
            .parsers
            .iter()
            .find(|parser| parser.can_handle(topic))
            .ok_or_else(|| RouteError::Unroutable {
                topic: topic.to_string(),
            })?;
        debug!(topic, parser = parser.name(), "routed message");
        Ok(parser.as_ref())
    }

    pub fn parsers(&self) -> impl Iterator<Item = &dyn ProtocolParser> {
        self.parsers.iter().map(|parser| parser.as_ref())
    }
}

impl Default for ParserRouter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::{ParserKind, ParserRouter, RouteError};
    use crate::config::PipelineConfig;
    use crate::protocols::message::DeviceFamily;

    #[test]
    fn routes_by_namespace_in_registration_order() {
        let router = ParserRouter::with_defaults();
        assert_eq!(router.route("V5008Upload/1/TemHum").unwrap().name(), "v5008");
        assert_eq!(router.route("V6800Upload/1/Init").unwrap().name(), "v6800");
        let capture = router.route("G6000Upload/1/Any").unwrap();
        assert_eq!(capture.family(), DeviceFamily::Generic);
        assert_eq!(capture.kind(), ParserKind::Capture);
        let names: Vec<&str> = router.parsers().map(|p| p.name()).collect();
        assert_eq!(names, vec!["v5008", "v6800", "capture"]);
    }

    #[test]
    fn unknown_namespace_is_unroutable() {
        let router = ParserRouter::with_defaults();
        let err = router.route("X9000Upload/1/Any").err().unwrap();
        assert_eq!(
            err,
            RouteError::Unroutable {
                topic: "X9000Upload/1/Any".to_string()
            }
        );
        assert!(router.route("V5008UploadExtra/1/TemHum").is_err());
    }

    #[test]
    fn configured_namespaces_replace_defaults() {
        let config = PipelineConfig {
            v5008_namespace: "LabV5008".to_string(),
            capture_namespaces: Vec::new(),
            ..PipelineConfig::default()
        };
        let router = ParserRouter::from_config(&config);
        assert!(router.route("LabV5008/1/TemHum").is_ok());
        assert!(router.route("V5008Upload/1/TemHum").is_err());
        assert!(router.route("G6000Upload/1/Any").is_err());
    }
}
