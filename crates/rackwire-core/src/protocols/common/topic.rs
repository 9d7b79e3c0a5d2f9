use crate::protocols::error::ParseError;

/// The three segments of a device topic: `{namespace}/{device_id}/{message_class}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicParts<'a> {
    pub namespace: &'a str,
    pub device_id: &'a str,
    pub message_class: &'a str,
}

impl<'a> TopicParts<'a> {
    pub fn parse(topic: &'a str) -> Result<Self, ParseError> {
        let mut segments = topic.split('/');
        let parts = match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(namespace), Some(device_id), Some(message_class), None) => Self {
                namespace,
                device_id,
                message_class,
            },
            _ => {
                return Err(ParseError::InvalidTopic {
                    topic: topic.to_string(),
                });
            }
        };
        if parts.namespace.is_empty() || parts.device_id.is_empty() || parts.message_class.is_empty()
        {
            return Err(ParseError::InvalidTopic {
                topic: topic.to_string(),
            });
        }
        Ok(parts)
    }
}

/// Namespace ownership check shared by every parser.
pub fn topic_in_namespace(topic: &str, namespace: &str) -> bool {
    topic
        .strip_prefix(namespace)
        .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::{TopicParts, topic_in_namespace};

    #[test]
    fn splits_three_segments() {
        let parts = TopicParts::parse("V5008Upload/2437871205/LabelState").unwrap();
        assert_eq!(parts.namespace, "V5008Upload");
        assert_eq!(parts.device_id, "2437871205");
        assert_eq!(parts.message_class, "LabelState");
    }

    #[test]
    fn rejects_wrong_shapes() {
        for topic in [
            "V5008Upload/2437871205",
            "V5008Upload/2437871205/LabelState/extra",
            "V5008Upload//LabelState",
            "",
        ] {
            let err = TopicParts::parse(topic).unwrap_err();
            assert!(err.to_string().contains("invalid topic"), "{topic}");
        }
    }

    #[test]
    fn namespace_match_requires_separator() {
        assert!(topic_in_namespace("V5008Upload/1/TemHum", "V5008Upload"));
        assert!(!topic_in_namespace("V5008UploadX/1/TemHum", "V5008Upload"));
        assert!(!topic_in_namespace("V6800Upload/1/TemHum", "V5008Upload"));
    }
}
