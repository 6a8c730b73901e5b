use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A typed unit of message content.
///
/// Only `text` blocks are understood. Every other block kind (tool use,
/// images, thinking, kinds the service adds later) decodes into
/// [`ContentBlock::Other`] with its raw JSON kept intact, so it can be
/// replayed to the service on the next request without ever being rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text { text: String },
    Other(Value),
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Classifies a raw block. Anything that is not a well-formed `text`
    /// block lands in `Other`.
    pub fn from_value(raw: Value) -> Self {
        let is_text = raw.get("type").and_then(Value::as_str) == Some("text");
        match raw.get("text").and_then(Value::as_str) {
            Some(text) if is_text => Self::Text {
                text: text.to_string(),
            },
            _ => Self::Other(raw),
        }
    }

    /// The block's type tag, `"unknown"` when the raw block carries none.
    pub fn kind(&self) -> &str {
        match self {
            Self::Text { .. } => "text",
            Self::Other(raw) => raw.get("type").and_then(Value::as_str).unwrap_or("unknown"),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Other(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }
}

impl Serialize for ContentBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Text { text } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "text")?;
                map.serialize_entry("text", text)?;
                map.end()
            }
            Self::Other(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_block_serializes_with_type_tag() {
        let value = serde_json::to_value(ContentBlock::text("hi")).unwrap();
        assert_eq!(value, json!({"type": "text", "text": "hi"}));
    }

    #[test]
    fn tool_use_block_is_kept_verbatim() {
        let raw = json!({
            "type": "tool_use",
            "id": "toolu_01",
            "name": "read_file",
            "input": {"path": "main.go"}
        });
        let block: ContentBlock = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(block.kind(), "tool_use");
        assert!(block.as_text().is_none());
        assert_eq!(serde_json::to_value(&block).unwrap(), raw);
    }

    #[test]
    fn malformed_text_block_fails_closed() {
        let block = ContentBlock::from_value(json!({"type": "text", "text": 42}));
        assert!(!block.is_text());

        let untagged = ContentBlock::from_value(json!({"text": "no tag"}));
        assert!(!untagged.is_text());
        assert_eq!(untagged.kind(), "unknown");
    }
}
