use serde::{Deserialize, Serialize};

/// Body of a `POST /v1/messages` call.
#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub tools: Vec<ToolDef>,
    pub messages: Vec<MessageParam>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageParam {
    pub role: String,
    pub content: Vec<RequestBlock>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestBlock {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub media_type: String,
    pub data: String,
}

impl ImageSource {
    pub fn base64(media_type: &str, data: String) -> Self {
        Self {
            source_type: "base64".into(),
            media_type: media_type.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub id: String,
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

/// One block of model output. Kept verbatim in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ToolUse(ToolUse),
    /// Block kinds outside the text/tool contract (e.g. thinking), held as
    /// received so they replay unchanged.
    #[serde(untagged)]
    Other(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub input: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_blocks_deserialize_in_order() {
        let raw = serde_json::json!({
            "id": "msg_1",
            "content": [
                {"type": "text", "text": "<thinking>hallway ahead</thinking>"},
                {"type": "tool_use", "id": "toolu_1", "name": "move_robot",
                 "input": {"direction": "forward", "distance": "short"}},
                {"type": "thinking", "thinking": "..."}
            ],
            "stop_reason": "tool_use"
        });
        let resp: MessagesResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.content.len(), 3);
        assert!(matches!(&resp.content[0], ContentBlock::Text { text } if text.contains("hallway")));
        match &resp.content[1] {
            ContentBlock::ToolUse(tu) => {
                assert_eq!(tu.name, "move_robot");
                assert_eq!(tu.input["distance"], "short");
            }
            other => panic!("expected tool_use, got {other:?}"),
        }
        assert!(matches!(&resp.content[2], ContentBlock::Other(v) if v["type"] == "thinking"));
    }

    #[test]
    fn unknown_blocks_serialize_back_unchanged() {
        let raw = serde_json::json!([
            {"type": "thinking", "thinking": "the door is left", "signature": "sig"},
            {"type": "text", "text": "turning"}
        ]);
        let blocks: Vec<ContentBlock> = serde_json::from_value(raw.clone()).unwrap();
        assert!(matches!(&blocks[1], ContentBlock::Text { text } if text == "turning"));
        assert_eq!(serde_json::to_value(&blocks).unwrap(), raw);
    }

    #[test]
    fn image_block_serializes_with_base64_source() {
        let block = RequestBlock::Image {
            source: ImageSource::base64("image/png", "AAAA".into()),
        };
        let v = serde_json::to_value(&block).unwrap();
        assert_eq!(v["type"], "image");
        assert_eq!(v["source"]["type"], "base64");
        assert_eq!(v["source"]["media_type"], "image/png");
        assert_eq!(v["source"]["data"], "AAAA");
    }
}
