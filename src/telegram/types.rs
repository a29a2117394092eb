use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Envelope wrapped around every Bot API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Payload keys that identify a non-text message, checked in this order.
const CONTENT_KEYS: [&str; 15] = [
    "photo",
    "sticker",
    "animation",
    "audio",
    "document",
    "video",
    "video_note",
    "voice",
    "contact",
    "dice",
    "poll",
    "venue",
    "location",
    "new_chat_members",
    "left_chat_member",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    pub fn content_type(&self) -> &str {
        if self.text.is_some() {
            return "text";
        }
        CONTENT_KEYS
            .iter()
            .find(|key| self.extra.contains_key(**key))
            .copied()
            .unwrap_or("unknown")
    }

    pub fn sender_first_name(&self) -> &str {
        self.from.as_ref().map(|u| u.first_name.as_str()).unwrap_or("")
    }

    pub fn sender_id(&self) -> i64 {
        self.from.as_ref().map(|u| u.id).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChosenInlineResult {
    pub result_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub edited_message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
    #[serde(default)]
    pub chosen_inline_result: Option<ChosenInlineResult>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateKind<'a> {
    Message(&'a Message),
    EditedMessage(&'a Message),
    CallbackQuery(&'a CallbackQuery),
    ChosenInlineResult(&'a ChosenInlineResult),
    Unknown(String),
}

impl Update {
    pub fn kind(&self) -> UpdateKind<'_> {
        if let Some(message) = &self.message {
            UpdateKind::Message(message)
        } else if let Some(message) = &self.edited_message {
            UpdateKind::EditedMessage(message)
        } else if let Some(query) = &self.callback_query {
            UpdateKind::CallbackQuery(query)
        } else if let Some(result) = &self.chosen_inline_result {
            UpdateKind::ChosenInlineResult(result)
        } else {
            let name = self
                .other
                .keys()
                .next()
                .cloned()
                .unwrap_or_else(|| "unknown".to_string());
            UpdateKind::Unknown(name)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    Markdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    Typing,
}

/// Extra knobs for `sendMessage`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub parse_mode: Option<ParseMode>,
    pub remove_keyboard: bool,
}

impl SendOptions {
    pub fn markdown() -> Self {
        Self {
            parse_mode: Some(ParseMode::Markdown),
            ..Self::default()
        }
    }

    pub fn remove_keyboard() -> Self {
        Self {
            remove_keyboard: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<Value>,
}

impl<'a> SendMessageRequest<'a> {
    pub fn new(chat_id: i64, text: &'a str, options: SendOptions) -> Self {
        Self {
            chat_id,
            text,
            parse_mode: options.parse_mode,
            reply_markup: options
                .remove_keyboard
                .then(|| serde_json::json!({ "remove_keyboard": true })),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_update() {
        let raw = r#"{
            "update_id": 10,
            "message": {
                "message_id": 5,
                "from": {"id": 42, "is_bot": false, "first_name": "Ana"},
                "chat": {"id": -100, "type": "group", "title": "Kamaradas"},
                "date": 1700000000,
                "text": "/startgame now"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();

        match update.kind() {
            UpdateKind::Message(message) => {
                assert_eq!(message.text.as_deref(), Some("/startgame now"));
                assert_eq!(message.chat.id, -100);
                assert_eq!(message.sender_first_name(), "Ana");
                assert_eq!(message.sender_id(), 42);
                assert_eq!(message.content_type(), "text");
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_edited_message_update() {
        let raw = r#"{
            "update_id": 11,
            "edited_message": {
                "message_id": 5,
                "chat": {"id": 7, "type": "private"},
                "date": 1700000000,
                "edit_date": 1700000100,
                "text": "/join"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();

        assert!(matches!(update.kind(), UpdateKind::EditedMessage(m) if m.chat.id == 7));
    }

    #[test]
    fn test_non_text_message_content_type() {
        let raw = r#"{
            "message_id": 1,
            "chat": {"id": 1, "type": "private"},
            "date": 0,
            "sticker": {"file_id": "abc"}
        }"#;
        let message: Message = serde_json::from_str(raw).unwrap();

        assert_eq!(message.content_type(), "sticker");
        assert_eq!(message.sender_first_name(), "");
    }

    #[test]
    fn test_callback_query_update() {
        let raw = r#"{
            "update_id": 12,
            "callback_query": {
                "id": "cb-1",
                "from": {"id": 42, "first_name": "Ana"},
                "chat_instance": "x",
                "data": "true"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();

        match update.kind() {
            UpdateKind::CallbackQuery(query) => {
                assert_eq!(query.id, "cb-1");
                assert_eq!(query.data.as_deref(), Some("true"));
                assert!(query.message.is_none());
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_chosen_inline_result_update() {
        let raw = r#"{
            "update_id": 13,
            "chosen_inline_result": {
                "result_id": "r-9",
                "from": {"id": 42, "first_name": "Ana"},
                "query": "kam"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();

        assert!(matches!(
            update.kind(),
            UpdateKind::ChosenInlineResult(r) if r.result_id == "r-9"
        ));
    }

    #[test]
    fn test_unknown_update_kind_uses_payload_name() {
        let raw = r#"{
            "update_id": 14,
            "inline_query": {"id": "q", "from": {"id": 1, "first_name": "A"}, "query": "", "offset": ""}
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();

        assert_eq!(update.kind(), UpdateKind::Unknown("inline_query".to_string()));
    }

    #[test]
    fn test_send_message_request_body() {
        let plain = serde_json::to_value(SendMessageRequest::new(1, "hi", SendOptions::default()))
            .unwrap();
        assert_eq!(plain, serde_json::json!({"chat_id": 1, "text": "hi"}));

        let markdown =
            serde_json::to_value(SendMessageRequest::new(1, "*hi*", SendOptions::markdown()))
                .unwrap();
        assert_eq!(markdown["parse_mode"], "Markdown");

        let removal =
            serde_json::to_value(SendMessageRequest::new(1, "hi", SendOptions::remove_keyboard()))
                .unwrap();
        assert_eq!(
            removal["reply_markup"],
            serde_json::json!({"remove_keyboard": true})
        );
    }

    #[test]
    fn test_chat_action_serialization() {
        assert_eq!(
            serde_json::to_value(ChatAction::Typing).unwrap(),
            serde_json::json!("typing")
        );
    }
}
