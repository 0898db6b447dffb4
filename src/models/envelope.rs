use serde::Serialize;

use crate::messages::{Message, MessageKind};

/// Body shape the consoles expect from list endpoints.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'static str>,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Envelope {
            kind: MessageKind::Success,
            title: None,
            text: None,
            data,
        }
    }
    pub fn with_message(message: Message, data: T) -> Self {
        Envelope {
            kind: message.kind,
            title: Some(message.title),
            text: Some(message.text),
            data,
        }
    }
}

impl<T> Envelope<Vec<T>> {
    /// Success with the items, or `empty` when there are none.
    pub fn list(items: Vec<T>, empty: Message) -> Self {
        if items.is_empty() {
            Envelope::with_message(empty, items)
        } else {
            Envelope::success(items)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages;

    #[test]
    fn empty_list_carries_info_dialog() {
        let json = serde_json::to_value(Envelope::list(Vec::<u8>::new(), messages::EMPLOYEES_EMPTY))
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "info",
                "title": "Bilgi",
                "text": "Henüz personel tanımlı değil.",
                "data": [],
            })
        );
    }

    #[test]
    fn success_omits_dialog() {
        let json = serde_json::to_value(Envelope::list(vec![1, 2], messages::EMPLOYEES_EMPTY))
            .unwrap();
        assert_eq!(json, serde_json::json!({ "type": "success", "data": [1, 2] }));
    }
}
