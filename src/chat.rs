//! Webex messages API client: the room commands come from and replies go to.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Response;
use serde::{Deserialize, Serialize};

use crate::{ChatChannel, Error, Result};

/// A message as listed by the messages API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    /// Plain text body. Messages with only attachments have none.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub person_email: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// How long ago the message was posted, if the API told us
    pub fn age(&self) -> Option<chrono::Duration> {
        self.created.map(|created| Utc::now() - created)
    }
}

#[derive(Debug, Deserialize)]
struct MessagePage {
    #[serde(default)]
    items: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewMessage<'a> {
    room_id: &'a str,
    text: &'a str,
}

/// A [ChatChannel] bound to one room
pub struct WebexClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
    room_id: String,
}

impl WebexClient {
    /// Creates a client for `room_id`. `api_url` is the API root, e.g.
    /// `https://webexapis.com/v1`.
    pub fn new(api_url: &str, token: &str, room_id: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(WebexClient {
            http,
            api_url: api_url.trim_end_matches('/').to_owned(),
            token: token.to_owned(),
            room_id: room_id.to_owned(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.api_url)
    }
}

/// Any non-success status from the chat service is fatal to the dispatcher
fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        log::error!("chat: {} replied with {}", response.url().path(), status);
        Err(Error::ChatStatus(status.as_u16()))
    }
}

impl ChatChannel for WebexClient {
    async fn latest_message(&self) -> Result<Option<ChatMessage>> {
        let response = self
            .http
            .get(self.messages_url())
            .bearer_auth(&self.token)
            .query(&[("roomId", self.room_id.as_str()), ("max", "1")])
            .send()
            .await?;
        let body = check_status(response)?.bytes().await?;
        let page: MessagePage = serde_json::from_slice(&body)?;
        Ok(page.items.into_iter().next())
    }

    async fn post_message(&self, text: &str) -> Result<()> {
        let body = NewMessage {
            room_id: &self.room_id,
            text,
        };
        let response = self
            .http
            .post(self.messages_url())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_decoding() {
        let body = r#"{"items": [{
            "id": "Y2lzY29zcGFyazovL3VzL01FU1NBR0UvOTJkYjNiZTAtNDNiZC0xMWU2LThhZTktZGQ1YjNkZmM1NjVk",
            "roomId": "Y2lzY29zcGFyazovL3VzL1JPT00vYmJjZWIxYWQtNDNmMS0zYjU4LTkxNDctZjE0YmIwYzRkMTU0",
            "roomType": "group",
            "text": "/66070220 restconf",
            "personEmail": "operator@example.com",
            "created": "2026-10-18T09:30:00.000Z"
        }]}"#;
        let page: MessagePage = serde_json::from_str(body).expect("failed to decode");
        let message = &page.items[0];
        assert_eq!(message.text.as_deref(), Some("/66070220 restconf"));
        assert_eq!(message.person_email.as_deref(), Some("operator@example.com"));
        assert_eq!(
            message.created.map(|c| c.to_rfc3339()),
            Some("2026-10-18T09:30:00+00:00".to_owned())
        );
        assert!(message.age().is_some());
    }

    #[test]
    fn test_message_without_text() {
        let body = r#"{"items": [{"id": "abc", "files": ["https://example.com/f"]}]}"#;
        let page: MessagePage = serde_json::from_str(body).expect("failed to decode");
        assert!(page.items[0].text.is_none());
        assert!(page.items[0].created.is_none());

        let page: MessagePage = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_new_message_encoding() {
        let body = NewMessage {
            room_id: "room",
            text: "Ok: Netconf",
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"roomId":"room","text":"Ok: Netconf"}"#
        );
    }
}
