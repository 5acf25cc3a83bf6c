//! WhatsApp capability source.
//!
//! Messaging goes through a local whatsapp-web.js bridge when
//! `USE_WHATSAPP_API=true`; any bridge failure degrades to mock data with a
//! warning prefixed to the output, so agents stay usable without the bridge.
//!
//! The bridge exposes a small JSON API on `WHATSAPP_BRIDGE_URL` (default
//! `http://localhost:3123`): `GET /status` for authentication state and
//! `POST /send`, `/messages`, `/search`, `/chats` for the operations.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use serde_json::{json, Value};
use thiserror::Error;

use crate::capabilities::HandlerRegistry;

use super::{hours_back, require_str, short_id, truncate, ToolResult};

/// Register the WhatsApp handlers.
pub fn register(registry: &mut HandlerRegistry) {
    registry.register("whatsapp.send_whatsapp_message", Arc::new(send_whatsapp_message));
    registry.register("whatsapp.read_whatsapp_messages", Arc::new(read_whatsapp_messages));
    registry.register(
        "whatsapp.search_whatsapp_messages",
        Arc::new(search_whatsapp_messages),
    );
    registry.register("whatsapp.get_whatsapp_chats", Arc::new(get_whatsapp_chats));
}

// ---------------------------------------------------------------------------
// Bridge client
// ---------------------------------------------------------------------------

const DEFAULT_BRIDGE_URL: &str = "http://localhost:3123";
const BRIDGE_TIMEOUT: Duration = Duration::from_secs(30);

const NOT_AUTHENTICATED_SHORT: &str =
    "⚠️ **WhatsApp not authenticated!** Please scan QR code first.";

/// Errors from the WhatsApp bridge API.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to reach WhatsApp bridge: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("WhatsApp bridge error ({status}): {body}")]
    Api { status: u16, body: String },
}

/// Blocking HTTP client for the whatsapp-web.js bridge.
///
/// Capability handlers run on the blocking thread pool, so a blocking client
/// fits here.
#[derive(Debug)]
pub struct WhatsAppBridge {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl WhatsAppBridge {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Bridge URL from `WHATSAPP_BRIDGE_URL`, falling back to the default.
    pub fn from_env() -> Self {
        let url =
            std::env::var("WHATSAPP_BRIDGE_URL").unwrap_or_else(|_| DEFAULT_BRIDGE_URL.to_string());
        Self::new(url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the bridge reports an authenticated WhatsApp session.
    pub fn is_authenticated(&self) -> Result<bool, BridgeError> {
        let value = self.get("status")?;
        Ok(value
            .get("authenticated")
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }

    /// Send a message to a phone number or jid.
    pub fn send_message(&self, to: &str, message: &str) -> Result<Value, BridgeError> {
        let to = normalize_recipient(to);
        self.post("send", json!({ "to": to, "message": message }))
    }

    /// Recent messages, parsed into the flat shape the formatters use.
    pub fn read_messages(&self, limit: i64, unread_only: bool) -> Result<Vec<Value>, BridgeError> {
        let value = self.post("messages", json!({ "limit": limit, "unreadOnly": unread_only }))?;
        Ok(parse_messages(&value))
    }

    /// Full-text search over messages.
    pub fn search_messages(&self, query: &str, limit: i64) -> Result<Vec<Value>, BridgeError> {
        let value = self.post("search", json!({ "query": query, "limit": limit }))?;
        Ok(parse_messages(&value))
    }

    /// Chat list with unread counts.
    pub fn get_chats(&self, limit: i64) -> Result<Vec<Value>, BridgeError> {
        let value = self.post("chats", json!({ "limit": limit }))?;
        Ok(value
            .get("chats")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    fn get(&self, endpoint: &str) -> Result<Value, BridgeError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self.client.get(&url).timeout(BRIDGE_TIMEOUT).send()?;
        Self::decode(response)
    }

    fn post(&self, endpoint: &str, body: Value) -> Result<Value, BridgeError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .timeout(BRIDGE_TIMEOUT)
            .json(&body)
            .send()?;
        Self::decode(response)
    }

    fn decode(response: reqwest::blocking::Response) -> Result<Value, BridgeError> {
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(BridgeError::Api {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        Ok(response.json()?)
    }
}

/// Bare phone numbers become `<digits>@c.us`; jids pass through.
fn normalize_recipient(to: &str) -> String {
    if to.ends_with("@c.us") || to.ends_with("@g.us") {
        return to.to_string();
    }
    let digits: String = to
        .chars()
        .filter(|c| !matches!(c, '+' | '-' | ' '))
        .collect();
    format!("{}@c.us", digits)
}

fn parse_messages(value: &Value) -> Vec<Value> {
    value
        .get("messages")
        .and_then(Value::as_array)
        .map(|messages| messages.iter().map(parse_message).collect())
        .unwrap_or_default()
}

/// Flatten a raw bridge message into the fields the formatters use.
fn parse_message(raw: &Value) -> Value {
    let body = raw.get("body").and_then(Value::as_str).unwrap_or("");
    json!({
        "from": raw.get("from").and_then(Value::as_str).unwrap_or("Unknown"),
        "body": body,
        "preview": body.chars().take(200).collect::<String>(),
        "timestamp": raw.get("timestamp").and_then(Value::as_i64).unwrap_or(0),
        "is_group": raw.get("isGroupMsg").and_then(Value::as_bool).unwrap_or(false),
        "sender": raw
            .get("sender")
            .and_then(|s| s.get("pushname"))
            .and_then(Value::as_str)
            .unwrap_or("Unknown"),
        "chat": raw.get("chatId").and_then(Value::as_str).unwrap_or(""),
    })
}

/// Whether handlers should try the live bridge at all.
fn bridge_enabled() -> bool {
    std::env::var("USE_WHATSAPP_API")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Send a WhatsApp message to a contact or phone number.
pub fn send_whatsapp_message(args: HashMap<String, Value>) -> ToolResult {
    let to = require_str(&args, "to")?;
    let message = require_str(&args, "message")?;

    if bridge_enabled() {
        match send_via_bridge(to, message) {
            Ok(text) => return Ok(Value::String(text)),
            Err(e) => {
                log::warn!("WhatsApp bridge unavailable, falling back to mock: {}", e);
                return Ok(Value::String(format!(
                    "⚠️ **WhatsApp error (using mock):** {}\n\n{}",
                    e,
                    send_message_mock(to, message)
                )));
            }
        }
    }

    Ok(Value::String(send_message_mock(to, message)))
}

/// Read recent WhatsApp messages, optionally unread only.
pub fn read_whatsapp_messages(args: HashMap<String, Value>) -> ToolResult {
    let limit = args.get("limit").and_then(Value::as_i64).unwrap_or(10).max(0);
    let filter_unread = args
        .get("filter_unread")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if bridge_enabled() {
        match read_via_bridge(limit, filter_unread) {
            Ok(text) => return Ok(Value::String(text)),
            Err(e) => {
                log::warn!("WhatsApp bridge unavailable, falling back to mock: {}", e);
                return Ok(Value::String(format!(
                    "⚠️ **WhatsApp error (using mock):** {}\n\n{}",
                    e,
                    read_messages_mock(limit as usize, filter_unread)
                )));
            }
        }
    }

    Ok(Value::String(read_messages_mock(limit as usize, filter_unread)))
}

/// Search WhatsApp messages by keyword or phrase.
pub fn search_whatsapp_messages(args: HashMap<String, Value>) -> ToolResult {
    let query = require_str(&args, "query")?;
    let limit = args.get("limit").and_then(Value::as_i64).unwrap_or(20).max(0);

    if bridge_enabled() {
        match search_via_bridge(query, limit) {
            Ok(text) => return Ok(Value::String(text)),
            Err(e) => {
                log::warn!("WhatsApp bridge unavailable, falling back to mock: {}", e);
                return Ok(Value::String(format!(
                    "⚠️ **WhatsApp error (using mock):** {}\n\n{}",
                    e,
                    search_messages_mock(query, limit as usize)
                )));
            }
        }
    }

    Ok(Value::String(search_messages_mock(query, limit as usize)))
}

/// List WhatsApp chats with unread counts.
pub fn get_whatsapp_chats(args: HashMap<String, Value>) -> ToolResult {
    let limit = args.get("limit").and_then(Value::as_i64).unwrap_or(20).max(0);

    if bridge_enabled() {
        match chats_via_bridge(limit) {
            Ok(text) => return Ok(Value::String(text)),
            Err(e) => {
                log::warn!("WhatsApp bridge unavailable, falling back to mock: {}", e);
                return Ok(Value::String(format!(
                    "⚠️ **WhatsApp error (using mock):** {}\n\n{}",
                    e,
                    chats_mock(limit as usize)
                )));
            }
        }
    }

    Ok(Value::String(chats_mock(limit as usize)))
}

// ---------------------------------------------------------------------------
// Live formatting
// ---------------------------------------------------------------------------

fn send_via_bridge(to: &str, message: &str) -> Result<String, BridgeError> {
    let bridge = WhatsAppBridge::from_env();
    if !bridge.is_authenticated()? {
        return Ok("⚠️ **WhatsApp not authenticated!**\n\n\
             Please authenticate by:\n\
             1. Start the whatsapp-web.js bridge (node server.js)\n\
             2. Scan the QR code displayed in the terminal with your WhatsApp mobile app\n\
             3. Wait for authentication confirmation\n\
             4. Try sending the message again"
            .to_string());
    }

    let result = bridge.send_message(to, message)?;
    if result.get("success").and_then(Value::as_bool).unwrap_or(false) {
        let id = match result.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "N/A".to_string(),
        };
        Ok(format!(
            "✅ **WhatsApp Message Sent Successfully!**\n\n\
             📱 **To:** {}\n\
             💬 **Message:** {}\n\
             ⏰ **Sent:** {}\n\
             🔢 **Message ID:** {}",
            to,
            truncate(message, 100),
            result.get("timestamp").and_then(Value::as_str).unwrap_or("now"),
            id
        ))
    } else {
        Ok(format!(
            "❌ **Failed to send WhatsApp message:** {}",
            result
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
        ))
    }
}

fn read_via_bridge(limit: i64, filter_unread: bool) -> Result<String, BridgeError> {
    let bridge = WhatsAppBridge::from_env();
    if !bridge.is_authenticated()? {
        return Ok(NOT_AUTHENTICATED_SHORT.to_string());
    }
    let messages = bridge.read_messages(limit, filter_unread)?;
    if messages.is_empty() {
        return Ok("📭 **No WhatsApp messages found** matching your criteria.".to_string());
    }
    let header = if filter_unread {
        "💬 **WhatsApp Unread Messages**"
    } else {
        "💬 **WhatsApp Messages**"
    };
    Ok(format_live_messages(header, &messages))
}

fn search_via_bridge(query: &str, limit: i64) -> Result<String, BridgeError> {
    let bridge = WhatsAppBridge::from_env();
    if !bridge.is_authenticated()? {
        return Ok(NOT_AUTHENTICATED_SHORT.to_string());
    }
    let messages = bridge.search_messages(query, limit)?;

    let header = format!("🔍 **WhatsApp Search Results for '{}'**\n", query);
    if messages.is_empty() {
        return Ok(format!("{}\n❌ No messages found matching your query.", header));
    }

    let noun = if messages.len() == 1 { "message" } else { "messages" };
    let mut sections = vec![
        header,
        format!("\nFound {} matching {}:\n", messages.len(), noun),
    ];
    for (i, msg) in messages.iter().enumerate() {
        let time = format_unix(msg.get("timestamp").and_then(Value::as_i64).unwrap_or(0));
        let body = msg.get("body").and_then(Value::as_str).unwrap_or("");
        let highlighted = truncate(&highlight_matches(body, query), 200);
        if msg.get("is_group").and_then(Value::as_bool).unwrap_or(false) {
            sections.push(format!(
                "{}. 👥 **Group:** {}\n   👤 **Sender:** {}\n   💬 **Message:** {}\n   ⏰ **Received:** {}",
                i + 1,
                msg.get("chat").and_then(Value::as_str).unwrap_or(""),
                msg.get("sender").and_then(Value::as_str).unwrap_or("Unknown"),
                highlighted,
                time
            ));
        } else {
            sections.push(format!(
                "{}. 📱 **From:** {}\n   💬 **Message:** {}\n   ⏰ **Received:** {}",
                i + 1,
                msg.get("from").and_then(Value::as_str).unwrap_or("Unknown"),
                highlighted,
                time
            ));
        }
    }
    Ok(sections.join("\n\n"))
}

fn chats_via_bridge(limit: i64) -> Result<String, BridgeError> {
    let bridge = WhatsAppBridge::from_env();
    if !bridge.is_authenticated()? {
        return Ok(NOT_AUTHENTICATED_SHORT.to_string());
    }
    let chats = bridge.get_chats(limit)?;
    if chats.is_empty() {
        return Ok("📭 **No WhatsApp chats found.**".to_string());
    }
    Ok(format_live_chats(&chats))
}

/// Render parsed bridge messages under a header.
fn format_live_messages(header: &str, messages: &[Value]) -> String {
    let noun = if messages.len() == 1 { "message" } else { "messages" };
    let mut sections = vec![format!("{} ({} {})\n", header, messages.len(), noun)];

    for (i, msg) in messages.iter().enumerate() {
        let time = format_unix(msg.get("timestamp").and_then(Value::as_i64).unwrap_or(0));
        let preview = msg.get("preview").and_then(Value::as_str).unwrap_or("");
        if msg.get("is_group").and_then(Value::as_bool).unwrap_or(false) {
            sections.push(format!(
                "{}. 👥 **Group:** {}\n   👤 **Sender:** {}\n   💬 **Message:** {}\n   ⏰ **Received:** {}",
                i + 1,
                msg.get("chat").and_then(Value::as_str).unwrap_or(""),
                msg.get("sender").and_then(Value::as_str).unwrap_or("Unknown"),
                preview,
                time
            ));
        } else {
            sections.push(format!(
                "{}. 📱 **From:** {}\n   💬 **Message:** {}\n   ⏰ **Received:** {}",
                i + 1,
                msg.get("from").and_then(Value::as_str).unwrap_or("Unknown"),
                preview,
                time
            ));
        }
    }

    sections.join("\n\n")
}

fn format_live_chats(chats: &[Value]) -> String {
    let noun = if chats.len() == 1 { "chat" } else { "chats" };
    let mut sections = vec![format!("💬 **WhatsApp Chats** ({} {})\n", chats.len(), noun)];

    for (i, chat) in chats.iter().enumerate() {
        let is_group = chat.get("isGroup").and_then(Value::as_bool).unwrap_or(false);
        let unread = chat.get("unreadCount").and_then(Value::as_i64).unwrap_or(0);
        sections.push(format!(
            "{}. {} **{}**{}\n   {}\n   ⏰ **Last activity:** {}",
            i + 1,
            if is_group { "👥" } else { "📱" },
            chat.get("name").and_then(Value::as_str).unwrap_or("Unknown"),
            if is_group { " (Group)" } else { "" },
            unread_line(unread),
            format_unix(chat.get("timestamp").and_then(Value::as_i64).unwrap_or(0)),
        ));
    }

    sections.join("\n\n")
}

fn unread_line(unread: i64) -> String {
    if unread > 0 {
        let noun = if unread == 1 { "message" } else { "messages" };
        format!("🔔 Unread: {} {}", unread, noun)
    } else {
        "✅ All read".to_string()
    }
}

/// Local `%Y-%m-%d %H:%M` rendering of a unix timestamp.
fn format_unix(ts: i64) -> String {
    use chrono::TimeZone;
    match Local.timestamp_opt(ts, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        _ => "Unknown".to_string(),
    }
}

/// Wrap every case-insensitive occurrence of `query` in bold markers.
///
/// Matching is ASCII case-insensitive; non-ASCII queries match exactly.
fn highlight_matches(text: &str, query: &str) -> String {
    if query.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 8);
    let mut rest = text;
    loop {
        let found = rest.char_indices().map(|(i, _)| i).find(|&i| {
            rest.get(i..i + query.len())
                .is_some_and(|window| window.eq_ignore_ascii_case(query))
        });
        match found {
            Some(i) => {
                out.push_str(&rest[..i]);
                out.push_str("**");
                out.push_str(&rest[i..i + query.len()]);
                out.push_str("**");
                rest = &rest[i + query.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Mock data
// ---------------------------------------------------------------------------

struct SampleMessage {
    from: &'static str,
    sender: Option<&'static str>,
    message: &'static str,
    is_group: bool,
    unread: bool,
}

const SAMPLE_MESSAGES: [SampleMessage; 5] = [
    SampleMessage {
        from: "John Doe (+1234567890)",
        sender: None,
        message: "Hey, how are you doing today?",
        is_group: false,
        unread: true,
    },
    SampleMessage {
        from: "Project Team",
        sender: Some("Alice"),
        message: "Meeting at 3pm today, don't forget!",
        is_group: true,
        unread: true,
    },
    SampleMessage {
        from: "Mom ❤️",
        sender: None,
        message: "Don't forget to call grandma",
        is_group: false,
        unread: false,
    },
    SampleMessage {
        from: "Work Group",
        sender: Some("Boss"),
        message: "Need the report by EOD",
        is_group: true,
        unread: true,
    },
    SampleMessage {
        from: "Friend (+9876543210)",
        sender: None,
        message: "Want to grab coffee this weekend?",
        is_group: false,
        unread: false,
    },
];

/// (keyword, from, sender, message, is_group)
const SEARCH_INDEX: [(&str, &str, &str, &str, bool); 4] = [
    (
        "meeting",
        "Project Team",
        "Alice",
        "Meeting at 3pm today, don't forget!",
        true,
    ),
    (
        "meeting",
        "Boss",
        "Boss",
        "Can we schedule a meeting for tomorrow?",
        false,
    ),
    (
        "coffee",
        "Friend",
        "Friend",
        "Want to grab coffee this weekend?",
        false,
    ),
    ("report", "Work Group", "Boss", "Need the report by EOD", true),
];

/// (name, is_group, unread)
const SAMPLE_CHATS: [(&str, bool, u32); 8] = [
    ("John Doe", false, 3),
    ("Project Team", true, 5),
    ("Mom ❤️", false, 0),
    ("Work Group", true, 12),
    ("Friend", false, 1),
    ("Family", true, 0),
    ("Boss", false, 2),
    ("Sports Team", true, 8),
];

fn send_message_mock(to: &str, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    format!(
        "✅ **WhatsApp Message Sent Successfully!** (MOCK)\n\n\
         📱 **To:** {}\n\
         💬 **Message:** {}\n\
         ⏰ **Sent:** {}\n\
         🔢 **Message ID:** WA-MSG-{}\n\n\
         💡 **Note:** This is a mock response. To send real WhatsApp messages:\n\
         1. Start the whatsapp-web.js bridge (node server.js)\n\
         2. Set USE_WHATSAPP_API=true\n\
         3. Authenticate by scanning the QR code",
        to,
        truncate(message, 100),
        timestamp,
        short_id(&format!("{}{}{}", to, message, timestamp))
    )
}

fn read_messages_mock(limit: usize, filter_unread: bool) -> String {
    let header = if filter_unread {
        "💬 **WhatsApp Unread Messages**"
    } else {
        "💬 **WhatsApp Messages**"
    };

    let messages: Vec<&SampleMessage> = SAMPLE_MESSAGES
        .iter()
        .filter(|m| !filter_unread || m.unread)
        .take(limit)
        .collect();

    if messages.is_empty() {
        return "📭 **No WhatsApp messages found** matching your criteria.".to_string();
    }

    let noun = if messages.len() == 1 { "message" } else { "messages" };
    let mut sections = vec![format!("{} ({} {})\n", header, messages.len(), noun)];

    for (i, msg) in messages.iter().enumerate() {
        let time = hours_back(2 + 5 * i as i64);
        if msg.is_group {
            sections.push(format!(
                "{}. 👥 **Group:** {}\n   👤 **Sender:** {}\n   💬 **Message:** {}\n   ⏰ **Received:** {}",
                i + 1,
                msg.from,
                msg.sender.unwrap_or("Unknown"),
                msg.message,
                time
            ));
        } else {
            let status = if msg.unread { "🟢" } else { "⚪" };
            sections.push(format!(
                "{}. {} **From:** {}\n   💬 **Message:** {}\n   ⏰ **Received:** {}",
                i + 1,
                status,
                msg.from,
                msg.message,
                time
            ));
        }
    }

    sections.join("\n\n")
}

fn search_messages_mock(query: &str, limit: usize) -> String {
    let query_lower = query.to_lowercase();
    let mut results: Vec<(&str, &str, String, bool)> = SEARCH_INDEX
        .iter()
        .filter(|(keyword, ..)| {
            query_lower.contains(keyword) || keyword.contains(&query_lower)
        })
        .map(|(_, from, sender, message, is_group)| {
            (*from, *sender, highlight_matches(message, query), *is_group)
        })
        .collect();

    if results.is_empty() {
        results.push((
            "Search Results",
            "System",
            format!("Results for '{}' (no exact matches in mock data)", query),
            false,
        ));
    }
    results.truncate(limit);

    let header = format!("🔍 **WhatsApp Search Results for '{}'**\n", query);
    if results.is_empty() {
        return format!("{}\n❌ No messages found matching your query.", header);
    }

    let noun = if results.len() == 1 { "message" } else { "messages" };
    let mut sections = vec![
        header,
        format!("\nFound {} matching {}:\n", results.len(), noun),
    ];

    for (i, (from, sender, message, is_group)) in results.iter().enumerate() {
        let time = hours_back(4 + 9 * i as i64);
        if *is_group {
            sections.push(format!(
                "{}. 👥 **Group:** {}\n   👤 **Sender:** {}\n   💬 **Message:** {}\n   ⏰ **Received:** {}",
                i + 1,
                from,
                sender,
                message,
                time
            ));
        } else {
            sections.push(format!(
                "{}. 📱 **From:** {}\n   💬 **Message:** {}\n   ⏰ **Received:** {}",
                i + 1,
                from,
                message,
                time
            ));
        }
    }

    sections.join("\n\n")
}

fn chats_mock(limit: usize) -> String {
    let chats = &SAMPLE_CHATS[..limit.min(SAMPLE_CHATS.len())];

    let noun = if chats.len() == 1 { "chat" } else { "chats" };
    let mut sections = vec![format!("💬 **WhatsApp Chats** ({} {})\n", chats.len(), noun)];

    for (i, (name, is_group, unread)) in chats.iter().enumerate() {
        sections.push(format!(
            "{}. {} **{}**{}\n   {}\n   ⏰ **Last activity:** {}",
            i + 1,
            if *is_group { "👥" } else { "📱" },
            name,
            if *is_group { " (Group)" } else { "" },
            unread_line(*unread as i64),
            hours_back(1 + 6 * i as i64)
        ));
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_normalize_recipient() {
        assert_eq!(normalize_recipient("+1 234-567-890"), "1234567890@c.us");
        assert_eq!(normalize_recipient("1234567890"), "1234567890@c.us");
        assert_eq!(normalize_recipient("1234567890@c.us"), "1234567890@c.us");
        assert_eq!(normalize_recipient("group-id@g.us"), "group-id@g.us");
    }

    #[test]
    fn test_parse_message_shapes() {
        let raw = json!({
            "from": "123@c.us",
            "body": "hello there",
            "timestamp": 1_700_000_000,
            "isGroupMsg": true,
            "sender": { "pushname": "Alice" },
            "chatId": "team@g.us"
        });
        let parsed = parse_message(&raw);
        assert_eq!(parsed["from"], "123@c.us");
        assert_eq!(parsed["preview"], "hello there");
        assert_eq!(parsed["is_group"], true);
        assert_eq!(parsed["sender"], "Alice");
        assert_eq!(parsed["chat"], "team@g.us");

        let sparse = parse_message(&json!({}));
        assert_eq!(sparse["from"], "Unknown");
        assert_eq!(sparse["timestamp"], 0);
        assert_eq!(sparse["is_group"], false);
    }

    #[test]
    fn test_highlight_matches_case_insensitive() {
        assert_eq!(
            highlight_matches("Meeting at 3pm, about the meeting", "meeting"),
            "**Meeting** at 3pm, about the **meeting**"
        );
        assert_eq!(highlight_matches("no hits here", "zzz"), "no hits here");
        assert_eq!(highlight_matches("text", ""), "text");
    }

    #[test]
    fn test_bridge_base_url() {
        let bridge = WhatsAppBridge::new("http://example.com:9999");
        assert_eq!(bridge.base_url(), "http://example.com:9999");
    }

    #[test]
    fn test_send_mock_format() {
        let text = send_message_mock("1234567890", "Hello from the agent!");
        assert!(text.starts_with("✅ **WhatsApp Message Sent Successfully!** (MOCK)"));
        assert!(text.contains("📱 **To:** 1234567890"));
        assert!(text.contains("💬 **Message:** Hello from the agent!"));
        assert!(text.contains("🔢 **Message ID:** WA-MSG-"));
        assert!(text.contains("USE_WHATSAPP_API=true"));
    }

    #[test]
    fn test_send_missing_args() {
        let err = send_whatsapp_message(args(&[("to", json!("123"))])).unwrap_err();
        assert!(err.to_string().contains("'message'"));
    }

    #[test]
    fn test_read_mock_mixed_states() {
        let text = read_messages_mock(10, false);
        assert!(text.starts_with("💬 **WhatsApp Messages** (5 messages)"));
        // Groups show chat plus sender; direct messages show a status dot.
        assert!(text.contains("👥 **Group:** Project Team\n   👤 **Sender:** Alice"));
        assert!(text.contains("🟢 **From:** John Doe (+1234567890)"));
        assert!(text.contains("⚪ **From:** Mom ❤️"));
    }

    #[test]
    fn test_read_mock_unread_filter() {
        let text = read_messages_mock(10, true);
        assert!(text.starts_with("💬 **WhatsApp Unread Messages** (3 messages)"));
        assert!(!text.contains("Mom ❤️"));
        assert!(text.contains("Work Group"));
    }

    #[test]
    fn test_read_mock_empty() {
        assert_eq!(
            read_messages_mock(0, false),
            "📭 **No WhatsApp messages found** matching your criteria."
        );
    }

    #[test]
    fn test_search_mock_keyword() {
        let text = search_messages_mock("meeting", 20);
        assert!(text.starts_with("🔍 **WhatsApp Search Results for 'meeting'**"));
        assert!(text.contains("Found 2 matching messages:"));
        assert!(text.contains("**Meeting** at 3pm today, don't forget!"));
        assert!(text.contains("Can we schedule a **meeting** for tomorrow?"));
    }

    #[test]
    fn test_search_mock_fallback() {
        let text = search_messages_mock("xyzzy", 20);
        assert!(text.contains("Found 1 matching message:"));
        assert!(text.contains("Results for 'xyzzy' (no exact matches in mock data)"));
    }

    #[test]
    fn test_chats_mock_unread_lines() {
        let text = chats_mock(20);
        assert!(text.starts_with("💬 **WhatsApp Chats** (8 chats)"));
        assert!(text.contains("📱 **John Doe**\n   🔔 Unread: 3 messages"));
        assert!(text.contains("👥 **Work Group** (Group)\n   🔔 Unread: 12 messages"));
        assert!(text.contains("📱 **Mom ❤️**\n   ✅ All read"));
        assert!(text.contains("🔔 Unread: 1 message\n"));
    }

    #[test]
    fn test_chats_mock_limit() {
        let text = chats_mock(2);
        assert!(text.starts_with("💬 **WhatsApp Chats** (2 chats)"));
        assert!(!text.contains("Sports Team"));
    }

    #[test]
    fn test_format_live_chats() {
        let chats = vec![
            json!({ "name": "Ops", "isGroup": true, "unreadCount": 2, "timestamp": 1_700_000_000 }),
            json!({ "name": "Dana", "isGroup": false, "unreadCount": 0 }),
        ];
        let text = format_live_chats(&chats);
        assert!(text.starts_with("💬 **WhatsApp Chats** (2 chats)"));
        assert!(text.contains("👥 **Ops** (Group)\n   🔔 Unread: 2 messages"));
        assert!(text.contains("📱 **Dana**\n   ✅ All read"));
    }

    #[test]
    fn test_format_live_messages() {
        let messages = vec![parse_message(&json!({
            "from": "123@c.us",
            "body": "ping",
            "timestamp": 1_700_000_000
        }))];
        let text = format_live_messages("💬 **WhatsApp Messages**", &messages);
        assert!(text.starts_with("💬 **WhatsApp Messages** (1 message)"));
        assert!(text.contains("📱 **From:** 123@c.us"));
        assert!(text.contains("💬 **Message:** ping"));
    }
}
