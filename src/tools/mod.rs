//! Built-in capability sources.
//!
//! Each submodule covers one domain and ships plain handler functions that
//! return formatted, user-facing text. The handlers carry no metadata of
//! their own: the YAML manifests under `capabilities/` declare domain, tags,
//! and parameter schemas, and bind each entry to a handler id registered
//! here.
//!
//! Adding a source is a two-step job:
//! 1. register its handlers in [`builtin_handlers`] so the ids resolve, and
//! 2. drop a manifest into the capabilities directory.
//!
//! All sources are mock implementations except WhatsApp, which talks to a
//! local whatsapp-web.js bridge when `USE_WHATSAPP_API=true` and falls back
//! to mock data otherwise.

pub mod calendar;
pub mod email;
pub mod stock;
pub mod weather;
pub mod whatsapp;

use std::collections::HashMap;

use chrono::{Duration, Local};
use serde_json::Value;

use crate::capabilities::HandlerRegistry;

/// Handler result alias shared by the tool modules.
pub(crate) type ToolResult = Result<Value, Box<dyn std::error::Error + Send + Sync>>;

/// Registry holding every built-in handler, keyed by `domain.name` id.
pub fn builtin_handlers() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    weather::register(&mut registry);
    stock::register(&mut registry);
    email::register(&mut registry);
    whatsapp::register(&mut registry);
    calendar::register(&mut registry);
    registry
}

// ---------------------------------------------------------------------------
// Shared argument and formatting helpers
// ---------------------------------------------------------------------------

/// Extract a required string argument.
pub(crate) fn require_str<'a>(
    args: &'a HashMap<String, Value>,
    name: &str,
) -> Result<&'a str, Box<dyn std::error::Error + Send + Sync>> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing required argument '{}'", name).into())
}

/// Local `%Y-%m-%d %H:%M` timestamp a fixed number of hours back.
///
/// The mock sources derive `hours` from the item index, so relative ordering
/// is stable across calls.
pub(crate) fn hours_back(hours: i64) -> String {
    (Local::now() - Duration::hours(hours))
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// Short numeric id in `0..100_000`, stable for a given seed.
pub(crate) fn short_id(seed: &str) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    seed.hash(&mut hasher);
    hasher.finish() % 100_000
}

/// First `max` characters of `text`, with an ellipsis when truncated.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

/// Capitalize the first letter of each whitespace-separated word.
pub(crate) fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_handlers_cover_all_domains() {
        let registry = builtin_handlers();
        let expected = [
            "calendar.create_event",
            "calendar.delete_event",
            "calendar.delete_events",
            "calendar.find_free_time",
            "calendar.list_events",
            "email.read_inbox",
            "email.search_emails",
            "email.send_email",
            "stock.get_stock_analysis",
            "stock.get_stock_history",
            "stock.get_stock_price",
            "weather.get_forecast",
            "weather.get_weather",
            "whatsapp.get_whatsapp_chats",
            "whatsapp.read_whatsapp_messages",
            "whatsapp.search_whatsapp_messages",
            "whatsapp.send_whatsapp_message",
        ];
        assert_eq!(registry.ids(), expected);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 100), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        // Counts characters, not bytes.
        assert_eq!(truncate("ééé", 2), "éé...");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("project"), "Project");
        assert_eq!(title_case("quarterly REVIEW notes"), "Quarterly Review Notes");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_short_id_stable_and_bounded() {
        let a = short_id("seed");
        assert_eq!(a, short_id("seed"));
        assert!(a < 100_000);
    }
}
