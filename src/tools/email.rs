//! Email capability source (mock).
//!
//! Simulates a small inbox with mixed read states and priorities. Sending
//! returns a confirmation with a stable message id; search matches a fixed
//! keyword index and falls back to a generic result.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Local;
use serde_json::Value;

use crate::capabilities::HandlerRegistry;

use super::{hours_back, require_str, short_id, title_case, truncate, ToolResult};

/// Register the email handlers.
pub fn register(registry: &mut HandlerRegistry) {
    registry.register("email.send_email", Arc::new(send_email));
    registry.register("email.read_inbox", Arc::new(read_inbox));
    registry.register("email.search_emails", Arc::new(search_emails));
}

// ---------------------------------------------------------------------------
// Sample data
// ---------------------------------------------------------------------------

struct SampleEmail {
    from: &'static str,
    subject: &'static str,
    preview: &'static str,
    unread: bool,
    priority: &'static str,
}

const SAMPLE_INBOX: [SampleEmail; 5] = [
    SampleEmail {
        from: "boss@company.com",
        subject: "Project Update Required",
        preview: "Hi, can you provide an update on the Q4 project status...",
        unread: true,
        priority: "high",
    },
    SampleEmail {
        from: "team@slack.com",
        subject: "New notification from Slack",
        preview: "You have 3 unread messages in #engineering channel...",
        unread: true,
        priority: "normal",
    },
    SampleEmail {
        from: "notifications@github.com",
        subject: "Pull Request Review Requested",
        preview: "johndoe requested your review on PR #142: Add email agent...",
        unread: false,
        priority: "normal",
    },
    SampleEmail {
        from: "news@techcrunch.com",
        subject: "Daily Tech News Digest",
        preview: "Today's top stories: AI breakthrough, new startup funding...",
        unread: false,
        priority: "low",
    },
    SampleEmail {
        from: "client@bigcorp.com",
        subject: "Meeting Confirmation - Tomorrow 2PM",
        preview: "Looking forward to our meeting tomorrow to discuss...",
        unread: true,
        priority: "high",
    },
];

struct SearchHit {
    keyword: &'static str,
    from: &'static str,
    subject: &'static str,
    preview: &'static str,
    relevance: u32,
}

const SEARCH_INDEX: [SearchHit; 4] = [
    SearchHit {
        keyword: "project",
        from: "boss@company.com",
        subject: "Project Update Required",
        preview: "Hi, can you provide an update on the Q4 project status...",
        relevance: 95,
    },
    SearchHit {
        keyword: "project",
        from: "pm@company.com",
        subject: "New Project Assignment",
        preview: "You've been assigned to the new mobile app project...",
        relevance: 90,
    },
    SearchHit {
        keyword: "meeting",
        from: "client@bigcorp.com",
        subject: "Meeting Confirmation - Tomorrow 2PM",
        preview: "Looking forward to our meeting tomorrow to discuss...",
        relevance: 98,
    },
    SearchHit {
        keyword: "review",
        from: "notifications@github.com",
        subject: "Pull Request Review Requested",
        preview: "johndoe requested your review on PR #142...",
        relevance: 92,
    },
];

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Send an email and return a delivery confirmation.
pub fn send_email(args: HashMap<String, Value>) -> ToolResult {
    let to = require_str(&args, "to")?;
    let subject = require_str(&args, "subject")?;
    let body = require_str(&args, "body")?;
    let cc = args.get("cc").and_then(Value::as_str).unwrap_or("");

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let mut result = format!(
        "✅ **Email Sent Successfully!**\n\n\
         📧 **To:** {}\n\
         📝 **Subject:** {}\n\
         💬 **Message:** {}\n\
         ⏰ **Sent:** {}",
        to,
        subject,
        truncate(body, 100),
        timestamp
    );

    if !cc.is_empty() {
        result.push_str(&format!("\n📎 **CC:** {}", cc));
    }

    result.push_str(&format!(
        "\n🔢 **Message ID:** MSG-{}",
        short_id(&format!("{}{}{}", to, subject, timestamp))
    ));

    Ok(Value::String(result))
}

/// Recent inbox messages, optionally unread only.
pub fn read_inbox(args: HashMap<String, Value>) -> ToolResult {
    let limit = args.get("limit").and_then(Value::as_i64).unwrap_or(5).max(0) as usize;
    let filter_unread = args
        .get("filter_unread")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let header = if filter_unread {
        "📬 **Unread Messages**"
    } else {
        "📬 **Your Inbox**"
    };

    let emails: Vec<&SampleEmail> = SAMPLE_INBOX
        .iter()
        .filter(|e| !filter_unread || e.unread)
        .take(limit)
        .collect();

    if emails.is_empty() {
        return Ok(Value::String(
            "📭 **No emails found** matching your criteria.".to_string(),
        ));
    }

    let noun = if emails.len() == 1 { "message" } else { "messages" };
    let mut sections = vec![format!("{} ({} {})\n", header, emails.len(), noun)];

    for (i, email) in emails.iter().enumerate() {
        let status = if email.unread { "🟢" } else { "⚪" };
        let priority_icon = match email.priority {
            "high" => "🔴",
            "normal" => "🟡",
            _ => "",
        };
        sections.push(format!(
            "{}. {} **From:** {} {}\n   📝 **Subject:** {}\n   💬 **Preview:** {}\n   ⏰ **Received:** {}",
            i + 1,
            status,
            email.from,
            priority_icon,
            email.subject,
            email.preview,
            hours_back(3 + 7 * i as i64)
        ));
    }

    Ok(Value::String(sections.join("\n\n")))
}

/// Search emails against the keyword index.
pub fn search_emails(args: HashMap<String, Value>) -> ToolResult {
    let query = require_str(&args, "query")?;
    let search_in = args.get("search_in").and_then(Value::as_str).unwrap_or("all");

    let query_lower = query.to_lowercase();
    let mut hits: Vec<(&str, String, &str, u32)> = SEARCH_INDEX
        .iter()
        .filter(|hit| query_lower.contains(hit.keyword) || hit.keyword.contains(&query_lower))
        .map(|hit| (hit.from, highlight(hit.subject, query), hit.preview, hit.relevance))
        .collect();

    if hits.is_empty() {
        hits.push((
            "notifications@system.com",
            format!("Results for '{}'", query),
            "No exact matches found, showing related results...",
            50,
        ));
    }

    hits.sort_by(|a, b| b.3.cmp(&a.3));

    let scope = if search_in == "all" {
        "everywhere".to_string()
    } else {
        format!("in {}", search_in)
    };
    let noun = if hits.len() == 1 { "email" } else { "emails" };
    let mut sections = vec![
        format!("🔍 **Search Results for '{}' {}**\n", query, scope),
        format!("\nFound {} matching {}:\n", hits.len(), noun),
    ];

    for (i, (from, subject, preview, relevance)) in hits.iter().enumerate() {
        sections.push(format!(
            "{}. 📧 **From:** {}\n   📝 **Subject:** {}\n   💬 **Preview:** {}\n   ⏰ **Received:** {}\n   🎯 **Relevance:** {}%",
            i + 1,
            from,
            subject,
            preview,
            hours_back(5 + 9 * i as i64),
            relevance
        ));
    }

    Ok(Value::String(sections.join("\n\n")))
}

/// Bold the title-cased query wherever it appears in the subject.
fn highlight(subject: &str, query: &str) -> String {
    let titled = title_case(query);
    if titled.is_empty() {
        return subject.to_string();
    }
    subject.replace(&titled, &format!("**{}**", titled))
}
