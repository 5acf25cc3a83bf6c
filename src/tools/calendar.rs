//! Calendar capability source.
//!
//! Mock scheduling tools over a fixed sample agenda. Event dates are
//! expressed as day offsets from the current date so the agenda always sits
//! in the near future.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate, NaiveTime};
use serde_json::Value;

use crate::capabilities::HandlerRegistry;

use super::{require_str, short_id, title_case, ToolResult};

/// Register the calendar handlers.
pub fn register(registry: &mut HandlerRegistry) {
    registry.register("calendar.list_events", Arc::new(list_events));
    registry.register("calendar.create_event", Arc::new(create_event));
    registry.register("calendar.find_free_time", Arc::new(find_free_time));
    registry.register("calendar.delete_event", Arc::new(delete_event));
    registry.register("calendar.delete_events", Arc::new(delete_events));
}

// ---------------------------------------------------------------------------
// Sample agenda
// ---------------------------------------------------------------------------

struct SampleEvent {
    title: &'static str,
    offset_days: i64,
    hour: u32,
    minute: u32,
    duration_minutes: i64,
    attendees: u32,
    calendar: &'static str,
    kind: &'static str,
}

const SAMPLE_EVENTS: [SampleEvent; 5] = [
    SampleEvent {
        title: "Team Standup",
        offset_days: 1,
        hour: 9,
        minute: 0,
        duration_minutes: 30,
        attendees: 5,
        calendar: "Work",
        kind: "meeting",
    },
    SampleEvent {
        title: "Project Review with Stakeholders",
        offset_days: 1,
        hour: 14,
        minute: 0,
        duration_minutes: 60,
        attendees: 8,
        calendar: "Work",
        kind: "meeting",
    },
    SampleEvent {
        title: "Dentist Appointment",
        offset_days: 2,
        hour: 10,
        minute: 30,
        duration_minutes: 60,
        attendees: 1,
        calendar: "Personal",
        kind: "appointment",
    },
    SampleEvent {
        title: "Coffee with Sarah",
        offset_days: 3,
        hour: 15,
        minute: 0,
        duration_minutes: 45,
        attendees: 2,
        calendar: "Personal",
        kind: "social",
    },
    SampleEvent {
        title: "Quarterly Planning Meeting",
        offset_days: 5,
        hour: 10,
        minute: 0,
        duration_minutes: 120,
        attendees: 12,
        calendar: "Work",
        kind: "meeting",
    },
];

impl SampleEvent {
    fn icon(&self) -> &'static str {
        match self.kind {
            "meeting" => "🤝",
            "appointment" => "📍",
            _ => "☕",
        }
    }

    fn start(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }

    fn end(&self) -> String {
        let total = (self.hour * 60 + self.minute) as i64 + self.duration_minutes;
        format!("{:02}:{:02}", (total / 60) % 24, total % 60)
    }
}

// ---------------------------------------------------------------------------
// list_events
// ---------------------------------------------------------------------------

/// List upcoming calendar events, optionally limited to one calendar.
pub fn list_events(args: HashMap<String, Value>) -> ToolResult {
    let days_ahead = args.get("days_ahead").and_then(Value::as_i64).unwrap_or(7);
    let calendar_name = args
        .get("calendar_name")
        .and_then(Value::as_str)
        .unwrap_or("all");
    let all_calendars = calendar_name.eq_ignore_ascii_case("all");

    let events: Vec<&SampleEvent> = SAMPLE_EVENTS
        .iter()
        .filter(|e| e.offset_days <= days_ahead)
        .filter(|e| all_calendars || e.calendar.eq_ignore_ascii_case(calendar_name))
        .collect();

    if events.is_empty() {
        let scope = if all_calendars {
            String::new()
        } else {
            format!(" for {} calendar", calendar_name)
        };
        return Ok(Value::String(format!(
            "📭 **No events found** in the next {} days{}.",
            days_ahead, scope
        )));
    }

    let mut header = format!("📅 **Your Upcoming Events (Next {} Days)**", days_ahead);
    if !all_calendars {
        header.push_str(&format!(" - {} Calendar", calendar_name));
    }
    let mut lines = vec![format!("{}\n", header)];

    // Sample events are ordered by offset, so consecutive grouping is enough.
    let mut groups: Vec<(i64, Vec<&SampleEvent>)> = Vec::new();
    for &event in &events {
        match groups.last_mut() {
            Some((offset, group)) if *offset == event.offset_days => group.push(event),
            _ => groups.push((event.offset_days, vec![event])),
        }
    }

    let today = Local::now().date_naive();
    for (offset, group) in &groups {
        let date = today + Duration::days(*offset);
        let label = match offset {
            0 => "Today".to_string(),
            1 => "Tomorrow".to_string(),
            _ => date.format("%A").to_string(),
        };
        lines.push(format!("**{}, {}:**", label, date.format("%B %d, %Y")));

        for (i, event) in group.iter().enumerate() {
            let noun = if event.attendees == 1 { "attendee" } else { "attendees" };
            lines.push(format!(
                "{}. {} **{} - {}** | {}",
                i + 1,
                event.icon(),
                event.start(),
                event.end(),
                event.title
            ));
            lines.push(format!(
                "   👥 {} {} • 📁 {}",
                event.attendees, noun, event.calendar
            ));
        }
        lines.push(String::new());
    }

    let total_minutes: i64 = events.iter().map(|e| e.duration_minutes).sum();
    lines.push(format!(
        "📊 **Summary:** {} events • {:.1} hours scheduled",
        events.len(),
        total_minutes as f64 / 60.0
    ));

    Ok(Value::String(lines.join("\n")))
}

// ---------------------------------------------------------------------------
// create_event
// ---------------------------------------------------------------------------

/// Create a new calendar event (mock confirmation).
pub fn create_event(args: HashMap<String, Value>) -> ToolResult {
    let title = require_str(&args, "title")?;
    let date = require_str(&args, "date")?;
    let time = require_str(&args, "time")?;
    let duration_minutes = args
        .get("duration_minutes")
        .and_then(Value::as_i64)
        .unwrap_or(60);
    let attendees = args.get("attendees").and_then(Value::as_str).unwrap_or("");

    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .zip(NaiveTime::parse_from_str(time, "%H:%M").ok());
    let Some((event_date, event_time)) = parsed else {
        return Ok(Value::String(
            "❌ Invalid date or time format. Use YYYY-MM-DD for date and HH:MM for time."
                .to_string(),
        ));
    };

    let start = event_date.and_time(event_time);
    let end = start + Duration::minutes(duration_minutes);

    let mut result = format!(
        "✅ **Event Created Successfully!**\n\n\
         📅 **Title:** {}\n\
         📆 **Date:** {}\n\
         🕐 **Time:** {} - {}\n\
         ⏱️  **Duration:** {} minutes\n\
         🔗 **Event ID:** EVT-{}",
        title,
        start.format("%A, %B %d, %Y"),
        start.format("%I:%M %p"),
        end.format("%I:%M %p"),
        duration_minutes,
        short_id(&format!("{}{}{}", title, date, time))
    );

    if !attendees.is_empty() {
        let list: Vec<&str> = attendees.split(',').collect();
        result.push_str(&format!("\n👥 **Attendees ({}):**", list.len()));
        for attendee in list {
            result.push_str(&format!("\n   • {}", attendee.trim()));
        }
    }

    result.push_str("\n\n📁 **Calendar:** Default");
    result.push_str("\n🔔 **Reminder:** 15 minutes before");

    Ok(Value::String(result))
}

// ---------------------------------------------------------------------------
// find_free_time
// ---------------------------------------------------------------------------

fn slot_times(preference: &str) -> Vec<NaiveTime> {
    let pairs: &[(u32, u32)] = match preference {
        "morning" => &[(8, 0), (9, 30), (11, 0)],
        "afternoon" => &[(13, 0), (14, 30), (16, 0)],
        "evening" => &[(17, 30), (18, 30), (19, 30)],
        _ => &[
            (8, 0),
            (9, 30),
            (11, 0),
            (13, 0),
            (14, 30),
            (16, 0),
            (17, 30),
            (19, 0),
        ],
    };
    pairs
        .iter()
        .filter_map(|&(h, m)| NaiveTime::from_hms_opt(h, m, 0))
        .collect()
}

/// Suggest free time slots on a given date (mock availability).
pub fn find_free_time(args: HashMap<String, Value>) -> ToolResult {
    let date = require_str(&args, "date")?;
    let duration_minutes = args
        .get("duration_minutes")
        .and_then(Value::as_i64)
        .unwrap_or(60);
    let mut preference = args
        .get("preferred_time")
        .and_then(Value::as_str)
        .unwrap_or("any")
        .to_lowercase();
    if !matches!(preference.as_str(), "morning" | "afternoon" | "evening" | "any") {
        preference = "any".to_string();
    }

    let check_date = if date.eq_ignore_ascii_case("today") {
        Local::now().date_naive()
    } else if date.eq_ignore_ascii_case("tomorrow") {
        Local::now().date_naive() + Duration::days(1)
    } else {
        match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                return Ok(Value::String(
                    "❌ Invalid date format. Use YYYY-MM-DD, 'today', or 'tomorrow'.".to_string(),
                ))
            }
        }
    };

    let mut sections = vec![format!(
        "🕐 **Available Time Slots**\n\n\
         📅 **Date:** {}\n\
         ⏱️  **Duration needed:** {} minutes\n\
         🎯 **Preference:** {}",
        check_date.format("%A, %B %d, %Y"),
        duration_minutes,
        title_case(&preference)
    )];

    sections.push("\n\n**Available slots:**\n".to_string());
    for start in slot_times(&preference) {
        let end = start + Duration::minutes(duration_minutes);
        sections.push(format!(
            "✅ **{} - {}** ({} min)",
            start.format("%I:%M %p"),
            end.format("%I:%M %p"),
            duration_minutes
        ));
    }

    sections.push("\n\n💡 **Recommendations:**".to_string());
    let tips = match preference.as_str() {
        "morning" => [
            "• Morning slots are best for focused work",
            "• Earlier times have less scheduling conflicts",
        ],
        "afternoon" => [
            "• Afternoon slots work well for collaborative meetings",
            "• Post-lunch time is good for discussions",
        ],
        "evening" => [
            "• Evening slots are ideal for flexible schedules",
            "• Good for international team meetings",
        ],
        _ => [
            "• Consider attendee time zones when choosing",
            "• Morning slots typically have better availability",
        ],
    };
    sections.extend(tips.iter().map(|t| t.to_string()));

    sections.push("\n📝 **Tip:** Use create_event to schedule one of these slots!".to_string());

    Ok(Value::String(sections.join("\n")))
}

// ---------------------------------------------------------------------------
// delete_event
// ---------------------------------------------------------------------------

struct KnownEvent {
    id: &'static str,
    title: &'static str,
    date: &'static str,
    time: &'static str,
    attendees: [&'static str; 2],
}

const KNOWN_EVENTS: [KnownEvent; 2] = [
    KnownEvent {
        id: "EVT-12345",
        title: "Team Standup",
        date: "Monday, October 25, 2025",
        time: "09:00 AM",
        attendees: ["john@example.com", "sarah@example.com"],
    },
    KnownEvent {
        id: "EVT-67890",
        title: "Project Review",
        date: "Tuesday, October 26, 2025",
        time: "02:00 PM",
        attendees: ["manager@example.com", "team@example.com"],
    },
];

fn deleted_event_block(event: &KnownEvent) -> String {
    let mut result = format!(
        "✅ **Event Deleted Successfully!**\n\n\
         🗑️  **Event ID:** {}\n\
         📅 **Title:** {}\n\
         📆 **Was scheduled for:** {} at {}",
        event.id, event.title, event.date, event.time
    );
    result.push_str(&format!(
        "\n👥 **Attendees notified ({}):**",
        event.attendees.len()
    ));
    for attendee in event.attendees {
        result.push_str(&format!("\n   • {}", attendee));
    }
    result
}

/// Delete a single event by id or title (mock confirmation).
pub fn delete_event(args: HashMap<String, Value>) -> ToolResult {
    let event_id = args.get("event_id").and_then(Value::as_str).unwrap_or("");
    let title = args.get("title").and_then(Value::as_str).unwrap_or("");

    if event_id.is_empty() && title.is_empty() {
        return Ok(Value::String(
            "❌ **Error:** Please provide either an event_id or title to delete.".to_string(),
        ));
    }

    if !event_id.is_empty() {
        let Some(event) = KNOWN_EVENTS.iter().find(|e| e.id == event_id) else {
            // Unknown ids still delete cleanly in the mock.
            return Ok(Value::String(format!(
                "✅ **Event Deleted Successfully!**\n\n\
                 🗑️  **Event ID:** {}\n\
                 📅 **Title:** Unknown Event\n\
                 ⏰ **Status:** Removed from calendar\n\n\
                 💡 **Note:** Event and all notifications have been cancelled.",
                event_id
            )));
        };

        let mut result = deleted_event_block(event);
        result.push_str("\n\n💡 **Note:** Cancellation emails have been sent to all attendees.");
        return Ok(Value::String(result));
    }

    let title_lower = title.to_lowercase();
    let matching: Vec<&KnownEvent> = KNOWN_EVENTS
        .iter()
        .filter(|e| e.title.to_lowercase().contains(&title_lower))
        .collect();

    let Some(event) = matching.first() else {
        return Ok(Value::String(format!(
            "✅ **Event Deleted Successfully!**\n\n\
             📅 **Title:** {}\n\
             🗑️  **Status:** Event removed from calendar\n\
             ⏰ **Deleted:** {}\n\n\
             💡 **Note:** If there were multiple events with this title, only the first \
             occurrence was deleted.",
            title,
            Local::now().format("%Y-%m-%d %H:%M:%S")
        )));
    };

    let mut result = deleted_event_block(event);
    if matching.len() > 1 {
        result.push_str(&format!(
            "\n\n⚠️  **Note:** Found {} events matching '{}'. Only the first was deleted.",
            matching.len(),
            title
        ));
    }
    result.push_str("\n\n💡 **Note:** Cancellation emails have been sent to all attendees.");
    Ok(Value::String(result))
}

// ---------------------------------------------------------------------------
// delete_events
// ---------------------------------------------------------------------------

/// Bulk-delete events in a date range; requires an explicit confirm flag.
pub fn delete_events(args: HashMap<String, Value>) -> ToolResult {
    let date_from = args.get("date_from").and_then(Value::as_str).unwrap_or("");
    let date_to = args.get("date_to").and_then(Value::as_str).unwrap_or("");
    let calendar_name = args
        .get("calendar_name")
        .and_then(Value::as_str)
        .unwrap_or("all");
    let confirm = args.get("confirm").and_then(Value::as_bool).unwrap_or(false);

    if date_from.is_empty() || date_to.is_empty() {
        return Ok(Value::String(
            "❌ **Error:** Please provide both date_from and date_to in YYYY-MM-DD format."
                .to_string(),
        ));
    }

    if !confirm {
        let scope = if calendar_name.eq_ignore_ascii_case("all") {
            String::new()
        } else {
            format!(" in {} calendar", calendar_name)
        };
        return Ok(Value::String(format!(
            "⚠️  **Confirmation Required**\n\n\
             You are about to delete **all events** from {} to {}{}.\n\n\
             This action cannot be undone!\n\n\
             To proceed, call this function again with `confirm` set to `true`:\n\
             ```\n\
             delete_events({{\n  \
               \"date_from\": \"{}\",\n  \
               \"date_to\": \"{}\",\n  \
               \"calendar_name\": \"{}\",\n  \
               \"confirm\": true\n\
             }})\n\
             ```",
            date_from, date_to, scope, date_from, date_to, calendar_name
        )));
    }

    let parsed = NaiveDate::parse_from_str(date_from, "%Y-%m-%d")
        .ok()
        .zip(NaiveDate::parse_from_str(date_to, "%Y-%m-%d").ok());
    let Some((start_date, end_date)) = parsed else {
        return Ok(Value::String(
            "❌ **Error:** Invalid date format. Please use YYYY-MM-DD format.".to_string(),
        ));
    };

    if end_date < start_date {
        return Ok(Value::String(
            "❌ **Error:** End date must be after start date.".to_string(),
        ));
    }

    let days_span = (end_date - start_date).num_days() + 1;
    let estimated = (days_span * 2).max(1);
    let meetings = estimated / 2;
    let appointments = estimated / 3;

    let calendar_label = if calendar_name.eq_ignore_ascii_case("all") {
        "All calendars"
    } else {
        calendar_name
    };

    Ok(Value::String(format!(
        "✅ **Bulk Delete Completed Successfully!**\n\n\
         📅 **Date Range:** {} - {}\n\
         🗑️  **Events Deleted:** {}\n\
         📁 **Calendar:** {}\n\
         ⏰ **Deleted at:** {}\n\n\
         📊 **Breakdown:**\n   \
         • Meetings: {}\n   \
         • Appointments: {}\n   \
         • Other events: {}\n\n\
         👥 **Notifications sent to all attendees**",
        start_date.format("%B %d, %Y"),
        end_date.format("%B %d, %Y"),
        estimated,
        calendar_label,
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        meetings,
        appointments,
        estimated - meetings - appointments
    )))
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

    fn text(result: ToolResult) -> String {
        match result.unwrap() {
            Value::String(s) => s,
            other => panic!("expected string output, got {}", other),
        }
    }

    #[test]
    fn test_create_event_basic() {
        let out = text(create_event(args(&[
            ("title", json!("Team Sync")),
            ("date", json!("2025-10-25")),
            ("time", json!("09:00")),
            ("duration_minutes", json!(30)),
        ])));
        assert!(out.starts_with("✅ **Event Created Successfully!**"));
        assert!(out.contains("📅 **Title:** Team Sync"));
        assert!(out.contains("📆 **Date:** Saturday, October 25, 2025"));
        assert!(out.contains("🕐 **Time:** 09:00 AM - 09:30 AM"));
        assert!(out.contains("⏱️  **Duration:** 30 minutes"));
        assert!(out.contains("🔗 **Event ID:** EVT-"));
        assert!(out.ends_with("🔔 **Reminder:** 15 minutes before"));
        assert!(!out.contains("👥"));
    }

    #[test]
    fn test_create_event_with_attendees() {
        let out = text(create_event(args(&[
            ("title", json!("Planning")),
            ("date", json!("2025-11-03")),
            ("time", json!("13:30")),
            ("attendees", json!("a@example.com, b@example.com")),
        ])));
        assert!(out.contains("👥 **Attendees (2):**"));
        assert!(out.contains("\n   • a@example.com"));
        assert!(out.contains("\n   • b@example.com"));
        // Default duration when none is given.
        assert!(out.contains("🕐 **Time:** 01:30 PM - 02:30 PM"));
    }

    #[test]
    fn test_create_event_invalid_date() {
        let out = text(create_event(args(&[
            ("title", json!("Sync")),
            ("date", json!("10/25/2025")),
            ("time", json!("09:00")),
        ])));
        assert_eq!(
            out,
            "❌ Invalid date or time format. Use YYYY-MM-DD for date and HH:MM for time."
        );
    }

    #[test]
    fn test_list_events_window() {
        let out = text(list_events(args(&[("days_ahead", json!(2))])));
        assert!(out.starts_with("📅 **Your Upcoming Events (Next 2 Days)**"));
        assert!(out.contains("**Tomorrow, "));
        assert!(out.contains("1. 🤝 **09:00 - 09:30** | Team Standup"));
        assert!(out.contains("2. 🤝 **14:00 - 15:00** | Project Review with Stakeholders"));
        assert!(out.contains("1. 📍 **10:30 - 11:30** | Dentist Appointment"));
        assert!(out.contains("   👥 1 attendee • 📁 Personal"));
        assert!(!out.contains("Coffee with Sarah"));
        assert!(out.ends_with("📊 **Summary:** 3 events • 2.5 hours scheduled"));
    }

    #[test]
    fn test_list_events_calendar_filter() {
        let out = text(list_events(args(&[("calendar_name", json!("Personal"))])));
        assert!(out.contains(" - Personal Calendar"));
        assert!(out.contains("Dentist Appointment"));
        assert!(out.contains("1. ☕ **15:00 - 15:45** | Coffee with Sarah"));
        assert!(!out.contains("Team Standup"));
        assert!(out.ends_with("📊 **Summary:** 2 events • 1.8 hours scheduled"));
    }

    #[test]
    fn test_list_events_empty_window() {
        let out = text(list_events(args(&[("days_ahead", json!(0))])));
        assert_eq!(out, "📭 **No events found** in the next 0 days.");
    }

    #[test]
    fn test_find_free_time_morning() {
        let out = text(find_free_time(args(&[
            ("date", json!("2025-10-25")),
            ("preferred_time", json!("Morning")),
        ])));
        assert!(out.contains("📅 **Date:** Saturday, October 25, 2025"));
        assert!(out.contains("🎯 **Preference:** Morning"));
        assert!(out.contains("✅ **08:00 AM - 09:00 AM** (60 min)"));
        assert!(out.contains("✅ **09:30 AM - 10:30 AM** (60 min)"));
        assert!(out.contains("✅ **11:00 AM - 12:00 PM** (60 min)"));
        assert_eq!(out.matches("✅ **").count(), 3);
        assert!(out.contains("• Morning slots are best for focused work"));
        assert!(out.ends_with("📝 **Tip:** Use create_event to schedule one of these slots!"));
    }

    #[test]
    fn test_find_free_time_defaults_to_any() {
        let out = text(find_free_time(args(&[
            ("date", json!("2025-10-25")),
            ("preferred_time", json!("whenever")),
        ])));
        assert!(out.contains("🎯 **Preference:** Any"));
        assert_eq!(out.matches("✅ **").count(), 8);
        assert!(out.contains("• Consider attendee time zones when choosing"));
    }

    #[test]
    fn test_find_free_time_tomorrow() {
        let out = text(find_free_time(args(&[
            ("date", json!("tomorrow")),
            ("duration_minutes", json!(45)),
        ])));
        assert!(out.contains("⏱️  **Duration needed:** 45 minutes"));
        assert!(out.contains("(45 min)"));
        assert!(out.contains("**Available slots:**"));
    }

    #[test]
    fn test_find_free_time_invalid_date() {
        let out = text(find_free_time(args(&[("date", json!("October 25"))])));
        assert_eq!(out, "❌ Invalid date format. Use YYYY-MM-DD, 'today', or 'tomorrow'.");
    }

    #[test]
    fn test_delete_event_requires_identifier() {
        let out = text(delete_event(HashMap::new()));
        assert_eq!(
            out,
            "❌ **Error:** Please provide either an event_id or title to delete."
        );
    }

    #[test]
    fn test_delete_event_known_id() {
        let out = text(delete_event(args(&[("event_id", json!("EVT-12345"))])));
        assert!(out.contains("🗑️  **Event ID:** EVT-12345"));
        assert!(out.contains("📅 **Title:** Team Standup"));
        assert!(out.contains("📆 **Was scheduled for:** Monday, October 25, 2025 at 09:00 AM"));
        assert!(out.contains("👥 **Attendees notified (2):**"));
        assert!(out.contains("\n   • john@example.com"));
        assert!(out.ends_with("💡 **Note:** Cancellation emails have been sent to all attendees."));
    }

    #[test]
    fn test_delete_event_unknown_id() {
        let out = text(delete_event(args(&[("event_id", json!("EVT-99999"))])));
        assert!(out.contains("🗑️  **Event ID:** EVT-99999"));
        assert!(out.contains("📅 **Title:** Unknown Event"));
        assert!(out.contains("⏰ **Status:** Removed from calendar"));
    }

    #[test]
    fn test_delete_event_by_title() {
        let out = text(delete_event(args(&[("title", json!("project"))])));
        assert!(out.contains("🗑️  **Event ID:** EVT-67890"));
        assert!(out.contains("📅 **Title:** Project Review"));

        let multi = text(delete_event(args(&[("title", json!("e"))])));
        assert!(multi.contains("🗑️  **Event ID:** EVT-12345"));
        assert!(multi.contains("⚠️  **Note:** Found 2 events matching 'e'. Only the first was deleted."));

        let none = text(delete_event(args(&[("title", json!("yoga"))])));
        assert!(none.contains("📅 **Title:** yoga"));
        assert!(none.contains("🗑️  **Status:** Event removed from calendar"));
    }

    #[test]
    fn test_delete_events_confirmation_gate() {
        let out = text(delete_events(args(&[
            ("date_from", json!("2025-10-25")),
            ("date_to", json!("2025-10-30")),
        ])));
        assert!(out.starts_with("⚠️  **Confirmation Required**"));
        assert!(out.contains("from 2025-10-25 to 2025-10-30."));
        assert!(out.contains("\"confirm\": true"));

        let missing = text(delete_events(args(&[("date_from", json!("2025-10-25"))])));
        assert_eq!(
            missing,
            "❌ **Error:** Please provide both date_from and date_to in YYYY-MM-DD format."
        );
    }

    #[test]
    fn test_delete_events_confirmed() {
        let out = text(delete_events(args(&[
            ("date_from", json!("2025-10-25")),
            ("date_to", json!("2025-10-30")),
            ("confirm", json!(true)),
        ])));
        assert!(out.starts_with("✅ **Bulk Delete Completed Successfully!**"));
        assert!(out.contains("📅 **Date Range:** October 25, 2025 - October 30, 2025"));
        assert!(out.contains("🗑️  **Events Deleted:** 12"));
        assert!(out.contains("• Meetings: 6"));
        assert!(out.contains("• Appointments: 4"));
        assert!(out.contains("• Other events: 2"));
        assert!(out.contains("📁 **Calendar:** All calendars"));

        let backwards = text(delete_events(args(&[
            ("date_from", json!("2025-10-30")),
            ("date_to", json!("2025-10-25")),
            ("confirm", json!(true)),
        ])));
        assert_eq!(backwards, "❌ **Error:** End date must be after start date.");
    }
}
