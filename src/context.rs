//! System-prompt tool context generation.
//!
//! Capability lists change as manifests are added or removed, so the tool
//! section of an agent's system prompt is generated from catalog metadata
//! instead of being maintained by hand in each descriptor. The agent's
//! `instructions` text itself is never modified; the generated context is
//! appended after a separator when the prompt is built.

use crate::capabilities::capability::Capability;

/// Separator between the agent's own instructions and the tool context.
const SECTION_SEPARATOR_WIDTH: usize = 80;

/// Generate the full tool documentation section for a system prompt.
///
/// Capabilities are grouped by domain (sorted), one `- **name**: description`
/// line each, followed by usage guidelines. Returns an empty string for an
/// empty capability list.
pub fn tool_context(capabilities: &[Capability]) -> String {
    if capabilities.is_empty() {
        return String::new();
    }

    let mut domains: Vec<&str> = capabilities
        .iter()
        .map(|c| c.meta.domain.as_str())
        .collect();
    domains.sort_unstable();
    domains.dedup();

    let mut sections = vec![
        "## AVAILABLE TOOLS\n".to_string(),
        "You have access to the following tools:\n".to_string(),
    ];

    for domain in domains {
        sections.push(format!("\n### {} TOOLS", domain.to_uppercase()));
        for cap in capabilities.iter().filter(|c| c.meta.domain == domain) {
            sections.push(format!("- **{}**: {}", cap.meta.name, cap.meta.description));
        }
    }

    sections.push("\n## USAGE GUIDELINES\n".to_string());
    sections.push("- Use the appropriate tool based on the user's question".to_string());
    sections.push(
        "- When asked about your capabilities or tools, mention ALL tools listed above from all domains"
            .to_string(),
    );
    sections.push("- Always provide clear, well-formatted responses".to_string());
    sections.push("- If unsure which tool to use, ask the user for clarification".to_string());

    sections.join("\n")
}

/// Generate a compact one-line-per-tool listing.
pub fn compact_tool_context(capabilities: &[Capability]) -> String {
    if capabilities.is_empty() {
        return String::new();
    }

    let lines: Vec<String> = capabilities
        .iter()
        .map(|c| format!("- {}: {}", c.meta.name, c.meta.description))
        .collect();

    format!("## Available Tools\n{}", lines.join("\n"))
}

/// Append the generated tool context to the agent's instructions.
///
/// The instructions pass through unchanged when there are no capabilities.
pub fn with_tool_context(instructions: &str, capabilities: &[Capability], compact: bool) -> String {
    let context = if compact {
        compact_tool_context(capabilities)
    } else {
        tool_context(capabilities)
    };

    if context.is_empty() {
        return instructions.to_string();
    }

    let separator = format!("\n\n{}\n\n", "=".repeat(SECTION_SEPARATOR_WIDTH));
    format!("{}{}{}", instructions, separator, context)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::capability::{CapabilityMeta, HandlerFn};
    use std::sync::Arc;

    fn make_cap(domain: &str, name: &str, description: &str) -> Capability {
        let handler: HandlerFn = Arc::new(|_| Ok(serde_json::Value::Null));
        let meta = CapabilityMeta::new(domain, name).with_description(description);
        Capability::new(meta, handler).unwrap()
    }

    #[test]
    fn test_tool_context_groups_by_domain() {
        let caps = vec![
            make_cap("weather", "get_weather", "Current conditions"),
            make_cap("stock", "get_stock_price", "Latest price"),
            make_cap("weather", "get_forecast", "Multi-day forecast"),
        ];

        let context = tool_context(&caps);
        assert!(context.starts_with("## AVAILABLE TOOLS"));
        assert!(context.contains("### STOCK TOOLS"));
        assert!(context.contains("### WEATHER TOOLS"));
        assert!(context.contains("- **get_weather**: Current conditions"));
        assert!(context.contains("- **get_forecast**: Multi-day forecast"));
        assert!(context.contains("## USAGE GUIDELINES"));

        // Domain sections come out sorted.
        let stock_pos = context.find("### STOCK TOOLS").unwrap();
        let weather_pos = context.find("### WEATHER TOOLS").unwrap();
        assert!(stock_pos < weather_pos);
    }

    #[test]
    fn test_tool_context_empty_list() {
        assert_eq!(tool_context(&[]), "");
    }

    #[test]
    fn test_compact_tool_context() {
        let caps = vec![make_cap("weather", "get_weather", "Current conditions")];
        let compact = compact_tool_context(&caps);
        assert_eq!(
            compact,
            "## Available Tools\n- get_weather: Current conditions"
        );
    }

    #[test]
    fn test_with_tool_context_appends_after_separator() {
        let caps = vec![make_cap("weather", "get_weather", "Current conditions")];
        let prompt = with_tool_context("You are a weather assistant.", &caps, false);

        assert!(prompt.starts_with("You are a weather assistant."));
        assert!(prompt.contains(&"=".repeat(80)));
        assert!(prompt.contains("## AVAILABLE TOOLS"));
    }

    #[test]
    fn test_with_tool_context_passthrough_when_no_capabilities() {
        let prompt = with_tool_context("Just instructions.", &[], false);
        assert_eq!(prompt, "Just instructions.");
    }
}
