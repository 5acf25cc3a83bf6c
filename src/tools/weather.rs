//! Weather capability source (mock).
//!
//! Returns simulated conditions and forecasts; a production build would call
//! a weather API here without changing the handler contract.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::capabilities::HandlerRegistry;

use super::{require_str, ToolResult};

/// Register the weather handlers.
pub fn register(registry: &mut HandlerRegistry) {
    registry.register("weather.get_weather", Arc::new(get_weather));
    registry.register("weather.get_forecast", Arc::new(get_forecast));
}

const CONDITIONS: [&str; 4] = ["sunny", "cloudy", "rainy", "stormy"];

/// Current conditions for a location.
pub fn get_weather(args: HashMap<String, Value>) -> ToolResult {
    let location = require_str(&args, "location")?;
    let temperature = 22;
    Ok(Value::String(format!(
        "The weather in {} is {} with a high of {}°C.",
        location, CONDITIONS[0], temperature
    )))
}

/// Multi-day forecast for a location.
///
/// Conditions cycle through the table by day number; temperatures climb one
/// degree per day from an 18°C base.
pub fn get_forecast(args: HashMap<String, Value>) -> ToolResult {
    let location = require_str(&args, "location")?;
    let days = args.get("days").and_then(Value::as_i64).unwrap_or(3).max(0);

    let forecast: Vec<String> = (1..=days)
        .map(|day| {
            let condition = CONDITIONS[(day as usize) % CONDITIONS.len()];
            let temp = 18 + day;
            format!("Day {}: {}, {}°C", day, condition, temp)
        })
        .collect();

    Ok(Value::String(format!(
        "Weather forecast for {}:\n{}",
        location,
        forecast.join("\n")
    )))
}
