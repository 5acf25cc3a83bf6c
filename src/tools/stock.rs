//! Stock market capability source (mock).
//!
//! Three symbols are covered: AAPL, MSFT, and OPENAI. Quotes and analyst
//! data are fixed; history derives a small per-day offset from the day index
//! instead of random jitter so output is reproducible.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Local};
use serde_json::Value;

use crate::capabilities::HandlerRegistry;

use super::{require_str, ToolResult};

/// Register the stock handlers.
pub fn register(registry: &mut HandlerRegistry) {
    registry.register("stock.get_stock_price", Arc::new(get_stock_price));
    registry.register("stock.get_stock_history", Arc::new(get_stock_history));
    registry.register("stock.get_stock_analysis", Arc::new(get_stock_analysis));
}

// ---------------------------------------------------------------------------
// Sample data
// ---------------------------------------------------------------------------

struct Quote {
    name: &'static str,
    price: f64,
    change: f64,
    change_percent: f64,
}

fn quote(symbol: &str) -> Option<Quote> {
    match symbol {
        "AAPL" => Some(Quote {
            name: "Apple Inc.",
            price: 175.43,
            change: 2.15,
            change_percent: 1.24,
        }),
        "MSFT" => Some(Quote {
            name: "Microsoft Corporation",
            price: 378.85,
            change: -1.25,
            change_percent: -0.33,
        }),
        "OPENAI" => Some(Quote {
            name: "OpenAI",
            price: 45.67,
            change: 0.89,
            change_percent: 1.99,
        }),
        _ => None,
    }
}

struct Analysis {
    name: &'static str,
    rating: &'static str,
    target_price: f64,
    analysts: u32,
    recommendation: &'static str,
    sector: &'static str,
    market_cap: &'static str,
}

fn analysis(symbol: &str) -> Option<Analysis> {
    match symbol {
        "AAPL" => Some(Analysis {
            name: "Apple Inc.",
            rating: "BUY",
            target_price: 185.00,
            analysts: 45,
            recommendation: "Strong Buy",
            sector: "Technology",
            market_cap: "2.8T",
        }),
        "MSFT" => Some(Analysis {
            name: "Microsoft Corporation",
            rating: "HOLD",
            target_price: 385.00,
            analysts: 38,
            recommendation: "Hold",
            sector: "Technology",
            market_cap: "2.9T",
        }),
        "OPENAI" => Some(Analysis {
            name: "OpenAI",
            rating: "BUY",
            target_price: 55.00,
            analysts: 12,
            recommendation: "Strong Buy",
            sector: "AI/Technology",
            market_cap: "90B",
        }),
        _ => None,
    }
}

/// Base price used when synthesizing history for a symbol.
fn base_price(symbol: &str) -> f64 {
    match symbol {
        "AAPL" => 175.0,
        "MSFT" => 375.0,
        _ => 45.0,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Latest price snapshot for a symbol.
pub fn get_stock_price(args: HashMap<String, Value>) -> ToolResult {
    let symbol = require_str(&args, "symbol")?;
    let upper = symbol.to_uppercase();

    let Some(q) = quote(&upper) else {
        return Ok(Value::String(format!(
            "❌ Stock symbol '{}' not found. Available stocks: AAPL (Apple), MSFT (Microsoft), OPENAI",
            symbol
        )));
    };

    let change_symbol = if q.change >= 0.0 { "📈" } else { "📉" };
    Ok(Value::String(format!(
        "📊 **{} ({})**\n\
         💰 **Current Price:** ${:.2}\n\
         {} **Change:** ${:+.2} ({:+.2}%)\n\
         🕐 **Last Updated:** {}",
        q.name,
        upper,
        q.price,
        change_symbol,
        q.change,
        q.change_percent,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )))
}

/// Daily closing prices for the last `days` days, newest first.
pub fn get_stock_history(args: HashMap<String, Value>) -> ToolResult {
    let symbol = require_str(&args, "symbol")?;
    let days = args.get("days").and_then(Value::as_i64).unwrap_or(7).max(1);
    let upper = symbol.to_uppercase();

    let Some(q) = quote(&upper) else {
        return Ok(Value::String(format!(
            "❌ History not available for '{}'. Available stocks: AAPL, MSFT, OPENAI",
            symbol
        )));
    };

    let base = base_price(&upper);
    let now = Local::now();
    let mut prices = Vec::with_capacity(days as usize);
    let mut lines = Vec::with_capacity(days as usize);
    for i in 0..days {
        let date = now - Duration::days(i);
        // Pseudo-variation in the -5..=5 range, derived from the day index.
        let offset = ((i * 7 + 3) % 11 - 5) as f64;
        let price = base + offset;
        prices.push(price);
        lines.push(format!("📅 {}: ${:.2}", date.format("%Y-%m-%d"), price));
    }

    // Newest entry above the oldest decides the reported trend.
    let newest = prices.first().copied().unwrap_or(base);
    let oldest = prices.last().copied().unwrap_or(base);
    let trend = if newest >= oldest { "Upward" } else { "Downward" };

    Ok(Value::String(format!(
        "📊 **{} ({}) - {} Day History**\n{}\n📈 **Trend:** {}",
        q.name,
        upper,
        days,
        lines.join("\n"),
        trend
    )))
}

/// Analyst ratings and recommendation summary for a symbol.
pub fn get_stock_analysis(args: HashMap<String, Value>) -> ToolResult {
    let symbol = require_str(&args, "symbol")?;
    let upper = symbol.to_uppercase();

    let Some(a) = analysis(&upper) else {
        return Ok(Value::String(format!(
            "❌ Analysis not available for '{}'. Available stocks: AAPL, MSFT, OPENAI",
            symbol
        )));
    };

    let rating_emoji = match a.rating {
        "BUY" => "🟢",
        "HOLD" => "🟡",
        _ => "🔴",
    };

    Ok(Value::String(format!(
        "📈 **{} Analysis**\n\
         {} **Rating:** {} - {}\n\
         🎯 **Target Price:** ${:.2}\n\
         👥 **Analysts:** {} covering\n\
         🏢 **Sector:** {}\n\
         💼 **Market Cap:** ${}\n\
         📅 **Analysis Date:** {}",
        a.name,
        rating_emoji,
        a.rating,
        a.recommendation,
        a.target_price,
        a.analysts,
        a.sector,
        a.market_cap,
        Local::now().format("%Y-%m-%d")
    )))
}
