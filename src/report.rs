use std::fmt::Write;

use crate::check_engine::{AlertedProduct, CheckOutcome, CheckStatus};
use crate::models::{HistoryRecord, Product};
use crate::plugins::traits::ChangeType;
use crate::plugins::trackers::format_money;
use crate::plugins::{PriceTracker, TrackerPlugin};

const RULE_WIDTH: usize = 50;

pub fn render_added(product: &Product) -> String {
    format!("Added: '{}' - target price {}", product.name, format_money(product.target_price))
}

pub fn render_removed(name: &str, removed: usize) -> String {
    if removed > 0 {
        format!("Removed: '{}'", name)
    } else {
        format!("Product '{}' not found.", name)
    }
}

pub fn render_product_table(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products being tracked. Use 'add' to start.".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "\n{:<20} {:>8} {:>12} {:<20}", "Name", "Target", "Last Price", "Last Checked");
    let _ = writeln!(out, "{}", "-".repeat(65));

    for product in products {
        let last_price = product
            .last_price
            .map(format_money)
            .unwrap_or_else(|| "Not checked".to_string());
        let last_checked = product
            .last_checked
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "Never".to_string());

        let _ = writeln!(
            out,
            "{:<20} {:>8} {:>12} {:<20}",
            product.name,
            format_money(product.target_price),
            last_price,
            last_checked
        );
    }

    out
}

/// One console line per checked product.
pub fn render_outcome(outcome: &CheckOutcome) -> String {
    let result = match &outcome.status {
        CheckStatus::Failed(e) => format!("FAILED - {}", e),
        CheckStatus::Priced { price, target, alerted: true, .. } => {
            format!("ALERT! {} (target: {}) <- PRICE DROP!", format_money(*price), format_money(*target))
        }
        CheckStatus::Priced { price, target, previous, alerted: false } => {
            let mut line = format!(
                "{} (target: {}, {} above target)",
                format_money(*price),
                format_money(*target),
                format_money(*price - *target)
            );
            if let Some(previous) = previous {
                line.push_str(&render_change(*previous, *price));
            }
            line
        }
    };

    format!("Checking: {}... {}", outcome.name, result)
}

fn render_change(previous: rust_decimal::Decimal, current: rust_decimal::Decimal) -> String {
    let comparison = PriceTracker::new().compare(previous, current);
    if !comparison.changed {
        return String::new();
    }
    let direction = match comparison.change_type {
        ChangeType::Increased => "up",
        _ => "down",
    };

    format!(" [{} {} since last check]", direction, format_money(comparison.difference.abs()))
}

pub fn render_alert_summary(alerts: &[AlertedProduct]) -> String {
    if alerts.is_empty() {
        return "\nNo price alerts triggered.".to_string();
    }

    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "PRICE ALERTS: {} product(s) hit target price!", alerts.len());
    for alert in alerts {
        let _ = writeln!(
            out,
            "  -> {}: {} (target: {})",
            alert.name,
            format_money(alert.price),
            format_money(alert.target_price)
        );
        let _ = writeln!(out, "    {}", alert.url);
    }
    let _ = writeln!(out, "{}", rule);
    out
}

pub fn render_history(records: &[HistoryRecord], name: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nPrice history for: {}", name.unwrap_or("all products"));
    let _ = writeln!(out, "{}", "-".repeat(75));

    if records.is_empty() {
        out.push_str("No history found.");
        return out;
    }

    let _ = writeln!(out, "{:<22} {:<20} {:>8} {:>8} Alert", "Timestamp", "Name", "Price", "Target");
    let _ = writeln!(out, "{}", "-".repeat(75));
    for record in records {
        let _ = writeln!(
            out,
            "{:<22} {:<20} {:>8} {:>8} {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            record.name,
            format_money(record.price),
            format_money(record.target),
            if record.alert_triggered { "YES!" } else { "" }
        );
    }
    out
}
