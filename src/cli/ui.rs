use crate::core::{Notifier, RateRecord, RenderModel};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Formats a rate the way a browser's `toLocaleString` would for en-US:
/// grouped thousands and at most three fraction digits.
pub fn format_rate(rate: f64) -> String {
    if !rate.is_finite() {
        return rate.to_string();
    }

    let fixed = format!("{:.3}", rate.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3);
    if rate.is_sign_negative() && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// A single currency card: code, rate, then the display name.
pub fn card_cell(record: &RateRecord) -> Cell {
    Cell::new(format!(
        "{}\n{}\n{}",
        record.currency,
        format_rate(record.rate),
        record.name
    ))
    .set_alignment(CellAlignment::Left)
}

/// Lays cards out in a grid of `columns` cards per row.
pub fn card_grid(cards: &[RateRecord], columns: usize) -> Table {
    let mut table = new_styled_table();
    for row in cards.chunks(columns.max(1)) {
        table.add_row(row.iter().map(card_cell).collect::<Vec<_>>());
    }
    table
}

/// Renders the whole page for a view state.
pub fn render_page(model: &RenderModel<'_>, columns: usize) -> String {
    let date = if model.date.is_empty() {
        "—"
    } else {
        model.date
    };

    let mut output = format!(
        "{}\n{} {}\n",
        style_text("Exchange Rates", StyleType::Title),
        style_text("Rates as of", StyleType::Subtle),
        style_text(date, StyleType::Label)
    );

    if model.loading {
        output.push_str("\nLoading...\n");
    }

    if !model.cards.is_empty() {
        output.push('\n');
        output.push_str(&card_grid(model.cards, columns).to_string());
        output.push('\n');
    }

    if model.show_load_more {
        output.push_str(&format!(
            "\n{} {}\n",
            style_text("[ Load more ]", StyleType::Label),
            style_text(
                &format!("showing {} of {}", model.cards.len(), model.total),
                StyleType::Subtle
            )
        ));
    }

    if model.show_empty {
        output.push_str(&format!(
            "\n{}\n",
            style_text("No rates found.", StyleType::Subtle)
        ));
    }

    output
}

/// Creates a spinner shown while a fetch is in flight.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Reports fetch failures on stderr.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify_error(&self, error: &anyhow::Error) {
        eprintln!(
            "{}",
            style_text(
                &format!("Error fetching rates: {error}. Run with --verbose for details."),
                StyleType::Error
            )
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(currency: &str, rate: f64, name: &str) -> RateRecord {
        RateRecord {
            currency: currency.to_string(),
            rate,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(1.52), "1.52");
        assert_eq!(format_rate(0.85), "0.85");
        assert_eq!(format_rate(149.5), "149.5");
        assert_eq!(format_rate(1298.5), "1,298.5");
        assert_eq!(format_rate(1180.0), "1,180");
        assert_eq!(format_rate(1234567.891), "1,234,567.891");
        assert_eq!(format_rate(7.81234), "7.812");
        assert_eq!(format_rate(0.0), "0");
        assert_eq!(format_rate(-2.5), "-2.5");
    }

    #[test]
    fn test_render_page_with_cards() {
        console::set_colors_enabled(false);
        let cards = vec![
            record("AUD", 1.52, "Australian Dollar"),
            record("EUR", 0.92, "Euro"),
        ];
        let model = RenderModel {
            date: "2025-11-15",
            loading: false,
            cards: &cards,
            total: 14,
            show_load_more: true,
            show_empty: false,
        };

        let page = render_page(&model, 4);
        assert!(page.contains("Exchange Rates"));
        assert!(page.contains("2025-11-15"));
        assert!(page.contains("AUD"));
        assert!(page.contains("1.52"));
        assert!(page.contains("Euro"));
        assert!(page.contains("Load more"));
        assert!(page.contains("showing 2 of 14"));
        assert!(!page.contains("No rates found"));
        assert!(!page.contains("Loading..."));
    }

    #[test]
    fn test_render_page_empty_and_loading() {
        console::set_colors_enabled(false);
        let empty = RenderModel {
            date: "",
            loading: false,
            cards: &[],
            total: 0,
            show_load_more: false,
            show_empty: true,
        };
        let page = render_page(&empty, 4);
        assert!(page.contains("No rates found."));
        assert!(page.contains("—"));
        assert!(!page.contains("Load more"));

        let loading = RenderModel {
            loading: true,
            show_empty: false,
            ..empty
        };
        let page = render_page(&loading, 4);
        assert!(page.contains("Loading..."));
        assert!(!page.contains("No rates found."));
    }

    #[test]
    fn test_card_grid_rows() {
        let cards: Vec<_> = (0..6)
            .map(|i| record(&format!("C{i}"), 1.0, "Currency"))
            .collect();
        assert_eq!(card_grid(&cards, 4).row_count(), 2);
        assert_eq!(card_grid(&cards, 3).row_count(), 2);
        assert_eq!(card_grid(&cards, 0).row_count(), 6);
    }
}
