use super::ui;
use crate::core::RatesView;
use anyhow::Result;
use std::io::Write;

/// Fetches rates once and prints the first page, or every record with `all`.
pub async fn run<W: Write>(
    view: &mut RatesView,
    date: Option<&str>,
    all: bool,
    columns: usize,
    out: &mut W,
) -> Result<()> {
    let spinner = ui::new_spinner("Fetching rates...");
    match date {
        Some(date) => view.on_date_selected(date).await,
        None => view.on_latest_requested().await,
    }
    spinner.finish_and_clear();

    if all {
        while view.render().show_load_more {
            view.on_load_more_clicked();
        }
    }

    write!(out, "{}", ui::render_page(&view.render(), columns))?;
    out.flush()?;
    Ok(())
}
