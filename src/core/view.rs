//! State and event handling for the rates page.
//!
//! [`RatesView`] owns the fetched list and a visible-count cursor into it.
//! The cursor starts at one page, grows a page at a time on scroll or
//! "load more", and is reset whenever a new list is fetched.

use super::rates::{RateRecord, RatesProvider, RatesResponse};
use super::scroll::{DEFAULT_SCROLL_THRESHOLD, ScrollMetrics};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Number of cards revealed per page.
pub const PAGE_SIZE: usize = 12;

/// Surfaces fetch failures to the user.
pub trait Notifier: Send + Sync {
    fn notify_error(&self, error: &anyhow::Error);
}

/// Handle for one issued fetch. Only the most recently issued ticket may
/// update the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
    date: Option<String>,
}

impl LoadTicket {
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What the page shows for the current state.
#[derive(Debug, PartialEq)]
pub struct RenderModel<'a> {
    pub date: &'a str,
    pub loading: bool,
    pub cards: &'a [RateRecord],
    pub total: usize,
    pub show_load_more: bool,
    pub show_empty: bool,
}

pub struct RatesView {
    provider: Arc<dyn RatesProvider>,
    notifier: Arc<dyn Notifier>,
    page_size: usize,
    scroll_threshold: usize,
    rates: Vec<RateRecord>,
    date: String,
    loading: bool,
    // Always within [page_size, max(page_size, rates.len())].
    cursor: usize,
    issued: u64,
}

impl RatesView {
    pub fn new(provider: Arc<dyn RatesProvider>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_settings(provider, notifier, PAGE_SIZE, DEFAULT_SCROLL_THRESHOLD)
    }

    pub fn with_settings(
        provider: Arc<dyn RatesProvider>,
        notifier: Arc<dyn Notifier>,
        page_size: usize,
        scroll_threshold: usize,
    ) -> Self {
        let page_size = page_size.max(1);
        Self {
            provider,
            notifier,
            page_size,
            scroll_threshold,
            rates: Vec::new(),
            date: String::new(),
            loading: false,
            cursor: page_size,
            issued: 0,
        }
    }

    pub fn provider(&self) -> Arc<dyn RatesProvider> {
        Arc::clone(&self.provider)
    }

    pub fn rates(&self) -> &[RateRecord] {
        &self.rates
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of records currently rendered.
    pub fn visible_count(&self) -> usize {
        self.cursor.min(self.rates.len())
    }

    /// Marks the view as loading and issues a ticket for a fetch of `date`.
    pub fn begin_load(&mut self, date: Option<&str>) -> LoadTicket {
        self.issued += 1;
        self.loading = true;
        debug!(seq = self.issued, ?date, "Loading rates");
        LoadTicket {
            seq: self.issued,
            date: date.map(str::to_string),
        }
    }

    /// Applies the outcome of the fetch issued as `ticket`.
    ///
    /// Outcomes of superseded tickets leave the view untouched. Every
    /// failure is logged and reported once, superseded or not.
    pub fn complete_load(&mut self, ticket: LoadTicket, result: Result<RatesResponse>) {
        let current = ticket.seq == self.issued;

        match result {
            Ok(response) if current => {
                debug!(
                    seq = ticket.seq,
                    date = %response.date,
                    count = response.rates.len(),
                    "Rates loaded"
                );
                self.rates = response.rates;
                self.date = response.date;
                self.cursor = self.page_size;
                self.loading = false;
            }
            Ok(_) => {
                debug!(
                    seq = ticket.seq,
                    latest = self.issued,
                    "Discarding superseded rates response"
                );
            }
            Err(e) => {
                error!(error = ?e, seq = ticket.seq, date = ?ticket.date, "Failed to fetch rates");
                self.notifier.notify_error(&e);
                if current {
                    self.loading = false;
                } else {
                    warn!(seq = ticket.seq, "Failure belonged to a superseded request");
                }
            }
        }
    }

    /// Fetches rates for `date` (latest when `None`) and applies the result.
    pub async fn load(&mut self, date: Option<&str>) {
        let ticket = self.begin_load(date);
        let result = self.provider.fetch_rates(ticket.date()).await;
        self.complete_load(ticket, result);
    }

    /// Issues a ticket for a picked date. Empty selections are ignored.
    pub fn request_date(&mut self, date: &str) -> Option<LoadTicket> {
        if date.is_empty() {
            debug!("Ignoring empty date selection");
            return None;
        }
        Some(self.begin_load(Some(date)))
    }

    pub fn request_latest(&mut self) -> LoadTicket {
        self.begin_load(None)
    }

    pub async fn on_date_selected(&mut self, date: &str) {
        if let Some(ticket) = self.request_date(date) {
            let result = self.provider.fetch_rates(ticket.date()).await;
            self.complete_load(ticket, result);
        }
    }

    pub async fn on_latest_requested(&mut self) {
        self.load(None).await;
    }

    /// Reveals one more page. Never fetches.
    pub fn on_scroll_near_bottom(&mut self) {
        if self.rates.is_empty() {
            return;
        }
        let next = (self.cursor + self.page_size)
            .min(self.rates.len())
            .max(self.page_size);
        if next != self.cursor {
            debug!(from = self.cursor, to = next, "Revealing more rates");
        }
        self.cursor = next;
    }

    pub fn on_load_more_clicked(&mut self) {
        self.on_scroll_near_bottom();
    }

    /// Reacts to a scroll reading. Returns whether it was near the bottom.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        let near = metrics.is_near_bottom(self.scroll_threshold);
        if near {
            self.on_scroll_near_bottom();
        }
        near
    }

    pub fn render(&self) -> RenderModel<'_> {
        let visible = self.visible_count();
        RenderModel {
            date: &self.date,
            loading: self.loading,
            cards: &self.rates[..visible],
            total: self.rates.len(),
            show_load_more: visible < self.rates.len(),
            show_empty: self.rates.is_empty() && !self.loading,
        }
    }
}
