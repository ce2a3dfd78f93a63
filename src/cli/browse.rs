//! Interactive rates browser.
//!
//! The rendered page is treated as a document scrolled through a
//! terminal-sized viewport. Scrolling publishes readings on a
//! [`ScrollSource`]; the view's listener reveals another page of cards when
//! a reading lands near the bottom. Fetches run as spawned tasks so the page
//! stays responsive while a request is in flight.

use super::ui::{self, StyleType};
use super::parse_date;
use crate::core::config::AppConfig;
use crate::core::{
    LoadTicket, Notifier, RatesProvider, RatesResponse, RatesView, ScrollMetrics, ScrollSource,
};
use anyhow::Result;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

const HELP: &str = "[m]ore  [s]croll  [u]p  [d]ate YYYY-MM-DD  [l]atest  [h]elp  [q]uit";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
// Notices plus the status line and the input line.
const RESERVED_LINES: usize = 3;
/// How long a quitting session waits for in-flight fetches before aborting them.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    More,
    ScrollDown,
    ScrollUp,
    Date(String),
    Latest,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, arg) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, arg)| (word, arg.trim()));

        match word.to_lowercase().as_str() {
            "" | "s" | "scroll" => Command::ScrollDown,
            "u" | "up" => Command::ScrollUp,
            "m" | "more" => Command::More,
            "d" | "date" => Command::Date(arg.to_string()),
            "l" | "latest" => Command::Latest,
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// Window onto the rendered page, in lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub scroll_top: usize,
    pub height: usize,
    pub document_height: usize,
}

impl Viewport {
    pub fn new(height: usize) -> Self {
        Self {
            scroll_top: 0,
            height: height.max(1),
            document_height: 0,
        }
    }

    fn max_top(&self) -> usize {
        self.document_height.saturating_sub(self.height)
    }

    pub fn set_document_height(&mut self, lines: usize) {
        self.document_height = lines;
        self.scroll_top = self.scroll_top.min(self.max_top());
    }

    pub fn scroll_down(&mut self) -> ScrollMetrics {
        self.scroll_top = (self.scroll_top + self.height).min(self.max_top());
        self.metrics()
    }

    pub fn scroll_up(&mut self) -> ScrollMetrics {
        self.scroll_top = self.scroll_top.saturating_sub(self.height);
        self.metrics()
    }

    pub fn reset(&mut self) {
        self.scroll_top = 0;
    }

    pub fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: self.scroll_top,
            client_height: self.height,
            scroll_height: self.document_height,
        }
    }
}

pub struct SessionOptions {
    pub page_size: usize,
    pub scroll_threshold: usize,
    pub columns: usize,
    pub viewport_height: usize,
    pub clear_screen: bool,
    pub shutdown_grace: Duration,
}

impl SessionOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        let term = console::Term::stdout();
        let rows = term
            .size_checked()
            .map(|(rows, _)| rows as usize)
            .unwrap_or(24);
        Self {
            page_size: config.page_size,
            scroll_threshold: config.scroll_threshold,
            columns: config.columns,
            viewport_height: rows.saturating_sub(RESERVED_LINES).max(5),
            clear_screen: term.is_term(),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

/// Holds fetch failures until the next redraw shows them.
#[derive(Default)]
struct BannerNotifier {
    pending: Mutex<Vec<String>>,
}

impl BannerNotifier {
    fn push(&self, message: String) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for BannerNotifier {
    fn notify_error(&self, error: &anyhow::Error) {
        self.push(format!("Error fetching rates: {error}"));
    }
}

type LoadOutcome = (LoadTicket, Result<RatesResponse>);

struct Session<W: Write> {
    view: RatesView,
    notices: Arc<BannerNotifier>,
    viewport: Viewport,
    columns: usize,
    clear_screen: bool,
    out: W,
    outcomes: mpsc::UnboundedSender<LoadOutcome>,
    fetches: JoinSet<()>,
    in_flight: usize,
}

impl<W: Write> Session<W> {
    fn dispatch(&mut self, ticket: LoadTicket) {
        let provider = self.view.provider();
        let outcomes = self.outcomes.clone();
        self.in_flight += 1;
        self.viewport.reset();

        // Reap finished fetches so the set only holds live ones.
        while self.fetches.try_join_next().is_some() {}

        self.fetches.spawn(async move {
            let result = provider.fetch_rates(ticket.date()).await;
            if outcomes.send((ticket, result)).is_err() {
                debug!("Browser closed before rates arrived");
            }
        });
    }

    fn complete(&mut self, (ticket, result): LoadOutcome) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.view.complete_load(ticket, result);
    }

    fn draw(&mut self) -> Result<()> {
        let page = ui::render_page(&self.view.render(), self.columns);
        let lines: Vec<&str> = page.lines().collect();
        self.viewport.set_document_height(lines.len());

        if self.clear_screen {
            write!(self.out, "{CLEAR_SCREEN}")?;
        }

        let top = self.viewport.scroll_top;
        let end = (top + self.viewport.height).min(lines.len());
        for line in &lines[top..end] {
            writeln!(self.out, "{line}")?;
        }

        self.write_notices()?;

        let status = format!(
            "lines {}-{} of {} | {HELP}",
            (top + 1).min(end),
            end,
            lines.len()
        );
        write!(self.out, "{}\n> ", ui::style_text(&status, StyleType::Subtle))?;
        self.out.flush()?;
        Ok(())
    }

    fn write_notices(&mut self) -> Result<()> {
        for notice in self.notices.take() {
            writeln!(self.out, "{}", ui::style_text(&notice, StyleType::Error))?;
        }
        Ok(())
    }

    /// Waits up to `grace` for in-flight fetches, aborts whatever is left,
    /// and prints notices raised along the way.
    async fn shut_down(
        &mut self,
        outcome_rx: &mut mpsc::UnboundedReceiver<LoadOutcome>,
        grace: Duration,
    ) -> Result<()> {
        let settled = tokio::time::timeout(grace, async {
            while self.in_flight > 0 {
                match outcome_rx.recv().await {
                    Some(outcome) => self.complete(outcome),
                    None => break,
                }
            }
        })
        .await;

        if settled.is_err() {
            warn!(in_flight = self.in_flight, "Aborting unfinished rate fetches");
            self.fetches.abort_all();
            self.in_flight = 0;
        }

        self.write_notices()?;
        self.out.flush()?;
        Ok(())
    }

    /// Applies one user command. Returns `false` once the user quits.
    fn handle(&mut self, command: Command, scroll: &ScrollSource) -> Result<bool> {
        debug!(?command, "Browser command");
        match command {
            Command::More => {
                self.view.on_load_more_clicked();
                self.draw()?;
            }
            // The scroll listener redraws once it has seen the new position.
            Command::ScrollDown => {
                scroll.emit(self.viewport.scroll_down());
            }
            Command::ScrollUp => {
                scroll.emit(self.viewport.scroll_up());
            }
            Command::Date(input) => {
                if input.is_empty() {
                    debug!("Ignoring empty date selection");
                } else {
                    match parse_date(&input) {
                        Ok(date) => {
                            if let Some(ticket) = self.view.request_date(&date) {
                                self.dispatch(ticket);
                            }
                        }
                        Err(e) => self.notices.push(e.to_string()),
                    }
                }
                self.draw()?;
            }
            Command::Latest => {
                let ticket = self.view.request_latest();
                self.dispatch(ticket);
                self.draw()?;
            }
            Command::Help => {
                self.notices.push(format!("Commands: {HELP}"));
                self.draw()?;
            }
            Command::Unknown(input) => {
                self.notices.push(format!("Unknown command '{input}'"));
                self.draw()?;
            }
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }
}

/// Runs the browser until the user quits or `input` ends, then gives
/// in-flight fetches a short grace period and hands the final view back.
pub async fn run_session<R, W>(
    provider: Arc<dyn RatesProvider>,
    options: &SessionOptions,
    initial_date: Option<String>,
    input: R,
    out: W,
) -> Result<RatesView>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let notices = Arc::new(BannerNotifier::default());
    let view = RatesView::with_settings(
        provider,
        notices.clone(),
        options.page_size,
        options.scroll_threshold,
    );
    let (outcomes, mut outcome_rx) = mpsc::unbounded_channel();

    let mut session = Session {
        view,
        notices,
        viewport: Viewport::new(options.viewport_height),
        columns: options.columns,
        clear_screen: options.clear_screen,
        out,
        outcomes,
        fetches: JoinSet::new(),
        in_flight: 0,
    };

    let scroll = ScrollSource::new();
    let mut listener = scroll.subscribe();

    let ticket = match initial_date.as_deref() {
        Some(date) => session.view.request_date(date),
        None => Some(session.view.request_latest()),
    };
    if let Some(ticket) = ticket {
        session.dispatch(ticket);
    }
    session.draw()?;

    let mut lines = input.lines();
    loop {
        tokio::select! {
            Some(outcome) = outcome_rx.recv() => {
                session.complete(outcome);
                session.draw()?;
            }
            Some(metrics) = listener.next() => {
                session.view.on_scroll(metrics);
                session.draw()?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !session.handle(Command::parse(&line), &scroll)? {
                    break;
                }
            }
        }
    }

    drop(listener);

    session
        .shut_down(&mut outcome_rx, options.shutdown_grace)
        .await?;

    Ok(session.view)
}
