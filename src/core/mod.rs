//! Core rate browsing logic

pub mod config;
pub mod log;
pub mod rates;
pub mod scroll;
pub mod view;

// Re-export main types for cleaner imports
pub use rates::{RateRecord, RatesProvider, RatesResponse};
pub use scroll::{ScrollMetrics, ScrollSource, ScrollSubscription};
pub use view::{LoadTicket, Notifier, PAGE_SIZE, RatesView, RenderModel};
