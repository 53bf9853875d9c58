use std::collections::VecDeque;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;

use super::model::Order;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Idle,
    Loading,
    Ready,
    Failed { message: Arc<str> },
}

impl FeedStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Loading => "Loading",
            Self::Ready => "Ready",
            Self::Failed { .. } => "Failed",
        }
    }
}

/// Result of handing an order to the write endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Conflict { message: String },
    Rejected { status: u16 },
    NetworkFailure { message: String },
}

impl SubmitOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Conflict { .. } => "conflict",
            Self::Rejected { .. } => "rejected",
            Self::NetworkFailure { .. } => "network-failure",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStatus {
    Idle,
    Submitting { order_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: Arc<str>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<Arc<str>>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Help,
}

/// Installed order list. Replaced wholesale, never merged.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    orders: Vec<Order>,
    generation: u64,
}

impl OrderBook {
    pub fn install(&mut self, orders: Vec<Order>) {
        self.orders = orders;
        self.generation += 1;
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|order| order.id() == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.orders.iter().position(|order| order.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of installs so far; `0` means nothing has loaded yet.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
pub struct FetchTracker {
    pub next_fetch_id: u64,
    pub in_flight: Option<u64>,
    pub last_applied: Option<u64>,
}

impl Default for FetchTracker {
    fn default() -> Self {
        Self {
            next_fetch_id: 1,
            in_flight: None,
            last_applied: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    App,
    Source,
    User,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub seq: u64,
    pub level: LogLevel,
    /// Milliseconds since the Unix epoch, UTC.
    pub ts_ms: i64,
    pub source: LogSource,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, source: LogSource, message: impl Into<String>) -> Self {
        Self {
            seq: 0,
            level,
            ts_ms: Utc::now().timestamp_millis(),
            source,
            message: message.into(),
        }
    }

    pub fn time_label(&self) -> String {
        DateTime::from_timestamp_millis(self.ts_ms)
            .map(|at| at.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".to_string())
    }
}

#[derive(Debug, Clone)]
pub struct LogBuffer {
    cap: usize,
    next_seq: u64,
    buf: VecDeque<LogEntry>,
}

impl LogBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            next_seq: 1,
            buf: VecDeque::with_capacity(cap),
        }
    }

    pub fn append(&mut self, mut entry: LogEntry) {
        entry.seq = self.next_seq;
        self.next_seq += 1;

        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.next_seq = 1;
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        self.buf.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub selected_order: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub source_label: String,
    pub book: OrderBook,
    pub selection: Selection,
    pub feed: FeedStatus,
    pub fetch: FetchTracker,
    pub submit: SubmitStatus,
    pub notice: Option<Notice>,
    pub overlay: Overlay,
    pub logs: LogBuffer,
}

impl AppState {
    pub fn new(source_label: impl Into<String>) -> Self {
        Self {
            source_label: source_label.into(),
            book: OrderBook::default(),
            selection: Selection::default(),
            feed: FeedStatus::Idle,
            fetch: FetchTracker::default(),
            submit: SubmitStatus::Idle,
            notice: None,
            overlay: Overlay::None,
            logs: LogBuffer::new(500),
        }
    }

    pub fn orders(&self) -> &[Order] {
        self.book.orders()
    }

    /// The selected order, if the selection names an installed order.
    pub fn selected_order(&self) -> Option<&Order> {
        self.selection
            .selected_order
            .as_deref()
            .and_then(|id| self.book.get(id))
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.selected_order.as_deref() == Some(id)
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.fetch.in_flight.is_some()
    }
}
