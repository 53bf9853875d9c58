use super::model::Order;
use super::state::SubmitOutcome;

#[derive(Debug, Clone)]
pub enum AppAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

#[derive(Debug, Clone)]
pub enum UserAction {
    SelectOrder { id: String },
    SelectNext,
    SelectPrev,
    Refresh,
    SubmitSelected,
    ToggleHelp,
    CloseOverlay,
    DismissNotice,
    ClearLogs,
}

#[derive(Debug, Clone)]
pub enum RuntimeAction {
    FetchSucceeded { fetch_id: u64, orders: Vec<Order> },
    FetchFailed { fetch_id: u64, message: String },
    SubmitFinished {
        order_id: String,
        outcome: SubmitOutcome,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHint {
    pub keys: &'static str,
    pub label: &'static str,
}

pub const KEY_HINTS: [KeyHint; 8] = [
    KeyHint {
        keys: "↑/↓ j/k",
        label: "Select previous/next order",
    },
    KeyHint {
        keys: "click",
        label: "Select order",
    },
    KeyHint {
        keys: "a",
        label: "Add to Order",
    },
    KeyHint {
        keys: "r",
        label: "Refresh orders",
    },
    KeyHint {
        keys: "c",
        label: "Clear log",
    },
    KeyHint {
        keys: "?",
        label: "Toggle help",
    },
    KeyHint {
        keys: "Esc",
        label: "Close help / dismiss message",
    },
    KeyHint {
        keys: "q",
        label: "Quit",
    },
];
