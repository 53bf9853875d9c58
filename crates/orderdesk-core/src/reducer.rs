#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    List,
    Detail,
    Status,
    Overlay,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderEffect {
    Render(Region),
    StartFetch { fetch_id: u64 },
    SubmitOrder(Order),
}

use super::actions::AppAction;
use super::actions::RuntimeAction;
use super::actions::UserAction;
use super::model::Order;
use super::state::AppState;
use super::state::FeedStatus;
use super::state::LogEntry;
use super::state::LogLevel;
use super::state::LogSource;
use super::state::Notice;
use super::state::NoticeLevel;
use super::state::Overlay;
use super::state::SubmitOutcome;
use super::state::SubmitStatus;

pub fn reduce(state: &mut AppState, action: AppAction) -> Vec<OrderEffect> {
    match action {
        AppAction::User(user) => reduce_user(state, user),
        AppAction::Runtime(runtime) => reduce_runtime(state, runtime),
    }
}

fn reduce_user(state: &mut AppState, action: UserAction) -> Vec<OrderEffect> {
    match action {
        UserAction::SelectOrder { id } => select_order(state, id),
        UserAction::SelectNext => {
            let Some(id) = neighbour_id(state, true) else {
                return Vec::new();
            };
            select_order(state, id)
        }
        UserAction::SelectPrev => {
            let Some(id) = neighbour_id(state, false) else {
                return Vec::new();
            };
            select_order(state, id)
        }
        UserAction::Refresh => {
            if let Some(in_flight) = state.fetch.in_flight {
                push_log(
                    state,
                    LogLevel::Debug,
                    LogSource::App,
                    format!("refresh skipped: fetch {in_flight} still in flight"),
                );
                return Vec::new();
            }
            let fetch_id = state.fetch.next_fetch_id;
            state.fetch.next_fetch_id += 1;
            state.fetch.in_flight = Some(fetch_id);
            state.feed = FeedStatus::Loading;
            push_log(
                state,
                LogLevel::Info,
                LogSource::Source,
                format!("fetch {fetch_id} started from {}", state.source_label),
            );
            vec![
                OrderEffect::Render(Region::List),
                OrderEffect::StartFetch { fetch_id },
            ]
        }
        UserAction::SubmitSelected => {
            if let SubmitStatus::Submitting { order_id } = &state.submit {
                let message = format!("Order {order_id} is still being submitted");
                state.notice = Some(Notice::new(NoticeLevel::Info, message));
                return vec![OrderEffect::Render(Region::Status)];
            }
            let Some(order) = state.selected_order().cloned() else {
                state.notice = Some(Notice::new(
                    NoticeLevel::Error,
                    "Please select an order first",
                ));
                return vec![OrderEffect::Render(Region::Status)];
            };
            state.submit = SubmitStatus::Submitting {
                order_id: order.id().to_string(),
            };
            state.notice = Some(Notice::new(
                NoticeLevel::Info,
                format!("Adding order {}...", order.id()),
            ));
            push_log(
                state,
                LogLevel::Info,
                LogSource::User,
                format!("submitting order {}", order.id()),
            );
            vec![
                OrderEffect::Render(Region::Status),
                OrderEffect::SubmitOrder(order),
            ]
        }
        UserAction::ToggleHelp => {
            state.overlay = match state.overlay {
                Overlay::Help => Overlay::None,
                Overlay::None => Overlay::Help,
            };
            vec![OrderEffect::Render(Region::Overlay)]
        }
        UserAction::CloseOverlay => {
            if state.overlay == Overlay::None {
                return Vec::new();
            }
            state.overlay = Overlay::None;
            vec![OrderEffect::Render(Region::Overlay)]
        }
        UserAction::DismissNotice => {
            if state.notice.take().is_some() {
                vec![OrderEffect::Render(Region::Status)]
            } else {
                Vec::new()
            }
        }
        UserAction::ClearLogs => {
            if state.logs.is_empty() {
                return Vec::new();
            }
            state.logs.clear();
            vec![OrderEffect::Render(Region::Status)]
        }
    }
}

fn reduce_runtime(state: &mut AppState, action: RuntimeAction) -> Vec<OrderEffect> {
    match action {
        RuntimeAction::FetchSucceeded { fetch_id, orders } => {
            if !accept_fetch_result(state, fetch_id) {
                return Vec::new();
            }
            let count = orders.len();
            state.book.install(orders);
            state.feed = FeedStatus::Ready;
            push_log(
                state,
                LogLevel::Info,
                LogSource::Source,
                format!("fetch {fetch_id} loaded {count} order(s)"),
            );
            vec![
                OrderEffect::Render(Region::List),
                OrderEffect::Render(Region::Detail),
            ]
        }
        RuntimeAction::FetchFailed { fetch_id, message } => {
            if !accept_fetch_result(state, fetch_id) {
                return Vec::new();
            }
            push_log(
                state,
                LogLevel::Error,
                LogSource::Source,
                format!("fetch {fetch_id} failed: {message}"),
            );
            state.feed = FeedStatus::Failed {
                message: message.into(),
            };
            vec![OrderEffect::Render(Region::List)]
        }
        RuntimeAction::SubmitFinished { order_id, outcome } => {
            state.submit = SubmitStatus::Idle;
            let notice = submit_notice(state, &order_id, &outcome);
            let level = if outcome.is_success() {
                LogLevel::Info
            } else {
                LogLevel::Warn
            };
            push_log(
                state,
                level,
                LogSource::Source,
                format!("submit {order_id}: {}", outcome.label()),
            );
            state.notice = Some(notice);
            vec![OrderEffect::Render(Region::Status)]
        }
    }
}

/// Selecting an id that is not installed leaves state untouched.
fn select_order(state: &mut AppState, id: String) -> Vec<OrderEffect> {
    if !state.book.contains(&id) {
        push_log(
            state,
            LogLevel::Debug,
            LogSource::User,
            format!("ignored selection of unknown order {id}"),
        );
        return Vec::new();
    }
    if state.is_selected(&id) {
        return Vec::new();
    }
    state.selection.selected_order = Some(id);
    vec![
        OrderEffect::Render(Region::List),
        OrderEffect::Render(Region::Detail),
    ]
}

fn neighbour_id(state: &AppState, forward: bool) -> Option<String> {
    let orders = state.orders();
    if orders.is_empty() {
        return None;
    }
    let current = state
        .selection
        .selected_order
        .as_deref()
        .and_then(|id| state.book.position(id));
    let next = match (current, forward) {
        (None, true) => 0,
        (None, false) => orders.len() - 1,
        (Some(idx), true) => (idx + 1) % orders.len(),
        (Some(0), false) => orders.len() - 1,
        (Some(idx), false) => idx - 1,
    };
    orders.get(next).map(|order| order.id().to_string())
}

/// Only the in-flight fetch may land; anything else is a stale response.
fn accept_fetch_result(state: &mut AppState, fetch_id: u64) -> bool {
    if state.fetch.in_flight != Some(fetch_id) {
        push_log(
            state,
            LogLevel::Debug,
            LogSource::Source,
            format!("discarded stale result of fetch {fetch_id}"),
        );
        return false;
    }
    state.fetch.in_flight = None;
    state.fetch.last_applied = Some(fetch_id);
    true
}

fn submit_notice(state: &AppState, order_id: &str, outcome: &SubmitOutcome) -> Notice {
    match outcome {
        SubmitOutcome::Accepted => {
            let message = match state.book.get(order_id) {
                Some(order) => format!(
                    "Order {order_id} for {} added successfully!",
                    order.customer_name()
                ),
                None => format!("Order {order_id} added successfully!"),
            };
            Notice::new(NoticeLevel::Success, message)
        }
        SubmitOutcome::Conflict { message } => Notice::new(
            NoticeLevel::Error,
            format!("Order {order_id} was not added: {message}"),
        ),
        SubmitOutcome::Rejected { status } => Notice::new(
            NoticeLevel::Error,
            format!("Error adding order {order_id} (HTTP {status})"),
        ),
        SubmitOutcome::NetworkFailure { message } => Notice::new(
            NoticeLevel::Error,
            format!("Error adding order {order_id}: {message}"),
        ),
    }
}

/// Entries are stamped with the wall clock at the moment they are recorded.
fn push_log(state: &mut AppState, level: LogLevel, source: LogSource, message: String) {
    state.logs.append(LogEntry::new(level, source, message));
}

#[cfg(test)]
mod tests;
