use pretty_assertions::assert_eq;

pub(super) use super::reduce;
pub(super) use super::OrderEffect;
pub(super) use super::Region;
pub(super) use crate::actions::AppAction;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::fixture::fixture_orders;
pub(super) use crate::model::Item;
pub(super) use crate::model::Order;
pub(super) use crate::state::AppState;
pub(super) use crate::state::FeedStatus;
pub(super) use crate::state::LogBuffer;
pub(super) use crate::state::LogLevel;
pub(super) use crate::state::LogSource;
pub(super) use crate::state::NoticeLevel;
pub(super) use crate::state::Overlay;
pub(super) use crate::state::SubmitOutcome;
pub(super) use crate::state::SubmitStatus;

mod selection;

fn state() -> AppState {
    AppState::new("fixture")
}

fn order(id: &str, customer: &str, prices: &[(f64, u32)]) -> Order {
    let items = prices
        .iter()
        .enumerate()
        .map(|(idx, (price, qty))| Item {
            id: format!("{id}-ITEM-{idx}"),
            sku: format!("SKU-{idx}"),
            product_name: format!("Product {idx}"),
            price: *price,
            qty: *qty,
            thumbnail: None,
        })
        .collect();
    Order::new(id, customer, "2025-01-15T10:24:30Z", items)
}

fn run_user(state: &mut AppState, action: UserAction) -> Vec<OrderEffect> {
    reduce(state, AppAction::User(action))
}

fn run_runtime(state: &mut AppState, action: RuntimeAction) -> Vec<OrderEffect> {
    reduce(state, AppAction::Runtime(action))
}

/// Issues a refresh and lands `orders` as its result.
fn load(state: &mut AppState, orders: Vec<Order>) {
    let effects = run_user(state, UserAction::Refresh);
    let fetch_id = effects
        .iter()
        .find_map(|effect| match effect {
            OrderEffect::StartFetch { fetch_id } => Some(*fetch_id),
            _ => None,
        })
        .expect("refresh should start a fetch");
    run_runtime(state, RuntimeAction::FetchSucceeded { fetch_id, orders });
}

fn loaded_state() -> AppState {
    let mut state = state();
    load(&mut state, fixture_orders().unwrap());
    state
}

fn select(state: &mut AppState, id: &str) -> Vec<OrderEffect> {
    run_user(state, UserAction::SelectOrder { id: id.to_string() })
}

fn assert_totals_consistent(state: &AppState) {
    for order in state.orders() {
        let expected: f64 = order.items().iter().map(Item::line_total).sum();
        assert!((order.total() - expected).abs() < 1e-9);
        assert_eq!(order.item_count(), order.items().len());
    }
}
