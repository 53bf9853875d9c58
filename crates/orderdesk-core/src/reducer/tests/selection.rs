use super::*;
use pretty_assertions::assert_eq;

#[test]
fn selecting_known_order_renders_list_and_detail() {
    let mut state = loaded_state();

    let effects = select(&mut state, "ORD-1002");

    assert_eq!(state.selection.selected_order.as_deref(), Some("ORD-1002"));
    assert_eq!(
        effects,
        vec![
            OrderEffect::Render(Region::List),
            OrderEffect::Render(Region::Detail),
        ]
    );
    assert_eq!(state.selected_order().map(Order::id), Some("ORD-1002"));
}

#[test]
fn selecting_unknown_order_is_a_noop() {
    let mut state = loaded_state();
    select(&mut state, "ORD-1001");

    let effects = select(&mut state, "ORD-404");

    assert!(effects.is_empty());
    assert_eq!(state.selection.selected_order.as_deref(), Some("ORD-1001"));
}

#[test]
fn selecting_before_any_load_is_a_noop() {
    let mut state = state();
    assert!(select(&mut state, "ORD-1001").is_empty());
    assert_eq!(state.selection.selected_order, None);
}

#[test]
fn reselecting_current_order_emits_nothing() {
    let mut state = loaded_state();
    select(&mut state, "ORD-1003");
    assert!(select(&mut state, "ORD-1003").is_empty());
}

#[test]
fn next_and_prev_wrap_around() {
    let mut state = loaded_state();

    run_user(&mut state, UserAction::SelectNext);
    assert_eq!(state.selection.selected_order.as_deref(), Some("ORD-1001"));

    run_user(&mut state, UserAction::SelectPrev);
    assert_eq!(state.selection.selected_order.as_deref(), Some("ORD-1003"));

    run_user(&mut state, UserAction::SelectNext);
    assert_eq!(state.selection.selected_order.as_deref(), Some("ORD-1001"));
}

#[test]
fn prev_without_selection_picks_last_order() {
    let mut state = loaded_state();
    run_user(&mut state, UserAction::SelectPrev);
    assert_eq!(state.selection.selected_order.as_deref(), Some("ORD-1003"));
}

#[test]
fn moving_on_empty_list_does_nothing() {
    let mut state = state();
    assert!(run_user(&mut state, UserAction::SelectNext).is_empty());
    assert!(run_user(&mut state, UserAction::SelectPrev).is_empty());
}

#[test]
fn selection_survives_refresh() {
    let mut state = loaded_state();
    select(&mut state, "ORD-1002");

    load(&mut state, fixture_orders().unwrap());

    assert_eq!(state.selection.selected_order.as_deref(), Some("ORD-1002"));
    assert_eq!(state.book.generation(), 2);
}

#[test]
fn selection_of_vanished_order_resolves_to_nothing() {
    let mut state = loaded_state();
    select(&mut state, "ORD-1002");

    load(&mut state, vec![order("ORD-2000", "Dana", &[(5.0, 1)])]);

    assert_eq!(state.selection.selected_order.as_deref(), Some("ORD-1002"));
    assert!(state.selected_order().is_none());
}
