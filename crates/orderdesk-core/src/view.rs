//! Display projections of [`AppState`].
//!
//! Renderers draw from these structs only, so everything a user can see is
//! covered by plain unit tests without a terminal.

use chrono::DateTime;

use super::model::Item;
use super::model::Order;
use super::state::AppState;
use super::state::FeedStatus;

pub const NO_IMAGE: &str = "No Image";
pub const ADD_TO_ORDER_LABEL: &str = "Add to Order";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub id: String,
    pub customer_name: String,
    pub item_count: usize,
    pub total_label: String,
    pub meta: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Loading,
    Empty,
    Rows(Vec<OrderRow>),
    /// Rows from the last good load stay visible under the error.
    Failed {
        message: String,
        rows: Vec<OrderRow>,
    },
}

impl ListView {
    pub fn rows(&self) -> &[OrderRow] {
        match self {
            Self::Rows(rows) | Self::Failed { rows, .. } => rows,
            Self::Loading | Self::Empty => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    pub id: String,
    pub product_name: String,
    pub sku_label: String,
    pub unit_price: String,
    pub qty: u32,
    pub price_line: String,
    pub line_total: String,
    pub thumbnail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetail {
    pub id: String,
    pub customer_name: String,
    pub placed_at: String,
    pub items_heading: String,
    pub items: Vec<ItemRow>,
    pub total: String,
    pub action_label: &'static str,
}

pub fn list_view(state: &AppState) -> ListView {
    let rows: Vec<OrderRow> = state
        .orders()
        .iter()
        .map(|order| order_row(order, state.is_selected(order.id())))
        .collect();

    match &state.feed {
        FeedStatus::Failed { message } => ListView::Failed {
            message: message.to_string(),
            rows,
        },
        FeedStatus::Loading if state.book.is_empty() => ListView::Loading,
        _ if rows.is_empty() => ListView::Empty,
        _ => ListView::Rows(rows),
    }
}

pub fn detail_view(state: &AppState) -> Option<OrderDetail> {
    state.selected_order().map(order_detail)
}

pub fn order_row(order: &Order, selected: bool) -> OrderRow {
    let total_label = format_money(order.total());
    OrderRow {
        id: order.id().to_string(),
        customer_name: order.customer_name().to_string(),
        item_count: order.item_count(),
        meta: format!("{} item(s) • {}", order.item_count(), total_label),
        total_label,
        selected,
    }
}

pub fn order_detail(order: &Order) -> OrderDetail {
    OrderDetail {
        id: order.id().to_string(),
        customer_name: order.customer_name().to_string(),
        placed_at: format_timestamp(order.timestamp()),
        items_heading: format!("Items ({})", order.item_count()),
        items: order.items().iter().map(item_row).collect(),
        total: format_amount(order.total()),
        action_label: ADD_TO_ORDER_LABEL,
    }
}

fn item_row(item: &Item) -> ItemRow {
    let unit_price = format_amount(item.price);
    ItemRow {
        id: item.id.clone(),
        product_name: item.product_name.clone(),
        sku_label: format!("SKU: {}", item.sku),
        price_line: format!("${unit_price} × {}", item.qty),
        unit_price,
        qty: item.qty,
        line_total: format_amount(item.line_total()),
        thumbnail: item
            .thumbnail
            .clone()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| NO_IMAGE.to_string()),
    }
}

pub fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}

pub fn format_money(value: f64) -> String {
    format!("${value:.2}")
}

/// `Jan 15, 2025, 10:24 AM`, or the input unchanged when it is not RFC 3339.
pub fn format_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.format("%b %-d, %Y, %I:%M %p").to_string(),
        Err(_) => raw.to_string(),
    }
}
