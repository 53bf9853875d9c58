use super::error::DecodeError;
use super::model::Order;
use super::normalizer::parse_payload;

/// Three-order sample collection used when no live source is configured.
pub const FIXTURE_ORDERS_JSON: &str = include_str!("../fixtures/orders.json");

pub fn fixture_orders() -> Result<Vec<Order>, DecodeError> {
    parse_payload(FIXTURE_ORDERS_JSON)
}
