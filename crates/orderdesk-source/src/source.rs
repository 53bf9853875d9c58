use orderdesk_core::fixture::FIXTURE_ORDERS_JSON;
use orderdesk_core::parse_payload;
use orderdesk_core::Order;

use crate::contracts::SourceError;
use crate::contracts::SubmitOutcome;

pub trait OrderSource: Send + Sync {
    fn label(&self) -> &str;

    /// Raw response body of the read endpoint.
    fn fetch(&self) -> Result<String, SourceError>;

    fn submit(&self, order: &Order) -> SubmitOutcome;
}

pub fn fetch_orders(source: &dyn OrderSource) -> Result<Vec<Order>, SourceError> {
    let body = source.fetch()?;
    Ok(parse_payload(&body)?)
}

/// Serves the embedded sample collection. Submits succeed without any
/// network traffic.
#[derive(Debug, Clone)]
pub struct FixtureOrderSource {
    body: String,
}

impl Default for FixtureOrderSource {
    fn default() -> Self {
        Self {
            body: FIXTURE_ORDERS_JSON.to_string(),
        }
    }
}

impl FixtureOrderSource {
    pub fn with_body(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl OrderSource for FixtureOrderSource {
    fn label(&self) -> &str {
        "fixture"
    }

    fn fetch(&self) -> Result<String, SourceError> {
        Ok(self.body.clone())
    }

    fn submit(&self, order: &Order) -> SubmitOutcome {
        tracing::info!(order_id = %order.id(), "fixture source accepted order without network");
        SubmitOutcome::Accepted
    }
}

#[cfg(test)]
mod tests {
    use orderdesk_core::DecodeError;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn fixture_source_yields_three_orders() {
        let orders = fetch_orders(&FixtureOrderSource::default()).unwrap();
        let customers: Vec<&str> = orders.iter().map(Order::customer_name).collect();
        assert_eq!(customers, vec!["Alice Johnson", "Brian Smith", "Carla Reyes"]);
    }

    #[test]
    fn decode_failures_surface_as_source_errors() {
        let source = FixtureOrderSource::with_body(r#"[{"id":"ORD-1"}]"#);
        assert_eq!(
            fetch_orders(&source),
            Err(SourceError::Decode(DecodeError::MissingOrderField {
                index: 0,
                field: "customer_name",
            }))
        );
    }

    #[test]
    fn fixture_submit_is_accepted() {
        let orders = fetch_orders(&FixtureOrderSource::default()).unwrap();
        assert_eq!(
            FixtureOrderSource::default().submit(&orders[0]),
            SubmitOutcome::Accepted
        );
    }
}
