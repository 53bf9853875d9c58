use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Order collection as it arrives from a source.
///
/// Either `{ "orders": [...] }` or a bare `[...]`. Anything else is rejected
/// by the decoder instead of being coerced into one of the two.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    Wrapped { orders: Vec<RawOrder> },
    Bare(Vec<RawOrder>),
}

impl RawPayload {
    pub fn into_orders(self) -> Vec<RawOrder> {
        match self {
            Self::Wrapped { orders } => orders,
            Self::Bare(orders) => orders,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawOrder {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<RawItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub qty: Option<u32>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: String,
    pub sku: String,
    pub product_name: String,
    pub price: f64,
    pub qty: u32,
    pub thumbnail: Option<String>,
}

impl Item {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.qty)
    }
}

/// Canonical order. `total` and `item_count` are derived from `items` at
/// construction and there is no way to change one without the others.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: String,
    customer_name: String,
    timestamp: String,
    items: Vec<Item>,
    total: f64,
    item_count: usize,
}

impl Order {
    pub fn new(
        id: impl Into<String>,
        customer_name: impl Into<String>,
        timestamp: impl Into<String>,
        items: Vec<Item>,
    ) -> Self {
        let total = items.iter().fold(0.0, |sum, item| sum + item.line_total());
        let item_count = items.len();
        Self {
            id: id.into(),
            customer_name: customer_name.into(),
            timestamp: timestamp.into(),
            items,
            total,
            item_count,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn placed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }
}
