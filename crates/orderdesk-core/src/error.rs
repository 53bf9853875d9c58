use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("invalid order payload: {0}")]
    Json(String),

    #[error("expected an `orders` array or a bare array of orders, found {found}")]
    UnknownShape { found: &'static str },

    #[error("order #{index} is malformed: {reason}")]
    InvalidOrder { index: usize, reason: String },

    #[error("order #{order_index}: item #{item_index} is malformed: {reason}")]
    InvalidItem {
        order_index: usize,
        item_index: usize,
        reason: String,
    },

    #[error("order #{index} is missing `{field}`")]
    MissingOrderField { index: usize, field: &'static str },

    #[error("order {order_id}: item #{item_index} is missing `{field}`")]
    MissingItemField {
        order_id: String,
        item_index: usize,
        field: &'static str,
    },

    #[error("order {order_id}: item #{item_index} has invalid price {price}")]
    InvalidPrice {
        order_id: String,
        item_index: usize,
        price: f64,
    },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
