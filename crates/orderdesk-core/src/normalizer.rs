use super::error::DecodeError;
use super::model::Item;
use super::model::Order;
use super::model::RawItem;
use super::model::RawOrder;
use super::model::RawPayload;
use serde_json::Value;

/// Picks the payload shape explicitly, then decodes orders and items one at
/// a time so a type error names the position it came from.
pub fn decode_payload(body: &str) -> Result<RawPayload, DecodeError> {
    match serde_json::from_str::<Value>(body)? {
        Value::Array(entries) => decode_orders(entries).map(RawPayload::Bare),
        Value::Object(mut fields) => match fields.remove("orders") {
            Some(Value::Array(entries)) => {
                decode_orders(entries).map(|orders| RawPayload::Wrapped { orders })
            }
            Some(other) => Err(DecodeError::UnknownShape {
                found: json_kind(&other),
            }),
            None => Err(DecodeError::UnknownShape {
                found: "an object without `orders`",
            }),
        },
        other => Err(DecodeError::UnknownShape {
            found: json_kind(&other),
        }),
    }
}

fn decode_orders(entries: Vec<Value>) -> Result<Vec<RawOrder>, DecodeError> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| decode_order(entry, index))
        .collect()
}

fn decode_order(entry: Value, index: usize) -> Result<RawOrder, DecodeError> {
    let invalid = |reason: String| DecodeError::InvalidOrder { index, reason };
    let mut fields = match entry {
        Value::Object(fields) => fields,
        other => return Err(invalid(format!("expected an object, found {}", json_kind(&other)))),
    };
    let items = fields.remove("items");
    let mut order: RawOrder =
        serde_json::from_value(Value::Object(fields)).map_err(|err| invalid(err.to_string()))?;

    order.items = match items {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .enumerate()
                .map(|(item_index, item)| {
                    serde_json::from_value::<RawItem>(item).map_err(|err| {
                        DecodeError::InvalidItem {
                            order_index: index,
                            item_index,
                            reason: err.to_string(),
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Some(other) => {
            return Err(invalid(format!(
                "`items` must be an array, found {}",
                json_kind(&other)
            )))
        }
    };
    Ok(order)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub fn parse_payload(body: &str) -> Result<Vec<Order>, DecodeError> {
    normalize(decode_payload(body)?)
}

/// Source order and item order are preserved; nothing is dropped or merged.
pub fn normalize(payload: RawPayload) -> Result<Vec<Order>, DecodeError> {
    payload
        .into_orders()
        .into_iter()
        .enumerate()
        .map(|(index, raw)| normalize_order(raw, index))
        .collect()
}

pub fn normalize_order(raw: RawOrder, index: usize) -> Result<Order, DecodeError> {
    let missing = |field| DecodeError::MissingOrderField { index, field };
    let id = raw.id.ok_or_else(|| missing("id"))?;
    let customer_name = raw.customer_name.ok_or_else(|| missing("customer_name"))?;
    let timestamp = raw.timestamp.ok_or_else(|| missing("timestamp"))?;

    let items = raw
        .items
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(item_index, item)| normalize_item(item, &id, item_index))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Order::new(id, customer_name, timestamp, items))
}

fn normalize_item(raw: RawItem, order_id: &str, item_index: usize) -> Result<Item, DecodeError> {
    let missing = |field| DecodeError::MissingItemField {
        order_id: order_id.to_string(),
        item_index,
        field,
    };
    let price = raw.price.ok_or_else(|| missing("price"))?;
    if !price.is_finite() || price < 0.0 {
        return Err(DecodeError::InvalidPrice {
            order_id: order_id.to_string(),
            item_index,
            price,
        });
    }

    Ok(Item {
        id: raw.id.ok_or_else(|| missing("id"))?,
        sku: raw.sku.ok_or_else(|| missing("sku"))?,
        product_name: raw.product_name.ok_or_else(|| missing("product_name"))?,
        price,
        qty: raw.qty.ok_or_else(|| missing("qty"))?,
        thumbnail: raw.thumbnail,
    })
}
