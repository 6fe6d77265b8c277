use serde::{Deserialize, Serialize};

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================
//
// An `Order` is the payload carried by every record on the source stream and,
// verbatim, on the dead-letter stream. It is immutable once constructed: the
// fields are private and only exposed through accessors.
//
// Wire shape (JSON value of a record):
//   { "orderId": "1001", "itemName": "Item3", "price": 55.0 }
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawOrder")]
pub struct Order {
    order_id: String,
    item_name: String,
    price: f64,
}

/// Unvalidated wire form, checked by `Order::new` on deserialization
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOrder {
    order_id: String,
    item_name: String,
    price: f64,
}

impl TryFrom<RawOrder> for Order {
    type Error = OrderError;

    fn try_from(raw: RawOrder) -> Result<Self, Self::Error> {
        Order::new(raw.order_id, raw.item_name, raw.price)
    }
}

impl Order {
    pub fn new(
        order_id: impl Into<String>,
        item_name: impl Into<String>,
        price: f64,
    ) -> Result<Self, OrderError> {
        let order_id = order_id.into();
        if order_id.is_empty() {
            return Err(OrderError::EmptyOrderId);
        }
        if !price.is_finite() || price < 0.0 {
            return Err(OrderError::InvalidPrice(price));
        }

        Ok(Self {
            order_id,
            item_name: item_name.into(),
            price,
        })
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// Decode a record value
    pub fn from_json(bytes: &[u8]) -> Result<Self, OrderError> {
        serde_json::from_slice(bytes).map_err(|e| OrderError::Malformed(e.to_string()))
    }

    /// Encode as a record value
    pub fn to_json(&self) -> Result<String, OrderError> {
        serde_json::to_string(self).map_err(|e| OrderError::Malformed(e.to_string()))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_creation() {
        let order = Order::new("1001", "Item3", 55.0).unwrap();

        assert_eq!(order.order_id(), "1001");
        assert_eq!(order.item_name(), "Item3");
        assert_eq!(order.price(), 55.0);
    }

    #[test]
    fn test_order_rejects_negative_price() {
        let result = Order::new("1001", "Item1", -0.01);
        assert!(matches!(result, Err(OrderError::InvalidPrice(_))));
    }

    #[test]
    fn test_order_rejects_non_finite_price() {
        assert!(Order::new("1001", "Item1", f64::NAN).is_err());
        assert!(Order::new("1001", "Item1", f64::INFINITY).is_err());
    }

    #[test]
    fn test_order_rejects_empty_id() {
        let result = Order::new("", "Item1", 10.0);
        assert!(matches!(result, Err(OrderError::EmptyOrderId)));
    }

    #[test]
    fn test_order_wire_field_names() {
        let order = Order::new("1002", "Item5", 150.0).unwrap();
        let json: serde_json::Value = serde_json::from_str(&order.to_json().unwrap()).unwrap();

        assert_eq!(json["orderId"], "1002");
        assert_eq!(json["itemName"], "Item5");
        assert_eq!(json["price"], 150.0);
    }

    #[test]
    fn test_order_decoding_validates_price() {
        let bytes = br#"{"orderId":"1","itemName":"Item1","price":-5.0}"#;
        assert!(matches!(Order::from_json(bytes), Err(OrderError::Malformed(_))));
    }

    #[test]
    fn test_order_decoding_rejects_missing_fields() {
        let bytes = br#"{"orderId":"1","price":5.0}"#;
        assert!(Order::from_json(bytes).is_err());
    }
}
