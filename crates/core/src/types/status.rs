//! Order status.

use serde::{Deserialize, Serialize};

/// Error returned when a status string is outside the known set.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid order status: {0:?} (expected one of placed, paid, inProgress, outForDelivery, delivered)")]
pub struct ParseOrderStatusError(pub String);

/// Lifecycle of an order as seen by the restaurant.
///
/// Orders start as `placed` when checkout begins and become `paid` once
/// payment clears; the remaining states are set by the restaurant owner.
/// Owners may set any status, including moving an order backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "camelCase")
)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    #[default]
    Placed,
    Paid,
    InProgress,
    OutForDelivery,
    Delivered,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Placed,
        Self::Paid,
        Self::InProgress,
        Self::OutForDelivery,
        Self::Delivered,
    ];

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Placed => "placed",
            Self::Paid => "paid",
            Self::InProgress => "inProgress",
            Self::OutForDelivery => "outForDelivery",
            Self::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseOrderStatusError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_every_wire_name() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_from_str_is_case_sensitive() {
        assert!("Delivered".parse::<OrderStatus>().is_err());
        assert!("in_progress".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"outForDelivery\"");
        let parsed: OrderStatus = serde_json::from_str("\"inProgress\"").unwrap();
        assert_eq!(parsed, OrderStatus::InProgress);
    }
}
