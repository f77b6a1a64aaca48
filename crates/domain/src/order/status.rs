//! Payment and fulfilment status types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a status string names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! string_enum {
    ($name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Returns the wire name of the variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

/// How an order is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    Paypal,
    Cod,
    Stripe,
    BankTransfer,
}

string_enum!(PaymentMethod, "payment method" {
    CreditCard => "credit_card",
    Paypal => "paypal",
    Cod => "cod",
    Stripe => "stripe",
    BankTransfer => "bank_transfer",
});

/// Payment progress. Independent of fulfilment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

string_enum!(PaymentStatus, "payment status" {
    Pending => "pending",
    Paid => "paid",
    Failed => "failed",
    Refunded => "refunded",
});

/// Fulfilment status of an order.
///
/// ```text
/// Processing ──► Shipped ──► Delivered
///     │             │            │
///     └─────────────┴────────────┴──► Cancelled
/// ```
///
/// Transitions are advisory: updates may write any status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

string_enum!(OrderStatus, "order status" {
    Processing => "processing",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl OrderStatus {
    /// Returns true if moving from `self` to `next` follows the lifecycle.
    ///
    /// Staying in the same status always does.
    pub fn follows_lifecycle(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (a, b) if *a == b => true,
            (Processing, Shipped) | (Shipped, Delivered) => true,
            (Processing | Shipped | Delivered, Cancelled) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_matches_serde_names() {
        for method in PaymentMethod::ALL {
            let json = serde_json::to_value(method).unwrap();
            assert_eq!(json, method.as_str());
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), *method);
        }
        for status in OrderStatus::ALL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.as_str());
        }
    }

    #[test]
    fn test_unknown_payment_method() {
        let err = "bitcoin".parse::<PaymentMethod>().unwrap_err();
        assert_eq!(err.to_string(), "unknown payment method \"bitcoin\"");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
        assert_eq!(OrderStatus::default(), OrderStatus::Processing);
    }

    #[test]
    fn test_lifecycle_moves_forward_or_cancels() {
        use OrderStatus::*;
        assert!(Processing.follows_lifecycle(Shipped));
        assert!(Shipped.follows_lifecycle(Delivered));
        assert!(Delivered.follows_lifecycle(Cancelled));
        assert!(Shipped.follows_lifecycle(Shipped));

        assert!(!Processing.follows_lifecycle(Delivered));
        assert!(!Delivered.follows_lifecycle(Processing));
        assert!(!Cancelled.follows_lifecycle(Processing));
    }
}
