//! Core types for the order ledger
//!
//! The status enumeration and the transition table are the single source of
//! truth for the order lifecycle. Every mutation of an order goes through
//! [`transition`], so an illegal edge cannot be introduced anywhere else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Canonical order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Awaiting payment confirmation (initial)
    PaymentPending,
    /// Paid, awaiting restaurant decision
    PendingRestaurantAccept,
    /// Restaurant accepted, kitchen working
    PreparingOrder,
    /// Kitchen done, claimable by drivers
    ReadyForPickup,
    /// Claimed, driver en route
    OutForDelivery,
    /// Delivered to customer (terminal)
    Delivered,
    /// Canceled before acceptance (terminal)
    Canceled,
    /// Rejected by restaurant (terminal)
    Rejected,
}

impl OrderStatus {
    /// Check if status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Canceled | OrderStatus::Rejected
        )
    }

    /// Wire name for the status
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PaymentPending => "payment_pending",
            OrderStatus::PendingRestaurantAccept => "pending_restaurant_accept",
            OrderStatus::PreparingOrder => "preparing_order",
            OrderStatus::ReadyForPickup => "ready_for_pickup",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trigger causing a status transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Payment service confirmed the charge
    PaymentConfirmed,
    /// Payment service reported failure
    PaymentFailed,
    /// Customer canceled before acceptance
    CustomerCancel,
    /// Restaurant accepted the order
    RestaurantAccept,
    /// Restaurant rejected the order
    RestaurantReject,
    /// Kitchen finished preparing
    KitchenReady,
    /// A driver won the delivery claim
    DriverClaim,
    /// The claiming driver completed the delivery
    DriverFinish,
    /// Operator override cancel (pre-acceptance only)
    OperatorCancel,
}

impl Trigger {
    /// Destination status of this trigger
    ///
    /// Every trigger has exactly one destination; legality of the edge
    /// depends only on the source status (see [`transition`]).
    pub fn destination(&self) -> OrderStatus {
        match self {
            Trigger::PaymentConfirmed => OrderStatus::PendingRestaurantAccept,
            Trigger::PaymentFailed => OrderStatus::Canceled,
            Trigger::CustomerCancel => OrderStatus::Canceled,
            Trigger::RestaurantAccept => OrderStatus::PreparingOrder,
            Trigger::RestaurantReject => OrderStatus::Rejected,
            Trigger::KitchenReady => OrderStatus::ReadyForPickup,
            Trigger::DriverClaim => OrderStatus::OutForDelivery,
            Trigger::DriverFinish => OrderStatus::Delivered,
            Trigger::OperatorCancel => OrderStatus::Canceled,
        }
    }

    /// Wire name for the trigger
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::PaymentConfirmed => "payment_confirmed",
            Trigger::PaymentFailed => "payment_failed",
            Trigger::CustomerCancel => "customer_cancel",
            Trigger::RestaurantAccept => "restaurant_accept",
            Trigger::RestaurantReject => "restaurant_reject",
            Trigger::KitchenReady => "kitchen_ready",
            Trigger::DriverClaim => "driver_claim",
            Trigger::DriverFinish => "driver_finish",
            Trigger::OperatorCancel => "operator_cancel",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The legal transition table
///
/// Returns the destination status if `trigger` is legal from `status`,
/// `None` otherwise. Cancellation is gated to pre-acceptance states;
/// there is no edge out of a terminal state.
pub fn transition(status: OrderStatus, trigger: Trigger) -> Option<OrderStatus> {
    use OrderStatus::*;
    use Trigger::*;

    let next = match (status, trigger) {
        (PaymentPending, PaymentConfirmed) => PendingRestaurantAccept,
        (PaymentPending, PaymentFailed) => Canceled,
        (PaymentPending, CustomerCancel) => Canceled,
        (PaymentPending, OperatorCancel) => Canceled,
        (PendingRestaurantAccept, RestaurantAccept) => PreparingOrder,
        (PendingRestaurantAccept, RestaurantReject) => Rejected,
        (PendingRestaurantAccept, CustomerCancel) => Canceled,
        (PendingRestaurantAccept, OperatorCancel) => Canceled,
        (PreparingOrder, KitchenReady) => ReadyForPickup,
        (ReadyForPickup, DriverClaim) => OutForDelivery,
        (OutForDelivery, DriverFinish) => Delivered,
        _ => return None,
    };
    Some(next)
}

/// Acting party submitting a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    /// The ordering customer
    Customer(Uuid),
    /// The fulfilling restaurant
    Restaurant(Uuid),
    /// A delivery driver
    Driver(Uuid),
    /// The payment collaborator (trusted signal)
    Payment,
    /// A platform operator
    Operator(Uuid),
}

impl Actor {
    /// Short label for logs and errors
    pub fn kind(&self) -> &'static str {
        match self {
            Actor::Customer(_) => "customer",
            Actor::Restaurant(_) => "restaurant",
            Actor::Driver(_) => "driver",
            Actor::Payment => "payment",
            Actor::Operator(_) => "operator",
        }
    }
}

/// One committed transition, kept for audit and causal ordering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Per-order sequence number (strictly increasing, starts at 1)
    pub sequence: u64,

    /// Status before the transition
    pub from: OrderStatus,

    /// Status after the transition
    pub to: OrderStatus,

    /// Trigger that caused it
    pub trigger: Trigger,

    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
}

/// An order as tracked by the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID
    pub order_id: Uuid,

    /// Fulfilling restaurant
    pub restaurant_id: Uuid,

    /// Ordering customer
    pub customer_id: Uuid,

    /// Claiming driver (set exactly once, at the claim transition)
    pub driver_id: Option<Uuid>,

    /// Current status
    pub status: OrderStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last transition timestamp (non-decreasing)
    pub updated_at: DateTime<Utc>,

    /// Committed transition history
    pub history: Vec<TransitionRecord>,
}

impl Order {
    /// Sequence number of the last committed transition (0 if none)
    pub fn last_sequence(&self) -> u64 {
        self.history.last().map(|r| r.sequence).unwrap_or(0)
    }
}

/// Result of a committed (or idempotently re-observed) transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    /// Status after the transition
    pub status: OrderStatus,

    /// Sequence number of the committing transition
    pub sequence: u64,
}
