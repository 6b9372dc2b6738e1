//! Notification sink for committed transitions
//!
//! Downstream notification delivery (push, email, etc.) is an external
//! collaborator. The ledger only publishes `(order_id, old, new, sequence)`
//! tuples, best-effort: a sink failure is logged and never fails the
//! transition that produced it.

use crate::types::OrderStatus;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// A committed status change, as published to collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Order the change belongs to
    pub order_id: Uuid,

    /// Status before the transition
    pub old_status: OrderStatus,

    /// Status after the transition
    pub new_status: OrderStatus,

    /// Per-order sequence number (causal ordering for consumers)
    pub sequence: u64,

    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
}

/// Capability interface for publishing status changes
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Publish one status change (best-effort)
    async fn publish(&self, change: &StatusChange) -> std::result::Result<(), String>;
}

/// Sink that logs changes via tracing (default deployment)
#[derive(Debug, Default)]
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn publish(&self, change: &StatusChange) -> std::result::Result<(), String> {
        info!(
            order_id = %change.order_id,
            old = %change.old_status,
            new = %change.new_status,
            sequence = change.sequence,
            "order status changed"
        );
        Ok(())
    }
}

/// Sink backed by an unbounded channel (tests and local consumers)
#[derive(Debug)]
pub struct ChannelSink {
    sender: tokio::sync::mpsc::UnboundedSender<StatusChange>,
}

impl ChannelSink {
    /// Create a sink and the receiving half
    pub fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<StatusChange>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (Self { sender: tx }, rx)
    }
}

#[async_trait]
impl NotificationSink for ChannelSink {
    async fn publish(&self, change: &StatusChange) -> std::result::Result<(), String> {
        self.sender
            .send(change.clone())
            .map_err(|e| format!("channel closed: {}", e))
    }
}
