//! Order ledger service
//!
//! Authoritative owner of order status. All mutations go through
//! [`OrderLedger::request_transition`], which serializes per order via a
//! per-key mutex: concurrent triggers for the same order are applied one at
//! a time, and the loser observes either an idempotent success or an
//! `InvalidTransition` against the committed state. Orders are never
//! deleted; terminal orders stay resident for audit and rating lookups.

use crate::{
    config::Config,
    metrics::Metrics,
    notify::{NotificationSink, StatusChange, TracingSink},
    types::{transition, Actor, Order, OrderStatus, TransitionOutcome, TransitionRecord, Trigger},
    Error, Result,
};
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Order ledger
pub struct OrderLedger {
    /// Order records, one per-key mutex per order
    orders: DashMap<Uuid, Arc<Mutex<Order>>>,

    /// Notification sink (best-effort)
    sink: Arc<dyn NotificationSink>,

    /// Metrics
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl OrderLedger {
    /// Create a ledger with the default tracing sink
    pub fn new(config: Config) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Create a ledger publishing to the given sink
    pub fn with_sink(config: Config, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            orders: DashMap::new(),
            sink,
            metrics: Metrics::default(),
            config,
        }
    }

    /// Create a new order in `payment_pending`
    pub fn create_order(&self, restaurant_id: Uuid, customer_id: Uuid) -> Order {
        let now = Utc::now();
        let order = Order {
            order_id: Uuid::now_v7(),
            restaurant_id,
            customer_id,
            driver_id: None,
            status: OrderStatus::PaymentPending,
            created_at: now,
            updated_at: now,
            history: Vec::new(),
        };

        self.orders
            .insert(order.order_id, Arc::new(Mutex::new(order.clone())));
        self.metrics.orders_created.inc();

        debug!(order_id = %order.order_id, "order created");
        order
    }

    /// Attempt a status transition
    ///
    /// Idempotent under at-most-once delivery: re-submitting a trigger whose
    /// destination equals the current status returns the committed outcome
    /// without re-applying side effects. An illegal trigger fails with
    /// [`Error::InvalidTransition`] naming the current status.
    pub async fn request_transition(
        &self,
        order_id: Uuid,
        trigger: Trigger,
        actor: Actor,
    ) -> Result<TransitionOutcome> {
        let cell = self
            .orders
            .get(&order_id)
            .map(|entry| entry.value().clone())
            .ok_or(Error::OrderNotFound(order_id))?;

        // Mutate under the per-order lock; publish after releasing it.
        let (outcome, change) = {
            let mut order = cell.lock();
            self.apply_trigger(&mut order, trigger, actor)?
        };

        if let Some(change) = change {
            if self.config.notifications.enabled {
                if let Err(e) = self.sink.publish(&change).await {
                    // Best-effort: notification loss never fails the transition.
                    warn!(order_id = %order_id, error = %e, "notification publish failed");
                }
            }
        }

        Ok(outcome)
    }

    /// Apply one trigger to a locked order record
    fn apply_trigger(
        &self,
        order: &mut Order,
        trigger: Trigger,
        actor: Actor,
    ) -> Result<(TransitionOutcome, Option<StatusChange>)> {
        self.authorize(order, trigger, actor)?;

        // Idempotent re-submission: already in the trigger's destination.
        if order.status == trigger.destination() {
            if trigger == Trigger::DriverClaim {
                // Only the winning driver's retry is idempotent; a rival
                // driver re-claiming an already-claimed order is a conflict.
                let claimer = match actor {
                    Actor::Driver(id) => id,
                    _ => unreachable!("authorize checked actor kind"),
                };
                if order.driver_id != Some(claimer) {
                    self.metrics.transitions_rejected.inc();
                    return Err(Error::InvalidTransition {
                        current: order.status,
                        trigger,
                    });
                }
            }
            self.metrics.transitions_idempotent.inc();
            return Ok((
                TransitionOutcome {
                    status: order.status,
                    sequence: order.last_sequence(),
                },
                None,
            ));
        }

        let next = match transition(order.status, trigger) {
            Some(next) => next,
            None => {
                self.metrics.transitions_rejected.inc();
                return Err(Error::InvalidTransition {
                    current: order.status,
                    trigger,
                });
            }
        };

        let old_status = order.status;
        let now = Utc::now();
        let timestamp = now.max(order.updated_at); // updated_at never goes backwards
        let sequence = order.last_sequence() + 1;

        if trigger == Trigger::DriverClaim {
            if let Actor::Driver(driver_id) = actor {
                // Set exactly once; the table admits DriverClaim only from
                // ready_for_pickup, where no driver is assigned yet.
                order.driver_id = Some(driver_id);
            }
        }

        order.status = next;
        order.updated_at = timestamp;
        order.history.push(TransitionRecord {
            sequence,
            from: old_status,
            to: next,
            trigger,
            timestamp,
        });

        self.metrics.transitions_committed.inc();
        debug!(
            order_id = %order.order_id,
            from = %old_status,
            to = %next,
            trigger = %trigger,
            sequence,
            "transition committed"
        );

        let change = StatusChange {
            order_id: order.order_id,
            old_status,
            new_status: next,
            sequence,
            timestamp,
        };

        Ok((TransitionOutcome { status: next, sequence }, Some(change)))
    }

    /// Check trigger/actor pairing against the order record
    fn authorize(&self, order: &Order, trigger: Trigger, actor: Actor) -> Result<()> {
        let reject = |details: String| {
            Err(Error::UnauthorizedActor {
                trigger,
                actor: actor.kind(),
                details,
            })
        };

        match (trigger, actor) {
            (Trigger::PaymentConfirmed | Trigger::PaymentFailed, Actor::Payment) => Ok(()),
            (Trigger::CustomerCancel, Actor::Customer(id)) => {
                if id == order.customer_id {
                    Ok(())
                } else {
                    reject("customer does not own this order".to_string())
                }
            }
            (
                Trigger::RestaurantAccept | Trigger::RestaurantReject | Trigger::KitchenReady,
                Actor::Restaurant(id),
            ) => {
                if id == order.restaurant_id {
                    Ok(())
                } else {
                    reject("restaurant does not own this order".to_string())
                }
            }
            (Trigger::DriverClaim, Actor::Driver(_)) => Ok(()),
            (Trigger::DriverFinish, Actor::Driver(id)) => match order.driver_id {
                Some(assigned) if assigned == id => Ok(()),
                Some(_) => reject("driver does not hold this delivery".to_string()),
                None => Ok(()), // no driver yet; the transition table rejects it
            },
            (Trigger::OperatorCancel, Actor::Operator(_)) => Ok(()),
            _ => reject(format!("{} cannot submit {}", actor.kind(), trigger)),
        }
    }

    /// Get a snapshot of an order
    pub fn get_order(&self, order_id: Uuid) -> Result<Order> {
        let cell = self
            .orders
            .get(&order_id)
            .map(|entry| entry.value().clone())
            .ok_or(Error::OrderNotFound(order_id))?;
        let order = cell.lock();
        Ok(order.clone())
    }

    /// Get the committed transition history of an order
    pub fn get_history(&self, order_id: Uuid) -> Result<Vec<TransitionRecord>> {
        Ok(self.get_order(order_id)?.history)
    }

    /// Snapshot of all orders placed by a customer
    pub fn orders_for_customer(&self, customer_id: Uuid) -> Vec<Order> {
        self.orders
            .iter()
            .filter_map(|entry| {
                let order = entry.value().lock();
                (order.customer_id == customer_id).then(|| order.clone())
            })
            .collect()
    }

    /// Snapshot of all orders placed with a restaurant
    pub fn orders_for_restaurant(&self, restaurant_id: Uuid) -> Vec<Order> {
        self.orders
            .iter()
            .filter_map(|entry| {
                let order = entry.value().lock();
                (order.restaurant_id == restaurant_id).then(|| order.clone())
            })
            .collect()
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
