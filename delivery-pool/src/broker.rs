//! Claim broker
//!
//! Arbitrates competitive claims and keeps the slot store and the order
//! ledger consistent. The slot claim and the ledger transition live in two
//! independent stores, so a failed transition is compensated by reopening
//! the slot; this is a compensating action, not a two-phase commit.

use crate::{pool::DeliveryPool, types::DeliverySlot, Error, Result};
use order_ledger::{Actor, OrderLedger, TransitionOutcome, Trigger};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Claim broker
pub struct ClaimBroker {
    /// Slot store
    pool: Arc<DeliveryPool>,

    /// Order ledger
    ledger: Arc<OrderLedger>,
}

impl ClaimBroker {
    /// Create a broker over a pool and a ledger
    pub fn new(pool: Arc<DeliveryPool>, ledger: Arc<OrderLedger>) -> Self {
        Self { pool, ledger }
    }

    /// Claim a delivery for a driver
    ///
    /// Exactly one concurrent claimant wins the slot; the winner's claim is
    /// then committed to the ledger as `out_for_delivery`. If the ledger
    /// rejects the transition (e.g. the order was canceled concurrently)
    /// the slot claim is rolled back before the error surfaces.
    pub async fn claim(&self, order_id: Uuid, driver_id: Uuid) -> Result<DeliverySlot> {
        let slot = self.pool.try_claim(order_id, driver_id)?;

        match self
            .ledger
            .request_transition(order_id, Trigger::DriverClaim, Actor::Driver(driver_id))
            .await
        {
            Ok(outcome) => {
                info!(
                    order_id = %order_id,
                    driver_id = %driver_id,
                    sequence = outcome.sequence,
                    "delivery claimed"
                );
                Ok(slot)
            }
            Err(ledger_err) => {
                // Compensate: reopen the slot so another driver (or a retry)
                // can take it once the order recovers.
                warn!(
                    order_id = %order_id,
                    driver_id = %driver_id,
                    error = %ledger_err,
                    "claim transition rejected, reopening slot"
                );
                if let Err(release_err) = self.pool.release_claim(order_id, driver_id) {
                    // The claim we just took must be releasable; anything
                    // else means the slot was mutated outside the broker.
                    error!(
                        order_id = %order_id,
                        error = %release_err,
                        "claim rollback failed"
                    );
                }
                Err(Error::Ledger(ledger_err))
            }
        }
    }

    /// Complete a delivery
    ///
    /// Only the claim holder may finish; the order is committed as
    /// `delivered` and the slot archived.
    pub async fn finish(&self, order_id: Uuid, driver_id: Uuid) -> Result<TransitionOutcome> {
        self.pool.verify_owner(order_id, driver_id)?;

        let outcome = self
            .ledger
            .request_transition(order_id, Trigger::DriverFinish, Actor::Driver(driver_id))
            .await?;

        self.pool.archive(order_id)?;
        info!(
            order_id = %order_id,
            driver_id = %driver_id,
            sequence = outcome.sequence,
            "delivery finished"
        );

        Ok(outcome)
    }
}
