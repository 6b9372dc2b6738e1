//! Delivery slot store
//!
//! The pool owns every `DeliverySlot`. The claim race is settled here: a
//! claim mutates `claimed_by` while holding the slot's sharded-map entry
//! guard, so the conditional check and the write are one critical section.
//! There is no read-then-write gap for a rival claimant to slip through.

use crate::{
    metrics::Metrics,
    types::{DeliverySlot, GeoBounds, GeoPoint},
    Error, Result,
};
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

/// Delivery pool
pub struct DeliveryPool {
    /// Slots keyed by order ID (1:1)
    slots: DashMap<Uuid, DeliverySlot>,

    /// Metrics
    metrics: Metrics,
}

impl DeliveryPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
            metrics: Metrics::default(),
        }
    }

    /// Open a slot for an order entering preparation
    pub fn open_slot(
        &self,
        order_id: Uuid,
        pickup_location: GeoPoint,
        destination: GeoPoint,
    ) -> Result<DeliverySlot> {
        match self.slots.entry(order_id) {
            Entry::Occupied(_) => Err(Error::SlotAlreadyOpen(order_id)),
            Entry::Vacant(vacant) => {
                let slot = DeliverySlot {
                    order_id,
                    pickup_location,
                    destination,
                    claimed_by: None,
                    claimed_at: None,
                    opened_at: Utc::now(),
                    archived: false,
                };
                vacant.insert(slot.clone());
                self.metrics.slots_opened.inc();
                debug!(order_id = %order_id, "delivery slot opened");
                Ok(slot)
            }
        }
    }

    /// Point-in-time snapshot of open slots, optionally geo-filtered
    ///
    /// This is a read, not a subscription; a listed slot may already be
    /// claimed by the time the caller acts on it.
    pub fn list_unclaimed(&self, bounds: Option<&GeoBounds>) -> Vec<DeliverySlot> {
        self.slots
            .iter()
            .filter(|entry| entry.value().is_unclaimed())
            .filter(|entry| {
                bounds
                    .map(|b| b.contains(&entry.value().pickup_location))
                    .unwrap_or(true)
            })
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Atomically claim a slot for a driver
    ///
    /// Exactly one caller among concurrent claimants succeeds; the rest get
    /// `AlreadyClaimed`. A retry by the holder is answered idempotently.
    pub fn try_claim(&self, order_id: Uuid, driver_id: Uuid) -> Result<DeliverySlot> {
        // get_mut holds the entry's write guard for the whole check-and-set.
        let mut entry = self
            .slots
            .get_mut(&order_id)
            .ok_or(Error::SlotNotFound(order_id))?;
        let slot = entry.value_mut();

        match slot.claimed_by {
            Some(holder) if holder == driver_id => Ok(slot.clone()),
            Some(_) => {
                self.metrics.claims_contended.inc();
                Err(Error::AlreadyClaimed { order_id })
            }
            None if slot.archived => {
                self.metrics.claims_contended.inc();
                Err(Error::AlreadyClaimed { order_id })
            }
            None => {
                slot.claimed_by = Some(driver_id);
                slot.claimed_at = Some(Utc::now());
                self.metrics.claims_won.inc();
                debug!(order_id = %order_id, driver_id = %driver_id, "slot claimed");
                Ok(slot.clone())
            }
        }
    }

    /// Compensation path: reopen a slot whose downstream transition failed
    ///
    /// Clears the claim only if `driver_id` holds it.
    pub fn release_claim(&self, order_id: Uuid, driver_id: Uuid) -> Result<()> {
        let mut entry = self
            .slots
            .get_mut(&order_id)
            .ok_or(Error::SlotNotFound(order_id))?;
        let slot = entry.value_mut();

        match slot.claimed_by {
            Some(holder) if holder == driver_id => {
                slot.claimed_by = None;
                slot.claimed_at = None;
                self.metrics.claims_released.inc();
                debug!(order_id = %order_id, driver_id = %driver_id, "claim released");
                Ok(())
            }
            _ => Err(Error::NotClaimOwner { order_id, driver_id }),
        }
    }

    /// Check that `driver_id` holds the claim
    pub fn verify_owner(&self, order_id: Uuid, driver_id: Uuid) -> Result<()> {
        let entry = self
            .slots
            .get(&order_id)
            .ok_or(Error::SlotNotFound(order_id))?;
        if entry.value().claimed_by == Some(driver_id) {
            Ok(())
        } else {
            Err(Error::NotClaimOwner { order_id, driver_id })
        }
    }

    /// Archive a slot once its order reaches a terminal state
    ///
    /// Archived slots stay resident for cross-service lookups.
    pub fn archive(&self, order_id: Uuid) -> Result<()> {
        let mut entry = self
            .slots
            .get_mut(&order_id)
            .ok_or(Error::SlotNotFound(order_id))?;
        entry.value_mut().archived = true;
        Ok(())
    }

    /// Authoritative slot record for an order
    pub fn get_delivery(&self, order_id: Uuid) -> Result<DeliverySlot> {
        self.slots
            .get(&order_id)
            .map(|entry| entry.value().clone())
            .ok_or(Error::SlotNotFound(order_id))
    }

    /// Number of slots (open + archived)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if the pool holds no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

impl Default for DeliveryPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint { lat, lng }
    }

    fn open_test_slot(pool: &DeliveryPool) -> Uuid {
        let order_id = Uuid::new_v4();
        pool.open_slot(order_id, point(40.7, -74.0), point(40.8, -73.9))
            .unwrap();
        order_id
    }

    #[test]
    fn test_open_slot_is_one_to_one() {
        let pool = DeliveryPool::new();
        let order_id = open_test_slot(&pool);

        let err = pool
            .open_slot(order_id, point(0.0, 0.0), point(1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, Error::SlotAlreadyOpen(_)));
    }

    #[test]
    fn test_claim_then_rival_fails() {
        let pool = DeliveryPool::new();
        let order_id = open_test_slot(&pool);
        let winner = Uuid::new_v4();
        let rival = Uuid::new_v4();

        let slot = pool.try_claim(order_id, winner).unwrap();
        assert_eq!(slot.claimed_by, Some(winner));

        let err = pool.try_claim(order_id, rival).unwrap_err();
        assert!(matches!(err, Error::AlreadyClaimed { .. }));

        // Holder retry is idempotent.
        let again = pool.try_claim(order_id, winner).unwrap();
        assert_eq!(again.claimed_by, Some(winner));
    }

    #[test]
    fn test_release_reopens_slot() {
        let pool = DeliveryPool::new();
        let order_id = open_test_slot(&pool);
        let driver = Uuid::new_v4();
        let other = Uuid::new_v4();

        pool.try_claim(order_id, driver).unwrap();

        // Only the holder may release.
        assert!(matches!(
            pool.release_claim(order_id, other),
            Err(Error::NotClaimOwner { .. })
        ));

        pool.release_claim(order_id, driver).unwrap();
        assert!(pool.get_delivery(order_id).unwrap().is_unclaimed());

        // Slot is claimable again, by anyone.
        pool.try_claim(order_id, other).unwrap();
    }

    #[test]
    fn test_archived_slot_not_claimable() {
        let pool = DeliveryPool::new();
        let order_id = open_test_slot(&pool);

        pool.archive(order_id).unwrap();
        let err = pool.try_claim(order_id, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::AlreadyClaimed { .. }));

        // Still resident for lookups.
        assert!(pool.get_delivery(order_id).unwrap().archived);
    }

    #[test]
    fn test_list_unclaimed_geo_filter() {
        let pool = DeliveryPool::new();
        let near = Uuid::new_v4();
        let far = Uuid::new_v4();
        pool.open_slot(near, point(40.7, -74.0), point(40.8, -73.9))
            .unwrap();
        pool.open_slot(far, point(34.0, -118.2), point(34.1, -118.1))
            .unwrap();

        let nyc = GeoBounds {
            min: point(40.0, -75.0),
            max: point(41.0, -73.0),
        };

        let listed = pool.list_unclaimed(Some(&nyc));
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].order_id, near);

        // No bounds: everything open.
        assert_eq!(pool.list_unclaimed(None).len(), 2);

        // Claimed slots drop out of the listing.
        pool.try_claim(near, Uuid::new_v4()).unwrap();
        assert!(pool.list_unclaimed(Some(&nyc)).is_empty());
    }

    #[test]
    fn test_contention_counter_tracks_losing_claims() {
        let pool = DeliveryPool::new();
        let order_id = open_test_slot(&pool);
        let winner = Uuid::new_v4();

        pool.try_claim(order_id, winner).unwrap();
        assert_eq!(pool.metrics().claims_won.get(), 1);
        assert_eq!(pool.metrics().claims_contended.get(), 0);

        // Rival loses against the holder.
        pool.try_claim(order_id, Uuid::new_v4()).unwrap_err();
        assert_eq!(pool.metrics().claims_contended.get(), 1);

        // Holder retry is idempotent, not a second win.
        pool.try_claim(order_id, winner).unwrap();
        assert_eq!(pool.metrics().claims_won.get(), 1);

        // Claims against an archived slot count as contention too.
        pool.release_claim(order_id, winner).unwrap();
        pool.archive(order_id).unwrap();
        pool.try_claim(order_id, Uuid::new_v4()).unwrap_err();
        assert_eq!(pool.metrics().claims_contended.get(), 2);
        assert_eq!(pool.metrics().claims_released.get(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_claims_exactly_one_winner() {
        let pool = Arc::new(DeliveryPool::new());
        let order_id = open_test_slot(&pool);

        let mut handles = Vec::new();
        for _ in 0..32 {
            let pool = pool.clone();
            let driver = Uuid::new_v4();
            handles.push(tokio::spawn(async move {
                pool.try_claim(order_id, driver).map(|_| driver)
            }));
        }

        let mut winners = Vec::new();
        let mut losers = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(driver) => winners.push(driver),
                Err(Error::AlreadyClaimed { .. }) => losers += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(winners.len(), 1);
        assert_eq!(losers, 31);
        assert_eq!(
            pool.get_delivery(order_id).unwrap().claimed_by,
            Some(winners[0])
        );
        assert_eq!(pool.metrics().claims_won.get(), 1);
        assert_eq!(pool.metrics().claims_contended.get(), 31);
    }
}
