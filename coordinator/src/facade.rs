//! Coordinator facade
//!
//! Single entry point for actor actions. Sequences calls across the order
//! ledger, the delivery pool and the rating service; no caller reaches into
//! a component's storage directly. Compensation for the claim race lives in
//! the broker; the facade propagates the first hard failure.

use crate::{config::Config, validator_impl::LocalValidator, Result};
use delivery_pool::{ClaimBroker, DeliveryPool, DeliverySlot, GeoBounds, GeoPoint};
use order_ledger::{Actor, Order, OrderLedger, TransitionOutcome, Trigger};
use rating_service::{AggregateRating, Rating, RatingService, RetryingValidator, SubjectType};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Coordinator facade
pub struct Coordinator {
    ledger: Arc<OrderLedger>,
    pool: Arc<DeliveryPool>,
    broker: ClaimBroker,
    ratings: RatingService,
}

impl Coordinator {
    /// Wire up the fulfillment core
    pub fn new(config: Config) -> Self {
        let ledger = Arc::new(OrderLedger::new(config.ledger));
        let pool = Arc::new(DeliveryPool::new());
        let broker = ClaimBroker::new(pool.clone(), ledger.clone());
        let validator = RetryingValidator::new(
            LocalValidator::new(pool.clone(), ledger.clone()),
            config.rating.retry.policy(),
        );
        let ratings = RatingService::new(Arc::new(validator));

        Self {
            ledger,
            pool,
            broker,
            ratings,
        }
    }

    /// Drive one synthetic order through the full lifecycle
    ///
    /// Startup self-check for the node binary: exercises checkout, payment,
    /// acceptance, kitchen, claim, finish and a rating against the freshly
    /// wired core, so a broken wiring fails the process at boot instead of
    /// on the first live order. The synthetic records stay resident; their
    /// IDs are random and collide with nothing.
    pub async fn startup_self_check(&self) -> Result<()> {
        let restaurant = Uuid::new_v4();
        let customer = Uuid::new_v4();
        let driver = Uuid::new_v4();

        let order = self.checkout(restaurant, customer);
        self.confirm_payment(order.order_id).await?;
        self.accept_order(
            order.order_id,
            restaurant,
            GeoPoint { lat: 0.0, lng: 0.0 },
            GeoPoint { lat: 0.0, lng: 0.1 },
        )
        .await?;
        self.kitchen_ready(order.order_id, restaurant).await?;
        self.claim_delivery(order.order_id, driver).await?;
        let outcome = self.finish_delivery(order.order_id, driver).await?;
        self.submit_rating(
            customer,
            order.order_id,
            driver,
            SubjectType::Driver,
            5,
            "startup check",
        )
        .await?;

        info!(
            order_id = %order.order_id,
            status = %outcome.status,
            "startup self-check passed"
        );
        Ok(())
    }

    /// Create an order at checkout (`payment_pending`)
    pub fn checkout(&self, restaurant_id: Uuid, customer_id: Uuid) -> Order {
        self.ledger.create_order(restaurant_id, customer_id)
    }

    /// Payment collaborator confirmed the charge
    pub async fn confirm_payment(&self, order_id: Uuid) -> Result<TransitionOutcome> {
        Ok(self
            .ledger
            .request_transition(order_id, Trigger::PaymentConfirmed, Actor::Payment)
            .await?)
    }

    /// Payment collaborator reported failure
    pub async fn fail_payment(&self, order_id: Uuid) -> Result<TransitionOutcome> {
        Ok(self
            .ledger
            .request_transition(order_id, Trigger::PaymentFailed, Actor::Payment)
            .await?)
    }

    /// Customer cancels (pre-acceptance only; the table gates this)
    pub async fn cancel_order(&self, order_id: Uuid, customer_id: Uuid) -> Result<TransitionOutcome> {
        Ok(self
            .ledger
            .request_transition(order_id, Trigger::CustomerCancel, Actor::Customer(customer_id))
            .await?)
    }

    /// Operator override cancel (pre-acceptance only)
    pub async fn operator_cancel(
        &self,
        order_id: Uuid,
        operator_id: Uuid,
    ) -> Result<TransitionOutcome> {
        Ok(self
            .ledger
            .request_transition(order_id, Trigger::OperatorCancel, Actor::Operator(operator_id))
            .await?)
    }

    /// Restaurant accepts; on success a delivery slot opens
    ///
    /// Pickup/destination come from the caller (the CRUD layer owns
    /// restaurant and customer addresses). An idempotent accept retry finds
    /// the slot already open and succeeds.
    pub async fn accept_order(
        &self,
        order_id: Uuid,
        restaurant_id: Uuid,
        pickup: GeoPoint,
        destination: GeoPoint,
    ) -> Result<TransitionOutcome> {
        let outcome = self
            .ledger
            .request_transition(order_id, Trigger::RestaurantAccept, Actor::Restaurant(restaurant_id))
            .await?;

        match self.pool.open_slot(order_id, pickup, destination) {
            Ok(_) => {
                info!(order_id = %order_id, "order accepted, delivery slot opened");
                Ok(outcome)
            }
            // Accept retry after an earlier success: the slot exists already.
            Err(delivery_pool::Error::SlotAlreadyOpen(_)) => Ok(outcome),
            Err(e) => Err(e.into()),
        }
    }

    /// Restaurant rejects the order
    pub async fn reject_order(
        &self,
        order_id: Uuid,
        restaurant_id: Uuid,
    ) -> Result<TransitionOutcome> {
        Ok(self
            .ledger
            .request_transition(order_id, Trigger::RestaurantReject, Actor::Restaurant(restaurant_id))
            .await?)
    }

    /// Kitchen finished; the order becomes claimable
    pub async fn kitchen_ready(
        &self,
        order_id: Uuid,
        restaurant_id: Uuid,
    ) -> Result<TransitionOutcome> {
        Ok(self
            .ledger
            .request_transition(order_id, Trigger::KitchenReady, Actor::Restaurant(restaurant_id))
            .await?)
    }

    /// Snapshot of claimable deliveries, optionally geo-bounded
    pub fn list_unclaimed(&self, bounds: Option<&GeoBounds>) -> Vec<DeliverySlot> {
        self.pool.list_unclaimed(bounds)
    }

    /// Driver claims a delivery (exactly one concurrent claimant wins)
    pub async fn claim_delivery(&self, order_id: Uuid, driver_id: Uuid) -> Result<DeliverySlot> {
        Ok(self.broker.claim(order_id, driver_id).await?)
    }

    /// Claiming driver completes the delivery
    pub async fn finish_delivery(
        &self,
        order_id: Uuid,
        driver_id: Uuid,
    ) -> Result<TransitionOutcome> {
        Ok(self.broker.finish(order_id, driver_id).await?)
    }

    /// Customer rates a driver or restaurant for a completed order
    pub async fn submit_rating(
        &self,
        rater_id: Uuid,
        order_id: Uuid,
        subject_id: Uuid,
        subject_type: SubjectType,
        score: u8,
        comment: impl Into<String>,
    ) -> Result<Rating> {
        Ok(self
            .ratings
            .submit_rating(rater_id, order_id, subject_id, subject_type, score, comment)
            .await?)
    }

    /// Current aggregate for a subject (zero-valued when unrated)
    pub fn get_aggregate(&self, subject_id: Uuid, subject_type: SubjectType) -> AggregateRating {
        self.ratings.get_aggregate(subject_id, subject_type)
    }

    /// Order ledger (reads only; mutations go through the facade)
    pub fn ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    /// Rating service
    pub fn ratings(&self) -> &RatingService {
        &self.ratings
    }
}
