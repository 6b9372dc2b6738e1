//! End-to-end fulfillment scenarios
//!
//! Exercises the complete coordination flow through the facade:
//! checkout → payment → acceptance → kitchen → competitive claim →
//! delivery → rating.

use coordinator::{Config, Coordinator, Error};
use delivery_pool::{GeoBounds, GeoPoint};
use order_ledger::OrderStatus;
use rating_service::SubjectType;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

fn point(lat: f64, lng: f64) -> GeoPoint {
    GeoPoint { lat, lng }
}

struct Flow {
    coordinator: Arc<Coordinator>,
    restaurant: Uuid,
    customer: Uuid,
    order_id: Uuid,
}

impl Flow {
    fn new() -> Self {
        let coordinator = Arc::new(Coordinator::new(Config::default()));
        let restaurant = Uuid::new_v4();
        let customer = Uuid::new_v4();
        let order = coordinator.checkout(restaurant, customer);
        Self {
            coordinator,
            restaurant,
            customer,
            order_id: order.order_id,
        }
    }

    /// Advance the order to `ready_for_pickup`
    async fn to_ready(&self) {
        self.coordinator.confirm_payment(self.order_id).await.unwrap();
        self.coordinator
            .accept_order(
                self.order_id,
                self.restaurant,
                point(40.7, -74.0),
                point(40.8, -73.9),
            )
            .await
            .unwrap();
        self.coordinator
            .kitchen_ready(self.order_id, self.restaurant)
            .await
            .unwrap();
    }

    /// Advance the order all the way to `delivered` by `driver`
    async fn to_delivered(&self, driver: Uuid) {
        self.to_ready().await;
        self.coordinator.claim_delivery(self.order_id, driver).await.unwrap();
        self.coordinator
            .finish_delivery(self.order_id, driver)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_happy_path_with_competitive_claim() {
    let flow = Flow::new();
    flow.to_ready().await;

    // The slot is visible to drivers browsing the area.
    let nyc = GeoBounds {
        min: point(40.0, -75.0),
        max: point(41.0, -73.0),
    };
    let listed = flow.coordinator.list_unclaimed(Some(&nyc));
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].order_id, flow.order_id);

    // Two drivers race for the same order; exactly one wins.
    let d1 = Uuid::new_v4();
    let d2 = Uuid::new_v4();
    let (c1, c2) = tokio::join!(
        flow.coordinator.claim_delivery(flow.order_id, d1),
        flow.coordinator.claim_delivery(flow.order_id, d2),
    );

    let winner = match (&c1, &c2) {
        (Ok(_), Err(Error::Pool(delivery_pool::Error::AlreadyClaimed { .. }))) => d1,
        (Err(Error::Pool(delivery_pool::Error::AlreadyClaimed { .. })), Ok(_)) => d2,
        other => panic!("expected exactly one winner, got {:?}", other.0.is_ok()),
    };

    let order = flow.coordinator.ledger().get_order(flow.order_id).unwrap();
    assert_eq!(order.status, OrderStatus::OutForDelivery);
    assert_eq!(order.driver_id, Some(winner));

    // The claimed slot is gone from the pool listing.
    assert!(flow.coordinator.list_unclaimed(Some(&nyc)).is_empty());
}

#[tokio::test]
async fn test_statuses_follow_the_lifecycle_in_order() {
    let flow = Flow::new();
    let driver = Uuid::new_v4();
    flow.to_delivered(driver).await;

    let history = flow.coordinator.ledger().get_history(flow.order_id).unwrap();
    let statuses: Vec<OrderStatus> = history.iter().map(|r| r.to).collect();
    assert_eq!(
        statuses,
        vec![
            OrderStatus::PendingRestaurantAccept,
            OrderStatus::PreparingOrder,
            OrderStatus::ReadyForPickup,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ]
    );
    let sequences: Vec<u64> = history.iter().map(|r| r.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_idempotent_payment_confirmation() {
    let flow = Flow::new();

    let first = flow.coordinator.confirm_payment(flow.order_id).await.unwrap();
    let second = flow.coordinator.confirm_payment(flow.order_id).await.unwrap();

    assert_eq!(first.status, second.status);
    assert_eq!(first.sequence, second.sequence);
}

#[tokio::test]
async fn test_cancellation_gated_to_pre_acceptance() {
    let flow = Flow::new();

    flow.coordinator.confirm_payment(flow.order_id).await.unwrap();
    flow.coordinator
        .accept_order(flow.order_id, flow.restaurant, point(40.7, -74.0), point(40.8, -73.9))
        .await
        .unwrap();

    // Cancellation after acceptance is not part of this core.
    let err = flow
        .coordinator
        .cancel_order(flow.order_id, flow.customer)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Ledger(order_ledger::Error::InvalidTransition { .. })
    ));

    let order = flow.coordinator.ledger().get_order(flow.order_id).unwrap();
    assert_eq!(order.status, OrderStatus::PreparingOrder);
}

#[tokio::test]
async fn test_payment_failure_cancels_order() {
    let flow = Flow::new();

    let outcome = flow.coordinator.fail_payment(flow.order_id).await.unwrap();
    assert_eq!(outcome.status, OrderStatus::Canceled);

    // A later confirmation of the same order is rejected.
    let err = flow.coordinator.confirm_payment(flow.order_id).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Ledger(order_ledger::Error::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn test_rating_before_delivery_not_eligible() {
    let flow = Flow::new();
    flow.to_ready().await;
    let driver = Uuid::new_v4();
    flow.coordinator.claim_delivery(flow.order_id, driver).await.unwrap();

    // Customer rates before the driver finishes.
    let err = flow
        .coordinator
        .submit_rating(flow.customer, flow.order_id, driver, SubjectType::Driver, 5, "")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Rating(rating_service::Error::NotEligible(_))));
}

#[tokio::test]
async fn test_rating_after_delivery_and_dedup() {
    let flow = Flow::new();
    let driver = Uuid::new_v4();
    flow.to_delivered(driver).await;

    flow.coordinator
        .submit_rating(flow.customer, flow.order_id, driver, SubjectType::Driver, 5, "great")
        .await
        .unwrap();

    let agg = flow.coordinator.get_aggregate(driver, SubjectType::Driver);
    assert_eq!(agg.count, 1);
    assert_eq!(agg.average_display(), Decimal::new(500, 2)); // 5.00

    // Second rating for the same order from the same customer.
    let err = flow
        .coordinator
        .submit_rating(flow.customer, flow.order_id, driver, SubjectType::Driver, 1, "")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Rating(rating_service::Error::AlreadyRated { .. })));

    // The restaurant can still be rated for the same order.
    flow.coordinator
        .submit_rating(
            flow.customer,
            flow.order_id,
            flow.restaurant,
            SubjectType::Restaurant,
            4,
            "",
        )
        .await
        .unwrap();
    let agg = flow
        .coordinator
        .get_aggregate(flow.restaurant, SubjectType::Restaurant);
    assert_eq!(agg.count, 1);
}

#[tokio::test]
async fn test_aggregate_over_multiple_orders() {
    let driver = Uuid::new_v4();
    let coordinator = Arc::new(Coordinator::new(Config::default()));

    // Three customers, three completed deliveries by the same driver.
    let scores = [5u8, 4, 4];
    for score in scores {
        let restaurant = Uuid::new_v4();
        let customer = Uuid::new_v4();
        let order = coordinator.checkout(restaurant, customer);

        coordinator.confirm_payment(order.order_id).await.unwrap();
        coordinator
            .accept_order(order.order_id, restaurant, point(40.7, -74.0), point(40.8, -73.9))
            .await
            .unwrap();
        coordinator.kitchen_ready(order.order_id, restaurant).await.unwrap();
        coordinator.claim_delivery(order.order_id, driver).await.unwrap();
        coordinator.finish_delivery(order.order_id, driver).await.unwrap();

        coordinator
            .submit_rating(customer, order.order_id, driver, SubjectType::Driver, score, "")
            .await
            .unwrap();
    }

    let agg = coordinator.get_aggregate(driver, SubjectType::Driver);
    assert_eq!(agg.count, 3);
    // (5+4+4)/3 = 4.333... → 4.33 for display.
    assert_eq!(agg.average_display(), Decimal::new(433, 2));

    // Reconciliation agrees with the incremental projection.
    let rebuilt = coordinator.ratings().recompute(driver, SubjectType::Driver);
    assert_eq!(rebuilt, agg);
}

#[tokio::test]
async fn test_startup_self_check_passes_on_fresh_core() {
    let coordinator = Coordinator::new(Config::default());
    coordinator.startup_self_check().await.unwrap();

    // Repeat runs keep passing; every check uses fresh synthetic IDs.
    coordinator.startup_self_check().await.unwrap();
}

#[tokio::test]
async fn test_unrated_subject_reads_zero() {
    let coordinator = Coordinator::new(Config::default());
    let agg = coordinator.get_aggregate(Uuid::new_v4(), SubjectType::Restaurant);
    assert_eq!(agg.count, 0);
    assert_eq!(agg.average(), Decimal::ZERO);
}

#[tokio::test]
async fn test_finish_by_non_owner_rejected() {
    let flow = Flow::new();
    flow.to_ready().await;
    let driver = Uuid::new_v4();
    let impostor = Uuid::new_v4();
    flow.coordinator.claim_delivery(flow.order_id, driver).await.unwrap();

    let err = flow
        .coordinator
        .finish_delivery(flow.order_id, impostor)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Pool(delivery_pool::Error::NotClaimOwner { .. })
    ));

    // The real driver still completes normally.
    let outcome = flow.coordinator.finish_delivery(flow.order_id, driver).await.unwrap();
    assert_eq!(outcome.status, OrderStatus::Delivered);
}
