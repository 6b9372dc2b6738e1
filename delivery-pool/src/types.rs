//! Types for the delivery pool

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A geographic point (WGS84 degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
}

/// An axis-aligned geographic bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    /// South-west corner
    pub min: GeoPoint,
    /// North-east corner
    pub max: GeoPoint,
}

impl GeoBounds {
    /// Check whether a point lies inside the box (inclusive)
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lat >= self.min.lat
            && point.lat <= self.max.lat
            && point.lng >= self.min.lng
            && point.lng <= self.max.lng
    }
}

/// A claimable unit of delivery work, 1:1 with an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverySlot {
    /// Order this slot delivers
    pub order_id: Uuid,

    /// Restaurant pickup location
    pub pickup_location: GeoPoint,

    /// Customer destination
    pub destination: GeoPoint,

    /// Driver holding the claim (at most one, ever)
    pub claimed_by: Option<Uuid>,

    /// When the claim was taken
    pub claimed_at: Option<DateTime<Utc>>,

    /// When the slot was opened
    pub opened_at: DateTime<Utc>,

    /// Archived slots are kept for lookups but are no longer claimable
    pub archived: bool,
}

impl DeliverySlot {
    /// Check whether the slot is open for claiming
    pub fn is_unclaimed(&self) -> bool {
        self.claimed_by.is_none() && !self.archived
    }
}
