//! Nearby place (restaurant) record returned by places lookups.

use crate::model::geo::GeoCoordinate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub id: String,
    pub name: String,
    /// 0.0 when the source has no rating.
    pub rating: f64,
    /// 1 (cheap) to 4 (expensive).
    pub price_level: Option<u8>,
    pub vicinity: String,
    pub location: GeoCoordinate,
    pub types: Vec<String>,
    pub business_status: Option<String>,
    pub open_now: Option<bool>,
}

impl PlaceRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        vicinity: impl Into<String>,
        location: GeoCoordinate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rating: 0.0,
            price_level: None,
            vicinity: vicinity.into(),
            location,
            types: Vec::new(),
            business_status: None,
            open_now: None,
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_price_level(mut self, price_level: u8) -> Self {
        self.price_level = Some(price_level);
        self
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_business_status(mut self, status: impl Into<String>) -> Self {
        self.business_status = Some(status.into());
        self
    }

    /// Dollar-sign label shown next to the place name.
    pub fn price_level_label(&self) -> &'static str {
        match self.price_level {
            Some(1) => "$",
            Some(2) => "$$",
            Some(3) => "$$$",
            Some(4) => "$$$$",
            _ => "N/A",
        }
    }

    pub fn has_type(&self, wanted: &str) -> bool {
        self.types.iter().any(|value| value == wanted)
    }
}
