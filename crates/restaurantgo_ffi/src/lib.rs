//! Flutter-facing bridge for the RestaurantGO core.

pub mod api;
