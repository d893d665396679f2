//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `restaurantgo_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use restaurantgo_core::fixtures::demo_restaurants;
use restaurantgo_core::{distance_km, progression_for_xp, DEFAULT_LOCATION};

fn main() {
    println!("restaurantgo_core ping={}", restaurantgo_core::ping());
    println!("restaurantgo_core version={}", restaurantgo_core::core_version());

    for xp in [0, 999, 1000, 2750] {
        match progression_for_xp(xp) {
            Ok(progress) => println!(
                "xp={xp} level={} into_level={} to_next={}",
                progress.level, progress.xp_into_level, progress.xp_needed_for_next_level
            ),
            Err(err) => println!("xp={xp} error={err}"),
        }
    }

    for place in demo_restaurants() {
        match distance_km(&DEFAULT_LOCATION, &place.location) {
            Ok(km) => println!("place={} distance_km={km:.3}", place.id),
            Err(err) => println!("place={} error={err}", place.id),
        }
    }
}
