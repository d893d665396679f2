use restaurantgo_core::{
    CoreConfig, GeoCoordinate, LocationService, LocationSource, NearbyService, NearbySource,
    PushLocationProvider, UnconfiguredPlacesProvider, DEFAULT_LOCATION,
};
use std::sync::{Arc, Mutex};

#[test]
fn denied_location_still_produces_catalogue_around_default() {
    let config = CoreConfig::default();
    let provider = Arc::new(PushLocationProvider::new());
    provider.set_permission(false);

    let location = LocationService::new(provider, &config).current_location();
    assert_eq!(location.source, LocationSource::Fallback);
    assert_eq!(location.coordinate, DEFAULT_LOCATION);

    let mut nearby = NearbyService::new(UnconfiguredPlacesProvider, &config);
    let result = nearby.fetch(&location.coordinate).unwrap();
    assert_eq!(result.source, NearbySource::Fallback);
    assert!(!result.places.is_empty());
    assert!(result
        .places
        .windows(2)
        .all(|pair| pair[0].distance_km <= pair[1].distance_km));
}

#[test]
fn watched_fixes_drive_threshold_refreshes() {
    let config = CoreConfig::default();
    let provider = Arc::new(PushLocationProvider::new());
    let location = LocationService::new(Arc::clone(&provider), &config);

    let fixes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&fixes);
    let handle = location
        .watch(
            Box::new(move |fix| sink.lock().unwrap().push(fix)),
            Box::new(|_| {}),
        )
        .unwrap();

    provider.push_fix(GeoCoordinate::new(41.0, 29.0));
    provider.push_fix(GeoCoordinate::new(41.001, 29.0));
    provider.push_fix(GeoCoordinate::new(41.02, 29.0));
    location.stop_watching(handle);
    provider.push_fix(GeoCoordinate::new(42.0, 29.0));

    let mut nearby = NearbyService::new(UnconfiguredPlacesProvider, &config);
    let refreshes = fixes
        .lock()
        .unwrap()
        .iter()
        .filter(|fix| nearby.on_location_update(fix).unwrap().is_some())
        .count();
    assert_eq!(refreshes, 2);
    assert_eq!(nearby.last_center(), Some(GeoCoordinate::new(41.02, 29.0)));
}
