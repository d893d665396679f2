//! Great-circle distance on a spherical Earth.

use crate::model::geo::{GeoCoordinate, GeoError};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Returns the haversine distance between two coordinates in kilometers.
///
/// # Errors
/// - Returns `GeoError::InvalidCoordinate` when either input is out of range
///   or not finite.
pub fn distance_km(from: &GeoCoordinate, to: &GeoCoordinate) -> Result<f64, GeoError> {
    from.validate()?;
    to.validate()?;
    Ok(haversine_km(from, to))
}

fn haversine_km(from: &GeoCoordinate, to: &GeoCoordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = (to.latitude - from.latitude).to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::{distance_km, EARTH_RADIUS_KM};
    use crate::model::geo::{GeoCoordinate, GeoError};
    use std::f64::consts::PI;

    const ISTANBUL: GeoCoordinate = GeoCoordinate::new(41.0082, 28.9784);
    const ANKARA: GeoCoordinate = GeoCoordinate::new(39.9334, 32.8597);

    #[test]
    fn identical_points_are_zero_apart() {
        assert_eq!(distance_km(&ISTANBUL, &ISTANBUL).unwrap(), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let forward = distance_km(&ISTANBUL, &ANKARA).unwrap();
        let backward = distance_km(&ANKARA, &ISTANBUL).unwrap();
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn istanbul_to_ankara_is_about_350_km() {
        let distance = distance_km(&ISTANBUL, &ANKARA).unwrap();
        assert!((340.0..360.0).contains(&distance), "got {distance}");
    }

    #[test]
    fn antipodal_points_are_half_circumference_apart() {
        let a = GeoCoordinate::new(0.0, 0.0);
        let b = GeoCoordinate::new(0.0, 180.0);
        let distance = distance_km(&a, &b).unwrap();
        assert!((distance - PI * EARTH_RADIUS_KM).abs() < 1e-6);

        let north = GeoCoordinate::new(90.0, 0.0);
        let south = GeoCoordinate::new(-90.0, 0.0);
        let distance = distance_km(&north, &south).unwrap();
        assert!((distance - PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn invalid_input_is_rejected() {
        let bad = GeoCoordinate::new(120.0, 0.0);
        assert!(matches!(
            distance_km(&ISTANBUL, &bad),
            Err(GeoError::InvalidCoordinate { .. })
        ));
        assert!(distance_km(&bad, &ISTANBUL).is_err());
    }

    #[test]
    fn symmetry_holds_across_a_grid() {
        let points = [
            GeoCoordinate::new(-89.9, -179.9),
            GeoCoordinate::new(-33.86, 151.21),
            GeoCoordinate::new(0.0, 0.0),
            GeoCoordinate::new(51.5, -0.12),
            GeoCoordinate::new(89.9, 179.9),
        ];
        for a in &points {
            assert_eq!(distance_km(a, a).unwrap(), 0.0);
            for b in &points {
                let ab = distance_km(a, b).unwrap();
                let ba = distance_km(b, a).unwrap();
                assert!((ab - ba).abs() < 1e-9);
                assert!(ab >= 0.0);
            }
        }
    }
}
