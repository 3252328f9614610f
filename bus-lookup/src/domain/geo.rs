//! Geographic coordinates and great-circle distance.

use std::fmt;

/// Mean Earth radius used for distance calculations.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Error returned for coordinates outside the valid range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinates: {reason}")]
pub struct InvalidCoordinates {
    reason: &'static str,
}

/// A WGS84 latitude/longitude pair in degrees.
///
/// Latitude is always in [-90, 90] and longitude in [-180, 180].
#[derive(Clone, Copy, PartialEq)]
pub struct Coordinates {
    lat: f64,
    lon: f64,
}

impl Coordinates {
    /// Create coordinates, validating their range.
    ///
    /// # Examples
    ///
    /// ```
    /// use bus_lookup::domain::Coordinates;
    ///
    /// assert!(Coordinates::new(59.43, 24.75).is_ok());
    /// assert!(Coordinates::new(91.0, 0.0).is_err());
    /// assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    /// ```
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidCoordinates> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(InvalidCoordinates {
                reason: "must be finite numbers",
            });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidCoordinates {
                reason: "latitude must be between -90 and 90",
            });
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(InvalidCoordinates {
                reason: "longitude must be between -180 and 180",
            });
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Great-circle distance in kilometres (spherical law of cosines).
    ///
    /// # Examples
    ///
    /// ```
    /// use bus_lookup::domain::Coordinates;
    ///
    /// let a = Coordinates::new(0.0, 0.0).unwrap();
    /// let b = Coordinates::new(0.0, 1.0).unwrap();
    /// assert!((a.distance_km(&b) - 111.19).abs() < 0.01);
    /// ```
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlon = (other.lon - self.lon).to_radians();

        let cos_angle = lat1.cos() * lat2.cos() * dlon.cos() + lat1.sin() * lat2.sin();
        // Rounding can push identical points slightly above 1.
        EARTH_RADIUS_KM * cos_angle.clamp(-1.0, 1.0).acos()
    }
}

impl fmt::Debug for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinates({}, {})", self.lat, self.lon)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> Coordinates {
        Coordinates::new(lat, lon).unwrap()
    }

    #[test]
    fn distance_to_self_is_zero() {
        let p = c(59.437, 24.7536);
        assert!(p.distance_km(&p) < 1e-3);
    }

    #[test]
    fn distance_is_symmetric() {
        let tallinn = c(59.437, 24.7536);
        let tartu = c(58.378, 26.729);
        let d1 = tallinn.distance_km(&tartu);
        let d2 = tartu.distance_km(&tallinn);
        assert!((d1 - d2).abs() < 1e-9);
        // Roughly 160 km apart.
        assert!((150.0..170.0).contains(&d1), "got {d1}");
    }

    #[test]
    fn antipodes() {
        let d = c(0.0, 0.0).distance_km(&c(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn range_validation() {
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert_eq!(
            Coordinates::new(0.0, 181.0).unwrap_err().to_string(),
            "invalid coordinates: longitude must be between -180 and 180"
        );
        assert!(Coordinates::new(f64::INFINITY, 0.0).is_err());
    }
}
