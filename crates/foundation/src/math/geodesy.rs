/// Latitude limit of the geographic frame (degrees).
pub const MAX_LAT_DEG: f64 = 90.0;

/// Wraps a longitude into `[-180, 180)`.
///
/// Datasets published on a `[0, 360)` grid and on a `[-180, 180)` grid end up
/// on the same convention, so projections only ever see one range.
pub fn wrap_lon_deg(lon_deg: f64) -> f64 {
    (lon_deg + 180.0).rem_euclid(360.0) - 180.0
}

pub fn is_valid_lat_deg(lat_deg: f64) -> bool {
    lat_deg.is_finite() && (-MAX_LAT_DEG..=MAX_LAT_DEG).contains(&lat_deg)
}

/// Geographic coordinates in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    /// Both coordinates are finite and the latitude lies on the globe.
    pub fn is_plottable(&self) -> bool {
        self.lon_deg.is_finite() && is_valid_lat_deg(self.lat_deg)
    }
}
