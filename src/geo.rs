// ---------------------------------------------------------------------------
// Geographic points and great-circle distance
// ---------------------------------------------------------------------------

/// Mean Earth radius in miles, matching the reference haversine constant.
const EARTH_RADIUS_MILES: f64 = 3956.0;

/// A (latitude, longitude) pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Great-circle distance in miles between two points, via the haversine
/// formula:
///
/// ```text
/// a = sin²(Δlat/2) + cos(lat₁)·cos(lat₂)·sin²(Δlon/2)
/// c = 2·arcsin(√a)
/// d = c · R        (R = 3956 miles)
/// ```
pub fn haversine_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat_a, lon_a) = (a.lat.to_radians(), a.lon.to_radians());
    let (lat_b, lon_b) = (b.lat.to_radians(), b.lon.to_radians());
    let d_lat = lat_b - lat_a;
    let d_lon = lon_b - lon_a;
    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();
    c * EARTH_RADIUS_MILES
}
