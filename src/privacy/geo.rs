//! Geolocation coarsening policy
//!
//! Raw coordinates are published only when the fix is accurate enough and
//! the location did not come from a manual or geocoded source. Everything
//! else is snapped to a coarse grid or suppressed entirely, and the
//! reported provider is masked so rastered positions cannot be told apart
//! from one another.

/// Latitude grid denominator (roughly 100 m of northing)
pub const LAT_GRID: f64 = 1111.0;

/// Longitude grid denominator (roughly 100 m of easting at this latitude band)
pub const LON_GRID: f64 = 741.0;

/// Reported accuracy floor for manually sourced positions, meters
pub const RESTRICTED_ACCURACY_M: f64 = 100.0;

/// Provider label published for masked sources
pub const RASTERED_SOURCE: &str = "rastered";

/// Raw location fields as fetched from the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Reported accuracy in meters
    pub accuracy: Option<f64>,
    /// Location provider (`gps`, `network`, `manual`, `geocoder`, ...)
    pub provider: Option<String>,
}

/// Location fields as they may be published
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishedLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub source: Option<String>,
    pub accuracy: Option<f64>,
}

/// Providers whose positions were entered or geocoded rather than measured
fn is_restricted(provider: &str) -> bool {
    matches!(provider, "manual" | "geocoder")
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Apply the coarsening policy to one raw location
///
/// `detail_limit_m` is the configured accuracy bound below which a position
/// is considered precise enough to publish at all.
pub fn coarsen(raw: &RawLocation, detail_limit_m: f64) -> PublishedLocation {
    let restricted = raw
        .provider
        .as_deref()
        .map(is_restricted)
        .unwrap_or(false);

    let (latitude, longitude) = match raw.accuracy {
        Some(acc) if acc < detail_limit_m && !restricted => (raw.latitude, raw.longitude),
        Some(acc) if acc < detail_limit_m => (
            raw.latitude.map(|v| (v * LAT_GRID).round() / LAT_GRID),
            raw.longitude.map(|v| (v * LON_GRID).round() / LON_GRID),
        ),
        _ => (None, None),
    };

    let accuracy = match raw.accuracy {
        Some(acc) if acc < detail_limit_m && !restricted => Some(round_tenth(acc)),
        Some(acc) if acc < RESTRICTED_ACCURACY_M && restricted => Some(RESTRICTED_ACCURACY_M),
        Some(acc) if acc < detail_limit_m => Some(round_tenth(acc)),
        _ => None,
    };

    let source = raw.provider.as_deref().map(|p| {
        if is_restricted(p) {
            RASTERED_SOURCE.to_string()
        } else {
            p.to_string()
        }
    });

    PublishedLocation {
        latitude,
        longitude,
        source,
        accuracy,
    }
}
