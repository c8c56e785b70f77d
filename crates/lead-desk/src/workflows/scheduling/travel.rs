use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::workflows::validation::normalize_zip;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelEstimate {
    pub minutes: u32,
    pub miles: f64,
}

impl TravelEstimate {
    pub const NONE: TravelEstimate = TravelEstimate {
        minutes: 0,
        miles: 0.0,
    };
}

/// Drive-time source between two postal codes. Implementations must always answer; an
/// unknown pair gets a conservative fallback rather than an error.
pub trait TravelTimeProvider: Send + Sync {
    fn estimate(&self, origin_zip: &str, destination_zip: &str) -> TravelEstimate;
}

const ZIP_CENTROIDS: &[(&str, f64, f64)] = &[
    ("78613", 30.5050, -97.8200),
    ("78628", 30.6330, -97.7500),
    ("78660", 30.4450, -97.5960),
    ("78664", 30.5140, -97.6680),
    ("78681", 30.5080, -97.7320),
    ("78701", 30.2711, -97.7437),
    ("78703", 30.2945, -97.7660),
    ("78704", 30.2430, -97.7650),
    ("78705", 30.2920, -97.7395),
    ("78717", 30.4890, -97.7530),
    ("78726", 30.4300, -97.8400),
    ("78730", 30.3650, -97.8250),
    ("78731", 30.3470, -97.7690),
    ("78732", 30.3780, -97.8920),
    ("78733", 30.3220, -97.8730),
    ("78735", 30.2680, -97.8680),
    ("78738", 30.3340, -97.9670),
    ("78739", 30.1790, -97.8880),
    ("78745", 30.2070, -97.7960),
    ("78746", 30.2970, -97.8090),
    ("78748", 30.1590, -97.8230),
    ("78749", 30.2160, -97.8580),
    ("78750", 30.4220, -97.7960),
    ("78759", 30.4030, -97.7520),
];

const EARTH_RADIUS_MILES: f64 = 3_958.8;

/// Straight-line distance between zip centroids, stretched by a road factor and driven at
/// a flat average speed.
#[derive(Debug, Clone)]
pub struct ZipCentroidTravel {
    centroids: HashMap<String, (f64, f64)>,
    road_factor: f64,
    average_mph: f64,
    minimum_minutes: u32,
    fallback: TravelEstimate,
}

impl ZipCentroidTravel {
    pub fn standard() -> Self {
        Self {
            centroids: ZIP_CENTROIDS
                .iter()
                .map(|(zip, lat, lon)| (zip.to_string(), (*lat, *lon)))
                .collect(),
            road_factor: 1.3,
            average_mph: 30.0,
            minimum_minutes: 5,
            fallback: TravelEstimate {
                minutes: 30,
                miles: 15.0,
            },
        }
    }

    pub fn with_centroid(mut self, zip: impl Into<String>, lat: f64, lon: f64) -> Self {
        self.centroids.insert(zip.into(), (lat, lon));
        self
    }

    fn centroid(&self, zip: &str) -> Option<(f64, f64)> {
        normalize_zip(zip).and_then(|zip| self.centroids.get(zip).copied())
    }
}

impl Default for ZipCentroidTravel {
    fn default() -> Self {
        Self::standard()
    }
}

impl TravelTimeProvider for ZipCentroidTravel {
    fn estimate(&self, origin_zip: &str, destination_zip: &str) -> TravelEstimate {
        let (Some(origin), Some(destination)) =
            (self.centroid(origin_zip), self.centroid(destination_zip))
        else {
            return self.fallback;
        };

        let miles = haversine_miles(origin, destination) * self.road_factor;
        let minutes = (miles / self.average_mph * 60.0).ceil() as u32;

        TravelEstimate {
            minutes: minutes.max(self.minimum_minutes),
            miles: (miles * 10.0).round() / 10.0,
        }
    }
}

fn haversine_miles((lat1, lon1): (f64, f64), (lat2, lon2): (f64, f64)) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * a.sqrt().asin()
}
