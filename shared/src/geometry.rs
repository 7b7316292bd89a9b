//! Map Geometry
//!
//! GeoJSON-style geometry as persisted in the `geometry` column, plus the
//! `[lat, lng]` pair the map side works in. The world map is a flat image
//! pyramid, not a geographic projection: `x` is stored as longitude and `y`
//! as latitude, so converting between the two orders is a plain swap.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A stored coordinate pair in GeoJSON `[lng, lat]` order.
pub type Position = [f64; 2];

/// One polygon ring. The first ring is the outer boundary.
pub type Ring = Vec<Position>;

/// Persisted geometry of a zone.
///
/// Only the two variants the editor produces. Anything else found in the
/// column fails the lenient field parse and is treated as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    Polygon { coordinates: Vec<Ring> },
}

impl Geometry {
    /// Point coordinates, if this is a point.
    pub fn as_point(&self) -> Option<Position> {
        match self {
            Geometry::Point { coordinates } => Some(*coordinates),
            Geometry::Polygon { .. } => None,
        }
    }

    /// Bounding box over every position, or `None` for empty geometry.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;
        let mut extend = |position: &Position| {
            let point = LatLng::from_position(*position);
            match bounds.as_mut() {
                Some(b) => b.extend(point),
                None => bounds = Some(Bounds::of(point)),
            }
        };
        match self {
            Geometry::Point { coordinates } => extend(coordinates),
            Geometry::Polygon { coordinates } => {
                for ring in coordinates {
                    for position in ring {
                        extend(position);
                    }
                }
            }
        }
        bounds
    }
}

/// A point in map order (`lat` first), the order Leaflet-style widgets and
/// the persisted `center` column use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// From a stored GeoJSON position, swapping `[lng, lat]` to map order.
    pub const fn from_position(position: Position) -> Self {
        Self {
            lat: position[1],
            lng: position[0],
        }
    }

    /// Back to GeoJSON `[lng, lat]` order.
    pub const fn to_position(self) -> Position {
        [self.lng, self.lat]
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.lat, self.lng)
    }
}

// `center` is persisted as a bare `[lat, lng]` array, not an object.
impl Serialize for LatLng {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.lat, self.lng].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LatLng {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [lat, lng] = <[f64; 2]>::deserialize(deserializer)?;
        Ok(Self { lat, lng })
    }
}

/// Axis-aligned bounding box in map order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    /// Degenerate box around a single point.
    pub const fn of(point: LatLng) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    /// Box around a center point, `half` units out on both axes.
    pub fn around(center: LatLng, half: f64) -> Self {
        Self {
            south_west: LatLng::new(center.lat - half, center.lng - half),
            north_east: LatLng::new(center.lat + half, center.lng + half),
        }
    }

    /// Grow to include `point`.
    pub fn extend(&mut self, point: LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Smallest box containing both.
    pub fn union(mut self, other: Bounds) -> Bounds {
        self.extend(other.south_west);
        self.extend(other.north_east);
        self
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}
