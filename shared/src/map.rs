//! Map View Defaults
//!
//! What the presentation layer needs to bring up the world map: the tile
//! pyramid, the zoom range and the home view. The map is a flat image in
//! pixel-ish coordinates, not a geographic projection.

use serde::Serialize;

use crate::geometry::LatLng;

/// Road tile pyramid of the game world.
pub const TILE_URL: &str = "https://gta5-map.github.io/tiles/road/{z}-{x}_{y}.png";

/// Center of the inhabited map, also the fallback position for rows whose
/// coordinates cannot be recovered.
pub const MAP_HOME: LatLng = LatLng::new(-70.0, 120.0);

/// Zoom the map opens at.
pub const HOME_ZOOM: u8 = 3;

/// Static view configuration handed to the map widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapViewConfig {
    pub tile_url: String,
    pub tile_size: u32,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub home: LatLng,
    pub home_zoom: u8,
    pub attribution: String,
}

impl Default for MapViewConfig {
    fn default() -> Self {
        Self {
            tile_url: TILE_URL.to_owned(),
            tile_size: 256,
            min_zoom: 3,
            max_zoom: 7,
            home: MAP_HOME,
            home_zoom: HOME_ZOOM,
            attribution: "GTA V Map".to_owned(),
        }
    }
}
