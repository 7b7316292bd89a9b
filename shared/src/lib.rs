//! Shared types for the Revier map stack
//!
//! Domain model for georeferenced zones, the codec between stored records
//! and rendered map shapes, and the per-type style table. Pure data and
//! conversion logic; nothing in here does I/O.

pub mod codec;
pub mod geometry;
pub mod map;
pub mod models;
pub mod style;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use codec::{DEFAULT_RADIUS, MapShape, ShapeDescriptor, ZoneForm, record_to_shape, shape_to_record};
pub use geometry::{Bounds, Geometry, LatLng, Position, Ring};
pub use map::{MAP_HOME, MapViewConfig};
pub use models::{
    Principal, Role, Zone, ZoneCounts, ZoneDraft, ZoneFilter, ZoneInsertRow, ZonePatch, ZoneShape,
    ZoneType, ZoneUpdateRow,
};
pub use style::{MarkerIcon, TypeStyle, style_for, type_label};
