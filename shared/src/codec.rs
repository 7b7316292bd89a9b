//! Record ↔ Shape Codec
//!
//! The two conversions the editor lives on: a stored [`Zone`] row becomes a
//! [`ShapeDescriptor`] for the map to draw, and a drawn [`MapShape`] plus
//! the form fields becomes a [`ZoneDraft`] to insert. Both directions are
//! pure. Nothing here validates geometry; what was drawn is what is stored.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Bounds, Geometry, LatLng};
use crate::map::MAP_HOME;
use crate::models::{Zone, ZoneDraft, ZoneShape, ZoneType};
use crate::style::{MarkerIcon, TypeStyle, style_for};

/// Radius used when a circle row carries none (or a zero left by the old
/// editor).
pub const DEFAULT_RADIUS: f64 = 50.0;

/// Renderable geometry, tagged by how it was drawn.
///
/// The tag is carried explicitly so a rectangle stays a rectangle across
/// any number of load/save cycles; nothing downstream inspects runtime
/// types to find out what a shape is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum MapShape {
    Polygon { geometry: Geometry },
    Rectangle { geometry: Geometry },
    Circle { center: LatLng, radius: f64 },
    Marker { at: LatLng },
}

impl MapShape {
    /// Shape tag as persisted.
    pub fn tag(&self) -> ZoneShape {
        match self {
            MapShape::Polygon { .. } => ZoneShape::Polygon,
            MapShape::Rectangle { .. } => ZoneShape::Rectangle,
            MapShape::Circle { .. } => ZoneShape::Circle,
            MapShape::Marker { .. } => ZoneShape::Marker,
        }
    }

    /// Popup anchor. Points anchor on themselves, outlines on the center of
    /// their bounds, and an empty outline on the map home.
    pub fn anchor(&self) -> LatLng {
        match self {
            MapShape::Circle { center, .. } => *center,
            MapShape::Marker { at } => *at,
            MapShape::Polygon { geometry } | MapShape::Rectangle { geometry } => geometry
                .bounds()
                .map(|bounds| bounds.center())
                .unwrap_or(MAP_HOME),
        }
    }

    /// Bounding box, `None` for an outline without positions.
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            MapShape::Circle { center, radius } => Some(Bounds::around(*center, *radius)),
            MapShape::Marker { at } => Some(Bounds::of(*at)),
            MapShape::Polygon { geometry } | MapShape::Rectangle { geometry } => geometry.bounds(),
        }
    }
}

/// Render contract for one zone on the map.
///
/// The presentation layer draws exactly what this says and reports
/// interactions back by `zone_id`; it never looks at the row itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDescriptor {
    pub zone_id: Uuid,
    #[serde(rename = "type")]
    pub zone_type: ZoneType,
    #[serde(flatten)]
    pub shape: MapShape,
}

impl ShapeDescriptor {
    pub fn style(&self) -> &'static TypeStyle {
        style_for(&self.zone_type)
    }

    /// Icon for point zones, `None` for outlines and circles.
    pub fn marker_icon(&self) -> Option<MarkerIcon> {
        match self.shape {
            MapShape::Marker { .. } => Some(MarkerIcon::for_type(&self.zone_type)),
            _ => None,
        }
    }

    pub fn anchor(&self) -> LatLng {
        self.shape.anchor()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.shape.bounds()
    }
}

/// The editable form fields that ride along with a drawn shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub plz: String,
    #[serde(rename = "type", default)]
    pub zone_type: ZoneType,
}

/// Build the render contract for a stored row.
///
/// Returns `None` when the row cannot be drawn at all, which only happens
/// for an outline without usable geometry. Circles and markers always
/// render somewhere: a circle prefers its `center`, then a stored point
/// (swapped back to map order), then the map home; a marker does the same
/// minus the `center` step. A missing or zero radius becomes
/// [`DEFAULT_RADIUS`].
pub fn record_to_shape(zone: &Zone) -> Option<ShapeDescriptor> {
    let shape = match &zone.shape {
        ZoneShape::Circle => {
            let center = zone
                .center
                .or_else(|| point_of(zone).map(LatLng::from_position))
                .unwrap_or(MAP_HOME);
            let radius = match zone.radius {
                Some(radius) if radius != 0.0 => radius,
                _ => DEFAULT_RADIUS,
            };
            MapShape::Circle { center, radius }
        }
        ZoneShape::Marker => MapShape::Marker {
            at: point_of(zone).map(LatLng::from_position).unwrap_or(MAP_HOME),
        },
        ZoneShape::Rectangle => MapShape::Rectangle {
            geometry: zone.geometry.clone()?,
        },
        // Unknown shape tags render as plain outlines when geometry allows.
        ZoneShape::Polygon | ZoneShape::Other(_) => MapShape::Polygon {
            geometry: zone.geometry.clone()?,
        },
    };
    Some(ShapeDescriptor {
        zone_id: zone.id,
        zone_type: zone.zone_type.clone(),
        shape,
    })
}

fn point_of(zone: &Zone) -> Option<[f64; 2]> {
    zone.geometry.as_ref().and_then(Geometry::as_point)
}

/// Build the insert payload for a drawn shape and its form fields.
///
/// Circles persist their point twice on purpose: `center`/`radius` in map
/// order for the editor, and a GeoJSON point so other consumers of the
/// table see a geometry column that is never empty for drawn shapes.
pub fn shape_to_record(shape: &MapShape, form: &ZoneForm) -> ZoneDraft {
    let mut draft = ZoneDraft {
        name: form.name.clone(),
        plz: form.plz.clone(),
        zone_type: form.zone_type.clone(),
        shape: shape.tag(),
        ..ZoneDraft::default()
    };
    match shape {
        MapShape::Circle { center, radius } => {
            draft.radius = Some(*radius);
            draft.center = Some(*center);
            draft.geometry = Some(Geometry::Point {
                coordinates: center.to_position(),
            });
        }
        MapShape::Marker { at } => {
            draft.geometry = Some(Geometry::Point {
                coordinates: at.to_position(),
            });
        }
        MapShape::Polygon { geometry } | MapShape::Rectangle { geometry } => {
            draft.geometry = Some(geometry.clone());
        }
    }
    draft
}
