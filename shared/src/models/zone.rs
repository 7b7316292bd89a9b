//! Zone Model
//!
//! Row model of the hosted `zones` table plus the insert/update payloads
//! the editor sends back. Tags are open-ended on purpose: rows written by
//! newer builds or by hand must load, render with the neutral fallback and
//! save back unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::serde_helpers;
use crate::geometry::{Geometry, LatLng};

/// Zone category tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ZoneType {
    Base,
    Bauverbot,
    Aktionspunkt,
    Safezone,
    /// Unrecognized tag, preserved verbatim across load and save.
    Other(String),
}

impl ZoneType {
    pub fn as_str(&self) -> &str {
        match self {
            ZoneType::Base => "base",
            ZoneType::Bauverbot => "bauverbot",
            ZoneType::Aktionspunkt => "aktionspunkt",
            ZoneType::Safezone => "safezone",
            ZoneType::Other(raw) => raw,
        }
    }
}

impl Default for ZoneType {
    fn default() -> Self {
        ZoneType::Base
    }
}

impl From<String> for ZoneType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "base" => ZoneType::Base,
            "bauverbot" => ZoneType::Bauverbot,
            "aktionspunkt" => ZoneType::Aktionspunkt,
            "safezone" => ZoneType::Safezone,
            _ => ZoneType::Other(raw),
        }
    }
}

impl From<ZoneType> for String {
    fn from(zone_type: ZoneType) -> Self {
        match zone_type {
            ZoneType::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for ZoneType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the zone was drawn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ZoneShape {
    Polygon,
    Rectangle,
    Circle,
    Marker,
    /// Unrecognized tag, rendered as a plain outline when geometry allows.
    Other(String),
}

impl ZoneShape {
    pub fn as_str(&self) -> &str {
        match self {
            ZoneShape::Polygon => "polygon",
            ZoneShape::Rectangle => "rectangle",
            ZoneShape::Circle => "circle",
            ZoneShape::Marker => "marker",
            ZoneShape::Other(raw) => raw,
        }
    }
}

impl Default for ZoneShape {
    fn default() -> Self {
        ZoneShape::Polygon
    }
}

impl From<String> for ZoneShape {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "polygon" => ZoneShape::Polygon,
            "rectangle" => ZoneShape::Rectangle,
            "circle" => ZoneShape::Circle,
            "marker" => ZoneShape::Marker,
            _ => ZoneShape::Other(raw),
        }
    }
}

impl From<ZoneShape> for String {
    fn from(shape: ZoneShape) -> Self {
        match shape {
            ZoneShape::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for ZoneShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A georeferenced zone row.
///
/// `radius` and `center` only carry meaning for circles; both stay stored
/// whatever the shape says. `geometry` and `center` decode leniently so one
/// mangled cell cannot take the whole list down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: Uuid,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub plz: String,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "serde_helpers::null_as_default"
    )]
    pub zone_type: ZoneType,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub shape: ZoneShape,
    #[serde(default, deserialize_with = "serde_helpers::lenient_opt")]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default, deserialize_with = "serde_helpers::lenient_opt")]
    pub center: Option<LatLng>,
    #[serde(default)]
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new zone.
///
/// Defaults mirror what the table itself fills in, so a draft built from a
/// bare drawn shape is already complete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub plz: String,
    #[serde(rename = "type", default)]
    pub zone_type: ZoneType,
    #[serde(default)]
    pub shape: ZoneShape,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub center: Option<LatLng>,
}

/// Partial update. Absent fields never reach the wire, so the store leaves
/// them untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZonePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plz: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<ZoneType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<ZoneShape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<LatLng>,
}

impl ZonePatch {
    /// True when no field is set. Such an update still refreshes the row's
    /// `updated_at` and nothing else.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.plz.is_none()
            && self.zone_type.is_none()
            && self.shape.is_none()
            && self.geometry.is_none()
            && self.radius.is_none()
            && self.center.is_none()
    }

    /// Store-side application: only present fields overwrite the row.
    pub fn apply_to(&self, zone: &mut Zone) {
        if let Some(name) = &self.name {
            zone.name = name.clone();
        }
        if let Some(plz) = &self.plz {
            zone.plz = plz.clone();
        }
        if let Some(zone_type) = &self.zone_type {
            zone.zone_type = zone_type.clone();
        }
        if let Some(shape) = &self.shape {
            zone.shape = shape.clone();
        }
        if let Some(geometry) = &self.geometry {
            zone.geometry = Some(geometry.clone());
        }
        if let Some(radius) = self.radius {
            zone.radius = Some(radius);
        }
        if let Some(center) = self.center {
            zone.center = Some(center);
        }
    }
}

/// Wire form of an insert: the draft plus creator attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneInsertRow {
    #[serde(flatten)]
    pub draft: ZoneDraft,
    pub created_by: Option<Uuid>,
}

/// Wire form of an update: the patch plus the client-refreshed timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneUpdateRow {
    #[serde(flatten)]
    pub patch: ZonePatch,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate counts for the viewer sidebar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneCounts {
    pub base: usize,
    pub bauverbot: usize,
    pub safezone: usize,
    pub aktionspunkt: usize,
}

impl ZoneCounts {
    /// Tally by type. Tags without a bucket of their own count as action
    /// points, which is what the sidebar has always shown for stray tags.
    pub fn tally<'a, I>(zones: I) -> Self
    where
        I: IntoIterator<Item = &'a Zone>,
    {
        let mut counts = Self::default();
        for zone in zones {
            match &zone.zone_type {
                ZoneType::Base => counts.base += 1,
                ZoneType::Bauverbot => counts.bauverbot += 1,
                ZoneType::Safezone => counts.safezone += 1,
                ZoneType::Aktionspunkt | ZoneType::Other(_) => counts.aktionspunkt += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.base + self.bauverbot + self.safezone + self.aktionspunkt
    }
}

/// Sidebar filter: optional type plus a free-text needle over name and PLZ.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneFilter {
    pub zone_type: Option<ZoneType>,
    pub query: String,
}

impl ZoneFilter {
    pub fn matches(&self, zone: &Zone) -> bool {
        if let Some(wanted) = &self.zone_type {
            if &zone.zone_type != wanted {
                return false;
            }
        }
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let haystack = format!("{} {}", zone.name, zone.plz).to_lowercase();
        haystack.contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn zone_with_type(zone_type: ZoneType) -> Zone {
        Zone {
            id: Uuid::new_v4(),
            name: String::new(),
            plz: String::new(),
            zone_type,
            shape: ZoneShape::Polygon,
            geometry: None,
            radius: None,
            center: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_defaults_for_missing_fields() {
        let row = json!({
            "id": "7b0e4f5e-9c2a-4bd8-8f6f-5a1d2c3b4a59",
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z",
        });
        let zone: Zone = serde_json::from_value(row).unwrap();
        assert_eq!(zone.name, "");
        assert_eq!(zone.plz, "");
        assert_eq!(zone.zone_type, ZoneType::Base);
        assert_eq!(zone.shape, ZoneShape::Polygon);
        assert_eq!(zone.geometry, None);
        assert_eq!(zone.radius, None);
        assert_eq!(zone.center, None);
        assert_eq!(zone.created_by, None);
    }

    #[test]
    fn test_row_survives_null_and_malformed_cells() {
        let row = json!({
            "id": "7b0e4f5e-9c2a-4bd8-8f6f-5a1d2c3b4a59",
            "name": null,
            "plz": null,
            "type": null,
            "shape": "circle",
            "geometry": "{\"type\":\"Point\",\"coordinates\":[1,2]}",
            "radius": null,
            "center": [[1.0, 2.0]],
            "created_by": null,
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z",
        });
        let zone: Zone = serde_json::from_value(row).unwrap();
        assert_eq!(zone.name, "");
        assert_eq!(zone.zone_type, ZoneType::Base);
        assert_eq!(zone.shape, ZoneShape::Circle);
        // Doubly-encoded geometry and a nested center both count as absent.
        assert_eq!(zone.geometry, None);
        assert_eq!(zone.center, None);
        assert_eq!(zone.radius, None);
    }

    #[test]
    fn test_unknown_tags_roundtrip_verbatim() {
        let zone_type = ZoneType::from("gangwar".to_owned());
        assert_eq!(zone_type, ZoneType::Other("gangwar".to_owned()));
        assert_eq!(serde_json::to_value(&zone_type).unwrap(), json!("gangwar"));

        let shape: ZoneShape = serde_json::from_value(json!("blob")).unwrap();
        assert_eq!(shape, ZoneShape::Other("blob".to_owned()));
        assert_eq!(serde_json::to_value(&shape).unwrap(), json!("blob"));
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = ZonePatch {
            name: Some("Neue Base".to_owned()),
            ..ZonePatch::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "name": "Neue Base" })
        );

        let empty = ZonePatch::default();
        assert!(empty.is_empty());
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({}));
    }

    #[test]
    fn test_patch_apply_touches_only_present_fields() {
        let mut zone = zone_with_type(ZoneType::Base);
        zone.name = "Alt".to_owned();
        zone.plz = "7001".to_owned();
        zone.radius = Some(50.0);

        let patch = ZonePatch {
            name: Some("Neu".to_owned()),
            zone_type: Some(ZoneType::Bauverbot),
            ..ZonePatch::default()
        };
        patch.apply_to(&mut zone);

        assert_eq!(zone.name, "Neu");
        assert_eq!(zone.zone_type, ZoneType::Bauverbot);
        assert_eq!(zone.plz, "7001");
        assert_eq!(zone.radius, Some(50.0));
    }

    #[test]
    fn test_insert_row_flattens_draft_with_explicit_nulls() {
        let row = ZoneInsertRow {
            draft: ZoneDraft {
                name: "Grove Base".to_owned(),
                plz: "7001".to_owned(),
                zone_type: ZoneType::Base,
                shape: ZoneShape::Circle,
                geometry: None,
                radius: Some(75.0),
                center: Some(LatLng::new(10.0, 20.0)),
            },
            created_by: None,
        };
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            json!({
                "name": "Grove Base",
                "plz": "7001",
                "type": "base",
                "shape": "circle",
                "geometry": null,
                "radius": 75.0,
                "center": [10.0, 20.0],
                "created_by": null,
            })
        );
    }

    #[test]
    fn test_update_row_carries_timestamp_beside_patch() {
        let updated_at = Utc::now();
        let row = ZoneUpdateRow {
            patch: ZonePatch::default(),
            updated_at,
        };
        let value = serde_json::to_value(&row).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("updated_at"));
    }

    #[test]
    fn test_counts_bucket_unknown_types_as_action_points() {
        let zones = vec![
            zone_with_type(ZoneType::Base),
            zone_with_type(ZoneType::Base),
            zone_with_type(ZoneType::Bauverbot),
            zone_with_type(ZoneType::Safezone),
            zone_with_type(ZoneType::Aktionspunkt),
            zone_with_type(ZoneType::Other("gangwar".to_owned())),
        ];
        let counts = ZoneCounts::tally(&zones);
        assert_eq!(counts.base, 2);
        assert_eq!(counts.bauverbot, 1);
        assert_eq!(counts.safezone, 1);
        assert_eq!(counts.aktionspunkt, 2);
        assert_eq!(counts.total(), 6);
    }

    #[test]
    fn test_filter_matches_type_and_query() {
        let mut zone = zone_with_type(ZoneType::Base);
        zone.name = "Grove Street".to_owned();
        zone.plz = "7001".to_owned();

        let everything = ZoneFilter::default();
        assert!(everything.matches(&zone));

        let by_type = ZoneFilter {
            zone_type: Some(ZoneType::Bauverbot),
            ..ZoneFilter::default()
        };
        assert!(!by_type.matches(&zone));

        let by_query = ZoneFilter {
            query: "  GROVE ".to_owned(),
            ..ZoneFilter::default()
        };
        assert!(by_query.matches(&zone));

        let by_plz = ZoneFilter {
            query: "7001".to_owned(),
            ..ZoneFilter::default()
        };
        assert!(by_plz.matches(&zone));

        let no_match = ZoneFilter {
            query: "ballas".to_owned(),
            ..ZoneFilter::default()
        };
        assert!(!no_match.matches(&zone));
    }
}
