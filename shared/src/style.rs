//! Zone Type Styling
//!
//! One lookup table per zone type. Stroke, fill, label and the CSS hooks
//! all come from the same entry, so a type can never show one color on the
//! map and another in the sidebar.

use serde::Serialize;

use crate::models::ZoneType;

/// Everything the presentation derives from a zone's type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TypeStyle {
    pub color: &'static str,
    pub fill_color: &'static str,
    pub fill_opacity: f64,
    pub weight: f64,
    pub opacity: f64,
    pub label: &'static str,
    pub badge_class: &'static str,
    pub dot_class: &'static str,
}

const BASE: TypeStyle = TypeStyle {
    color: "#00c8ff",
    fill_color: "#00c8ff",
    fill_opacity: 0.22,
    weight: 2.0,
    opacity: 0.8,
    label: "Base",
    badge_class: "badge-base",
    dot_class: "dot-base",
};

const BAUVERBOT: TypeStyle = TypeStyle {
    color: "#ff5a5a",
    fill_color: "#ff5a5a",
    fill_opacity: 0.22,
    weight: 2.0,
    opacity: 0.8,
    label: "Bauverbot",
    badge_class: "badge-bauverbot",
    dot_class: "dot-bauverbot",
};

const AKTIONSPUNKT: TypeStyle = TypeStyle {
    color: "#ffc800",
    fill_color: "#ffc800",
    fill_opacity: 0.22,
    weight: 2.0,
    opacity: 0.8,
    label: "Aktionspunkt",
    badge_class: "badge-aktionspunkt",
    dot_class: "dot-aktionspunkt",
};

const SAFEZONE: TypeStyle = TypeStyle {
    color: "#2ecc71",
    fill_color: "#2ecc71",
    fill_opacity: 0.22,
    weight: 2.0,
    opacity: 0.8,
    label: "Safezone",
    badge_class: "badge-safezone",
    dot_class: "dot-safezone",
};

/// Muted white for tags this build does not know.
const NEUTRAL: TypeStyle = TypeStyle {
    color: "#ffffff",
    fill_color: "#ffffff",
    fill_opacity: 0.12,
    weight: 2.0,
    opacity: 0.6,
    label: "Unbekannt",
    badge_class: "",
    dot_class: "",
};

/// Style entry for a zone type. Unknown tags get the neutral entry.
pub fn style_for(zone_type: &ZoneType) -> &'static TypeStyle {
    match zone_type {
        ZoneType::Base => &BASE,
        ZoneType::Bauverbot => &BAUVERBOT,
        ZoneType::Aktionspunkt => &AKTIONSPUNKT,
        ZoneType::Safezone => &SAFEZONE,
        ZoneType::Other(_) => &NEUTRAL,
    }
}

/// Human label for a zone type.
///
/// Unknown tags label as their raw tag so hand-entered rows stay
/// recognizable; an empty tag falls back to the neutral label.
pub fn type_label(zone_type: &ZoneType) -> &str {
    match zone_type {
        ZoneType::Other(raw) if !raw.is_empty() => raw,
        other => style_for(other).label,
    }
}

/// Marker rendering for point zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerIcon {
    /// Stock map pin.
    Pin,
    /// Small glowing dot in the action-point color.
    ActionDot,
}

impl MarkerIcon {
    /// Action points get the dot, everything else the pin.
    pub fn for_type(zone_type: &ZoneType) -> Self {
        if *zone_type == ZoneType::Aktionspunkt {
            MarkerIcon::ActionDot
        } else {
            MarkerIcon::Pin
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types_have_matching_label_and_classes() {
        let style = style_for(&ZoneType::Base);
        assert_eq!(style.color, "#00c8ff");
        assert_eq!(style.label, "Base");
        assert_eq!(style.badge_class, "badge-base");
        assert_eq!(style.dot_class, "dot-base");
        assert_eq!(style.fill_opacity, 0.22);

        assert_eq!(style_for(&ZoneType::Bauverbot).color, "#ff5a5a");
        assert_eq!(style_for(&ZoneType::Aktionspunkt).color, "#ffc800");
        assert_eq!(style_for(&ZoneType::Safezone).color, "#2ecc71");
    }

    #[test]
    fn test_unknown_type_gets_neutral_style_and_raw_label() {
        let stray = ZoneType::Other("gangwar".to_owned());
        let style = style_for(&stray);
        assert_eq!(style.color, "#ffffff");
        assert_eq!(style.fill_opacity, 0.12);
        assert_eq!(style.opacity, 0.6);
        assert_eq!(style.badge_class, "");
        assert_eq!(style.dot_class, "");
        assert_eq!(type_label(&stray), "gangwar");
    }

    #[test]
    fn test_empty_tag_labels_as_unbekannt() {
        let empty = ZoneType::Other(String::new());
        assert_eq!(type_label(&empty), "Unbekannt");
        assert_eq!(style_for(&empty).color, "#ffffff");
    }

    #[test]
    fn test_marker_icon_depends_on_type_only() {
        assert_eq!(MarkerIcon::for_type(&ZoneType::Aktionspunkt), MarkerIcon::ActionDot);
        assert_eq!(MarkerIcon::for_type(&ZoneType::Base), MarkerIcon::Pin);
        assert_eq!(
            MarkerIcon::for_type(&ZoneType::Other("gangwar".to_owned())),
            MarkerIcon::Pin
        );
    }
}
