use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};

/// Coarse geometry kind of an overlay layer, used for legend rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
    Unknown,
}

impl GeometryKind {
    /// Classify a feature collection by its first feature's geometry type
    /// string. Mixed collections are classified by their first member only.
    pub fn of_collection(collection: &FeatureCollection) -> Self {
        let Some(type_name) = collection
            .features
            .first()
            .and_then(|feature| feature.geometry.as_ref())
            .map(|geometry| geometry.value.type_name())
        else {
            return Self::Unknown;
        };

        if type_name.contains("Point") {
            Self::Point
        } else if type_name.contains("LineString") {
            Self::Line
        } else if type_name.contains("Polygon") {
            Self::Polygon
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Line => "line",
            Self::Polygon => "polygon",
            Self::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::parse_feature_collection;

    fn collection(features_json: &str) -> FeatureCollection {
        parse_feature_collection(&format!(
            r#"{{"type": "FeatureCollection", "features": [{features_json}]}}"#
        ))
        .unwrap()
    }

    #[test]
    fn empty_collection_is_unknown() {
        let collection = collection("");
        assert_eq!(GeometryKind::of_collection(&collection), GeometryKind::Unknown);
    }

    #[test]
    fn feature_without_geometry_is_unknown() {
        let collection =
            collection(r#"{"type": "Feature", "geometry": null, "properties": {}}"#);
        assert_eq!(GeometryKind::of_collection(&collection), GeometryKind::Unknown);
    }

    #[test]
    fn first_feature_decides_for_mixed_collections() {
        let collection = collection(
            r#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": [108.9, -7.4]}, "properties": {}},
               {"type": "Feature", "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]}, "properties": {}}"#,
        );
        assert_eq!(GeometryKind::of_collection(&collection), GeometryKind::Point);
    }

    #[test]
    fn multi_variants_classify_by_substring() {
        let multi_point = collection(
            r#"{"type": "Feature", "geometry": {"type": "MultiPoint", "coordinates": [[108.9, -7.4]]}, "properties": {}}"#,
        );
        assert_eq!(GeometryKind::of_collection(&multi_point), GeometryKind::Point);

        let multi_line = collection(
            r#"{"type": "Feature", "geometry": {"type": "MultiLineString", "coordinates": [[[0.0, 0.0], [1.0, 1.0]]]}, "properties": {}}"#,
        );
        assert_eq!(GeometryKind::of_collection(&multi_line), GeometryKind::Line);

        let multi_polygon = collection(
            r#"{"type": "Feature", "geometry": {"type": "MultiPolygon", "coordinates": [[[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]]}, "properties": {}}"#,
        );
        assert_eq!(GeometryKind::of_collection(&multi_polygon), GeometryKind::Polygon);
    }

    #[test]
    fn geometry_collection_is_unknown() {
        let collection = collection(
            r#"{"type": "Feature", "geometry": {"type": "GeometryCollection", "geometries": []}, "properties": {}}"#,
        );
        assert_eq!(GeometryKind::of_collection(&collection), GeometryKind::Unknown);
    }

    #[test]
    fn line_string_is_line() {
        let collection = collection(
            r#"{"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[108.9, -7.4], [108.91, -7.41]]}, "properties": {}}"#,
        );
        assert_eq!(GeometryKind::of_collection(&collection), GeometryKind::Line);
    }
}
