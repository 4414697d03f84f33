use std::collections::HashMap;

use geojson::{FeatureCollection, GeoJson};

use crate::error::ApiError;
use crate::geometry::GeometryKind;

/// One named, colored overlay backed by a single document in the layer
/// collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub color: String,
    pub geojson: FeatureCollection,
    pub geometry_kind: GeometryKind,
}

impl Layer {
    /// The geometry kind is derived here once and never re-derived.
    pub fn new(id: String, name: String, color: String, geojson: FeatureCollection) -> Self {
        let geometry_kind = GeometryKind::of_collection(&geojson);
        Self {
            id,
            name,
            color,
            geojson,
            geometry_kind,
        }
    }
}

pub fn parse_feature_collection(text: &str) -> Result<FeatureCollection, ApiError> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|err: geojson::Error| ApiError::Parse(err.to_string()))?;
    FeatureCollection::try_from(geojson).map_err(|err| ApiError::Parse(err.to_string()))
}

/// Upload precondition, checked before any backend call is made.
pub fn validate_upload(name: &str, file_selected: bool) -> Result<(), ApiError> {
    if name.trim().is_empty() || !file_selected {
        return Err(ApiError::Validation(
            "Please fill in the layer name and choose a GeoJSON file!".to_string(),
        ));
    }
    Ok(())
}

/// Overlay layers mirrored from the document store, plus the per-layer
/// visibility flags that only live in the client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerStore {
    layers: Vec<Layer>,
    visible: HashMap<String, bool>,
}

impl LayerStore {
    /// Replace the whole list with a fresh fetch. Every loaded layer starts
    /// visible.
    pub fn replace_all(&mut self, layers: Vec<Layer>) {
        self.visible = layers.iter().map(|layer| (layer.id.clone(), true)).collect();
        self.layers = layers;
    }

    /// Append a newly created layer, visible by default. An existing layer
    /// with the same id is replaced so ids stay unique.
    pub fn insert(&mut self, layer: Layer) {
        self.visible.insert(layer.id.clone(), true);
        if let Some(existing) = self.layers.iter_mut().find(|l| l.id == layer.id) {
            *existing = layer;
        } else {
            self.layers.push(layer);
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Layer> {
        self.visible.remove(id);
        let index = self.layers.iter().position(|layer| layer.id == id)?;
        Some(self.layers.remove(index))
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) {
        if self.layers.iter().any(|layer| layer.id == id) {
            self.visible.insert(id.to_string(), visible);
        }
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.get(id).copied().unwrap_or(false)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn visible_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|layer| self.is_visible(&layer.id))
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE_COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": {"type": "LineString", "coordinates": [[108.9, -7.4], [108.91, -7.41]]},
            "properties": {"name": "Jalan Raya"}
        }]
    }"#;

    fn line_layer(id: &str, name: &str) -> Layer {
        Layer::new(
            id.to_string(),
            name.to_string(),
            "#00ff00".to_string(),
            parse_feature_collection(LINE_COLLECTION).unwrap(),
        )
    }

    #[test]
    fn upload_requires_name_and_file() {
        assert!(matches!(validate_upload("", true), Err(ApiError::Validation(_))));
        assert!(matches!(validate_upload("   ", true), Err(ApiError::Validation(_))));
        assert!(matches!(validate_upload("Roads", false), Err(ApiError::Validation(_))));
        assert_eq!(validate_upload("Roads", true), Ok(()));
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        assert!(matches!(
            parse_feature_collection("{not geojson"),
            Err(ApiError::Parse(_))
        ));
        assert!(matches!(
            parse_feature_collection(r#"{"type": "Feature", "geometry": null, "properties": {}}"#),
            Err(ApiError::Parse(_))
        ));
    }

    #[test]
    fn inserted_layer_is_classified_and_visible() {
        let mut store = LayerStore::default();
        store.insert(line_layer("abc123", "Roads"));

        assert_eq!(store.len(), 1);
        let layer = &store.layers()[0];
        assert_eq!(layer.geometry_kind, GeometryKind::Line);
        assert!(store.is_visible("abc123"));
    }

    #[test]
    fn replace_all_resets_visibility_to_true() {
        let mut store = LayerStore::default();
        store.insert(line_layer("a", "One"));
        store.set_visible("a", false);

        store.replace_all(vec![line_layer("a", "One"), line_layer("b", "Two")]);
        assert_eq!(store.len(), 2);
        assert!(store.is_visible("a"));
        assert!(store.is_visible("b"));
    }

    #[test]
    fn remove_drops_layer_and_visibility_entry() {
        let mut store = LayerStore::default();
        store.insert(line_layer("a", "One"));
        store.insert(line_layer("b", "Two"));

        assert!(store.remove("a").is_some());
        assert_eq!(store.len(), 1);
        assert!(!store.is_visible("a"));
        assert!(store.is_visible("b"));

        // Unknown id leaves the store unchanged.
        assert!(store.remove("ghost").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn visibility_toggle_is_local_only() {
        let mut store = LayerStore::default();
        store.insert(line_layer("a", "One"));

        store.set_visible("a", false);
        assert!(!store.is_visible("a"));
        assert_eq!(store.visible_layers().count(), 0);

        store.set_visible("a", true);
        assert_eq!(store.visible_layers().count(), 1);

        // Toggling an unknown id does not invent an entry.
        store.set_visible("ghost", true);
        assert!(!store.is_visible("ghost"));
    }

    #[test]
    fn insert_with_duplicate_id_replaces() {
        let mut store = LayerStore::default();
        store.insert(line_layer("a", "One"));
        store.insert(line_layer("a", "Renamed"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.layers()[0].name, "Renamed");
    }
}
