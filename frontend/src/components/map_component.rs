use std::collections::HashMap;

use chrono::Local;
use fleet_map_lib::driver::DriverFeed;
use fleet_map_lib::layer::Layer;
use geojson::Value;
use gloo_utils::document;
use leaflet::{
    DivIcon, DivIconOptions, LatLng, Map, MapOptions, Marker, MarkerOptions, Point, Polygon,
    Polyline, PolylineOptions, Popup, PopupOptions, TileLayer, TileLayerOptions,
};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, Node, js_sys::Array};
use yew::prelude::*;

/// Base tile source behind the overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basemap {
    Street,
    Satellite,
}

const DEFAULT_CENTER: (f64, f64) = (-7.413499, 108.899023);
const DEFAULT_ZOOM: f64 = 13.0;

pub struct MapComponent {
    map: Map,
    container: HtmlElement,
    basemap: Basemap,
    tile_layer: TileLayer,
    overlays: HashMap<String, Vec<leaflet::Layer>>,
    driver_markers: Vec<Marker>,
}

#[derive(PartialEq, Properties, Clone)]
pub struct Props {
    pub basemap: Basemap,
    pub layers: Vec<Layer>,
    pub drivers: DriverFeed,
}

impl MapComponent {
    fn render_map(&self) -> Html {
        let node: &Node = &self.container.clone().into();
        Html::VRef(node.clone())
    }

    fn set_basemap(&mut self, basemap: Basemap) {
        if basemap == self.basemap {
            return;
        }
        self.tile_layer.remove();
        self.tile_layer = add_tile_layer(&self.map, basemap);
        self.basemap = basemap;
    }

    /// Layers are immutable once stored, so diffing by id is enough.
    fn sync_overlays(&mut self, layers: &[Layer]) {
        self.overlays.retain(|id, handles| {
            if layers.iter().any(|layer| &layer.id == id) {
                true
            } else {
                for handle in handles.iter() {
                    handle.remove();
                }
                false
            }
        });

        for layer in layers {
            if !self.overlays.contains_key(&layer.id) {
                self.overlays
                    .insert(layer.id.clone(), render_overlay(&self.map, layer));
            }
        }
    }

    /// The feed arrives as whole snapshots, so markers are rebuilt wholesale.
    fn sync_drivers(&mut self, drivers: &DriverFeed) {
        for marker in self.driver_markers.drain(..) {
            marker.remove();
        }

        for (driver_id, position) in drivers.iter() {
            let options = MarkerOptions::new();
            options.set_icon(driver_icon().into());
            let marker = Marker::new_with_options(
                &LatLng::new(position.latitude, position.longitude),
                &options,
            );

            let popup = Popup::new(&PopupOptions::default(), None);
            let updated = position.timestamp.with_timezone(&Local).format("%H:%M:%S");
            popup.set_content(&format!("Driver: {driver_id}<br>Last updated: {updated}").into());
            marker.bind_popup(&popup);

            marker.add_to(&self.map);
            self.driver_markers.push(marker);
        }
    }
}

impl Component for MapComponent {
    type Message = ();
    type Properties = Props;

    fn create(ctx: &Context<Self>) -> Self {
        let container: Element = document().create_element("div").unwrap();
        let container: HtmlElement = container.dyn_into().unwrap();
        container.set_class_name("map");

        let options = MapOptions::default();
        options.set_zoom_control(false);
        options.set_attribution_control(false);
        let map = Map::new_with_element(&container, &options);

        let basemap = ctx.props().basemap;
        let tile_layer = add_tile_layer(&map, basemap);

        Self {
            map,
            container,
            basemap,
            tile_layer,
            overlays: HashMap::new(),
            driver_markers: Vec::new(),
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render {
            self.map.set_view(
                &LatLng::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
                DEFAULT_ZOOM,
            );
            let props = ctx.props();
            self.sync_overlays(&props.layers);
            self.sync_drivers(&props.drivers);
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, _old_props: &Self::Properties) -> bool {
        self.map.invalidate_size(false);
        let props = ctx.props();
        self.set_basemap(props.basemap);
        self.sync_overlays(&props.layers);
        self.sync_drivers(&props.drivers);
        true
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        html! {
            <div class="map">
                {self.render_map()}
            </div>
        }
    }
}

fn add_tile_layer(map: &Map, basemap: Basemap) -> TileLayer {
    let url = match basemap {
        Basemap::Street => "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
        Basemap::Satellite => {
            "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
        }
    };
    let options = TileLayerOptions::new();
    options.set_update_when_idle(true);
    let tile_layer = TileLayer::new_options(url, &options);
    tile_layer.add_to(map);
    tile_layer
}

fn render_overlay(map: &Map, layer: &Layer) -> Vec<leaflet::Layer> {
    let mut handles = Vec::new();
    for feature in &layer.geojson.features {
        if let Some(geometry) = &feature.geometry {
            push_geometry(map, &layer.color, &geometry.value, &mut handles);
        }
    }
    handles
}

fn push_geometry(map: &Map, color: &str, value: &Value, handles: &mut Vec<leaflet::Layer>) {
    match value {
        Value::Point(position) => handles.push(add_point(map, color, position)),
        Value::MultiPoint(positions) => {
            for position in positions {
                handles.push(add_point(map, color, position));
            }
        }
        Value::LineString(line) => handles.push(add_line(map, color, line)),
        Value::MultiLineString(lines) => {
            for line in lines {
                handles.push(add_line(map, color, line));
            }
        }
        Value::Polygon(rings) => handles.push(add_polygon(map, color, rings)),
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                handles.push(add_polygon(map, color, rings));
            }
        }
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                push_geometry(map, color, &geometry.value, handles);
            }
        }
    }
}

// GeoJSON positions are [longitude, latitude].
fn lat_lng(position: &[f64]) -> LatLng {
    LatLng::new(position[1], position[0])
}

fn add_point(map: &Map, color: &str, position: &[f64]) -> leaflet::Layer {
    let options = MarkerOptions::new();
    options.set_icon(layer_dot_icon(color).into());
    let marker = Marker::new_with_options(&lat_lng(position), &options);
    marker.add_to(map);
    marker.unchecked_into()
}

fn add_line(map: &Map, color: &str, line: &[Vec<f64>]) -> leaflet::Layer {
    let points = Array::from_iter(line.iter().map(|position| lat_lng(position)));
    let polyline = Polyline::new_with_options(&points, &path_options(color, false));
    polyline.add_to(map);
    polyline.unchecked_into()
}

fn add_polygon(map: &Map, color: &str, rings: &[Vec<Vec<f64>>]) -> leaflet::Layer {
    let rings = Array::from_iter(
        rings
            .iter()
            .map(|ring| Array::from_iter(ring.iter().map(|position| lat_lng(position)))),
    );
    let polygon = Polygon::new_with_options(&rings, &path_options(color, true));
    polygon.add_to(map);
    polygon.unchecked_into()
}

fn path_options(color: &str, fill: bool) -> PolylineOptions {
    let options = PolylineOptions::new();
    options.set_color(color.to_string());
    options.set_weight(2.0);
    options.set_opacity(0.8);
    if fill {
        options.set_fill(true);
        options.set_fill_color(color.to_string());
        options.set_fill_opacity(0.4);
    }
    options
}

/// Small colored disc used instead of the default pin for point features.
fn layer_dot_icon(color: &str) -> DivIcon {
    let options = DivIconOptions::new();
    options.set_html(format!(
        "<div class=\"dot-marker\" style=\"background-color: {color};\"></div>"
    ));
    options.set_class_name("layer-marker".to_string());
    options.set_icon_size(Point::new(12.0, 12.0));
    options.set_icon_anchor(Point::new(6.0, 6.0));
    DivIcon::new(&options)
}

fn driver_icon() -> DivIcon {
    let options = DivIconOptions::new();
    options.set_html("<div class=\"driver-dot\"></div>".to_string());
    options.set_class_name("driver-marker".to_string());
    options.set_icon_size(Point::new(20.0, 20.0));
    options.set_icon_anchor(Point::new(10.0, 10.0));
    DivIcon::new(&options)
}
