use fleet_map_lib::geometry::GeometryKind;
use yew::prelude::*;

/// What the sidebar needs to know about one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerEntry {
    pub id: String,
    pub name: String,
    pub color: String,
    pub kind: GeometryKind,
    pub visible: bool,
}

#[derive(PartialEq, Properties, Clone)]
pub struct Props {
    pub entries: Vec<LayerEntry>,
    pub is_admin: bool,
    pub on_toggle: Callback<String>,
    pub on_delete: Callback<String>,
}

#[function_component]
pub fn LayerPanel(props: &Props) -> Html {
    html! {
        <div class="sidebar">
            <h3>{"Layer Control"}</h3>
            if props.entries.is_empty() {
                <p class="empty-note">{"No layers available"}</p>
            } else {
                { for props.entries.iter().map(|entry| layer_row(props, entry)) }
            }
        </div>
    }
}

fn layer_row(props: &Props, entry: &LayerEntry) -> Html {
    let toggle = {
        let id = entry.id.clone();
        let on_toggle = props.on_toggle.clone();
        Callback::from(move |_| on_toggle.emit(id.clone()))
    };
    let delete = {
        let id = entry.id.clone();
        let on_delete = props.on_delete.clone();
        Callback::from(move |_| on_delete.emit(id.clone()))
    };

    // The legend swatch takes the shape of the layer's geometry.
    let swatch_kind = match entry.kind {
        GeometryKind::Point => "swatch-point",
        GeometryKind::Line => "swatch-line",
        GeometryKind::Polygon | GeometryKind::Unknown => "swatch-area",
    };

    html! {
        <div class="layer-row" key={entry.id.clone()}>
            <input type="checkbox" checked={entry.visible} onchange={toggle} />
            <span class="layer-name">{ &entry.name }</span>
            <div
                class={classes!("swatch", swatch_kind)}
                style={format!("background-color: {};", entry.color)}
            ></div>
            if props.is_admin {
                <button class="delete-btn" title="Delete layer" onclick={delete}>{"X"}</button>
            }
        </div>
    }
}
