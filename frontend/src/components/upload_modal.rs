use web_sys::{File, HtmlInputElement};
use yew::prelude::*;

#[derive(PartialEq, Properties, Clone)]
pub struct Props {
    pub name: String,
    pub color: String,
    pub on_name: Callback<String>,
    pub on_color: Callback<String>,
    pub on_file: Callback<Option<File>>,
    pub on_submit: Callback<()>,
    pub on_cancel: Callback<()>,
}

#[function_component]
pub fn UploadModal(props: &Props) -> Html {
    let name_input = {
        let on_name = props.on_name.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_name.emit(input.value());
        })
    };
    let color_input = {
        let on_color = props.on_color.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_color.emit(input.value());
        })
    };
    let file_input = {
        let on_file = props.on_file.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_file.emit(input.files().and_then(|files| files.get(0)));
        })
    };
    let submit = {
        let on_submit = props.on_submit.clone();
        Callback::from(move |_| on_submit.emit(()))
    };
    let cancel = {
        let on_cancel = props.on_cancel.clone();
        Callback::from(move |_| on_cancel.emit(()))
    };

    html! {
        <div class="modal-backdrop">
            <div class="modal upload-modal">
                <h2>{"Upload GeoJSON Layer"}</h2>
                <div class="form-field">
                    <label for="layer-name">{"Layer name"}</label>
                    <input
                        id="layer-name"
                        type="text"
                        placeholder="Enter layer name"
                        value={props.name.clone()}
                        oninput={name_input}
                    />
                </div>
                <div class="form-field">
                    <label for="layer-file">{"GeoJSON file"}</label>
                    <input
                        id="layer-file"
                        type="file"
                        accept=".geojson,application/geo+json"
                        onchange={file_input}
                    />
                </div>
                <div class="form-field">
                    <label for="layer-color">{"Layer color"}</label>
                    <input
                        id="layer-color"
                        type="color"
                        value={props.color.clone()}
                        oninput={color_input}
                    />
                </div>
                <div class="modal-actions">
                    <button class="cancel-btn" onclick={cancel}>{"Cancel"}</button>
                    <button class="confirm-btn" onclick={submit}>{"Upload"}</button>
                </div>
            </div>
        </div>
    }
}
