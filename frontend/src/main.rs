use std::collections::HashMap;

use fleet_map_lib::driver::{DriverFeed, DriverPosition};
use fleet_map_lib::error::ApiError;
use fleet_map_lib::layer::{Layer, LayerStore, parse_feature_collection, validate_upload};
use fleet_map_lib::session::{Role, Session, UserInfo};
use gloo_console::{error, info};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{File, ServiceWorkerRegistration};
use yew::prelude::*;

use crate::components::layer_panel::{LayerEntry, LayerPanel};
use crate::components::login_modal::LoginModal;
use crate::components::map_component::{Basemap, MapComponent};
use crate::components::upload_modal::UploadModal;
use crate::geolocation::LocationWatcher;
use crate::realtime::DriverSubscription;

mod api;
mod components;
mod geolocation;
mod realtime;
mod storage;

enum MainMsg {
    LayersLoaded(Vec<Layer>),
    DriversChanged(HashMap<String, DriverPosition>),
    SetBasemap(Basemap),
    ToggleSidebar,
    ToggleLoginModal,
    ToggleUploadModal,
    SetUsername(String),
    SetPassword(String),
    SubmitLogin,
    LoginSucceeded(UserInfo),
    LoginFailed(ApiError),
    Logout,
    SetLayerName(String),
    SetLayerColor(String),
    SetLayerFile(Option<File>),
    SubmitUpload,
    UploadSucceeded(Layer),
    UploadFailed(ApiError),
    ToggleLayer(String),
    DeleteLayer(String),
    LayerDeleted(String),
    DeleteFailed(String, ApiError),
}

struct Model {
    session: Session,
    layers: LayerStore,
    drivers: DriverFeed,
    basemap: Basemap,

    show_sidebar: bool,
    show_login: bool,
    show_upload: bool,

    username: String,
    password: String,
    login_error: Option<String>,

    layer_name: String,
    layer_color: String,
    layer_file: Option<File>,

    watcher: Option<LocationWatcher>,
    _subscription: Option<DriverSubscription>,
}

impl Component for Model {
    type Message = MainMsg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let link = ctx.link().clone();

        let session = storage::load_session();

        // A restored driver session resumes publishing right away.
        let watcher = match session.user() {
            Some(user) if session.is_driver() => start_tracking(&user.username),
            _ => None,
        };

        let layers_loaded = link.callback(MainMsg::LayersLoaded);
        spawn_local(async move {
            match api::fetch_layers().await {
                Ok(layers) => layers_loaded.emit(layers),
                // Degrade to an empty list; the map stays usable.
                Err(err) => error!(format!("Failed to fetch layers: {err}")),
            }
        });

        let subscription =
            match DriverSubscription::subscribe(link.callback(MainMsg::DriversChanged)) {
                Ok(subscription) => Some(subscription),
                Err(err) => {
                    error!(format!("Failed to subscribe to driver positions: {err}"));
                    None
                }
            };

        Self {
            session,
            layers: LayerStore::default(),
            drivers: DriverFeed::default(),
            basemap: Basemap::Street,
            show_sidebar: false,
            show_login: false,
            show_upload: false,
            username: String::new(),
            password: String::new(),
            login_error: None,
            layer_name: String::new(),
            layer_color: DEFAULT_LAYER_COLOR.to_string(),
            layer_file: None,
            watcher,
            _subscription: subscription,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            MainMsg::LayersLoaded(layers) => {
                info!(format!("Loaded {} layers", layers.len()));
                self.layers.replace_all(layers);
                true
            }
            MainMsg::DriversChanged(snapshot) => {
                self.drivers.replace_snapshot(snapshot);
                true
            }
            MainMsg::SetBasemap(basemap) => {
                self.basemap = basemap;
                true
            }
            MainMsg::ToggleSidebar => {
                self.show_sidebar = !self.show_sidebar;
                true
            }
            MainMsg::ToggleLoginModal => {
                self.show_login = !self.show_login;
                self.username.clear();
                self.password.clear();
                self.login_error = None;
                true
            }
            MainMsg::ToggleUploadModal => {
                self.show_upload = !self.show_upload;
                if !self.show_upload {
                    self.reset_upload_form();
                }
                true
            }
            MainMsg::SetUsername(value) => {
                self.username = value;
                true
            }
            MainMsg::SetPassword(value) => {
                self.password = value;
                true
            }
            MainMsg::SubmitLogin => {
                self.login_error = None;
                let username = self.username.trim().to_string();
                let password = self.password.clone();
                let link = ctx.link().clone();
                spawn_local(async move {
                    match api::log_in(&username, &password).await {
                        Ok(user) => link.send_message(MainMsg::LoginSucceeded(user)),
                        Err(err) => link.send_message(MainMsg::LoginFailed(err)),
                    }
                });
                false
            }
            MainMsg::LoginSucceeded(user) => {
                storage::save_session(&user);
                if user.role == Role::Driver {
                    self.watcher = start_tracking(&user.username);
                }
                self.session.log_in(user);
                self.show_login = false;
                self.username.clear();
                self.password.clear();
                self.login_error = None;
                true
            }
            MainMsg::LoginFailed(err) => {
                if let ApiError::Backend(_) = &err {
                    error!(format!("Login failed: {err}"));
                }
                self.login_error = Some(login_message(&err));
                true
            }
            MainMsg::Logout => {
                if let Some(user) = self.session.user().cloned() {
                    if self.watcher.take().is_some() {
                        // Dropping the watcher cancelled the device watch;
                        // now clear the published entry, fire and forget.
                        let username = user.username.clone();
                        spawn_local(async move {
                            match api::clear_driver_position(&username).await {
                                Ok(()) => info!("Driver position removed"),
                                Err(err) => {
                                    error!(format!("Failed to clear driver position: {err}"));
                                }
                            }
                        });
                        self.drivers.remove(&user.username);
                    }
                }
                self.session.clear();
                storage::clear_session();
                // Full reload so no stale background activity survives.
                spawn_local(unregister_worker_and_reload());
                true
            }
            MainMsg::SetLayerName(value) => {
                self.layer_name = value;
                true
            }
            MainMsg::SetLayerColor(value) => {
                self.layer_color = value;
                true
            }
            MainMsg::SetLayerFile(file) => {
                self.layer_file = file;
                true
            }
            MainMsg::SubmitUpload => {
                if let Err(err) = validate_upload(&self.layer_name, self.layer_file.is_some()) {
                    alert(&err.to_string());
                    return false;
                }
                let Some(file) = self.layer_file.clone() else {
                    return false;
                };
                let name = self.layer_name.trim().to_string();
                let color = self.layer_color.clone();
                let link = ctx.link().clone();
                spawn_local(async move {
                    match upload_layer(name, color, file).await {
                        Ok(layer) => link.send_message(MainMsg::UploadSucceeded(layer)),
                        Err(err) => link.send_message(MainMsg::UploadFailed(err)),
                    }
                });
                false
            }
            MainMsg::UploadSucceeded(layer) => {
                info!(format!("Uploaded layer {} ({})", layer.name, layer.id));
                self.layers.insert(layer);
                self.show_upload = false;
                self.reset_upload_form();
                alert("GeoJSON layer uploaded!");
                true
            }
            MainMsg::UploadFailed(err) => {
                error!(format!("Failed to upload layer: {err}"));
                match err {
                    ApiError::Parse(_) => {
                        alert("The selected file is not a valid GeoJSON feature collection.")
                    }
                    _ => alert("Failed to upload the layer. Check the console for details."),
                }
                false
            }
            MainMsg::ToggleLayer(id) => {
                let visible = self.layers.is_visible(&id);
                self.layers.set_visible(&id, !visible);
                true
            }
            MainMsg::DeleteLayer(id) => {
                let link = ctx.link().clone();
                spawn_local(async move {
                    match api::delete_layer(&id).await {
                        Ok(()) => link.send_message(MainMsg::LayerDeleted(id)),
                        Err(err) => link.send_message(MainMsg::DeleteFailed(id, err)),
                    }
                });
                false
            }
            MainMsg::LayerDeleted(id) => {
                self.layers.remove(&id);
                alert("Layer deleted!");
                true
            }
            MainMsg::DeleteFailed(id, err) => {
                // No optimistic removal happened, so there is nothing to roll back.
                error!(format!("Failed to delete layer {id}: {err}"));
                alert("Failed to delete the layer. Check the console for details.");
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();

        let visible_layers: Vec<Layer> = self.layers.visible_layers().cloned().collect();
        let entries: Vec<LayerEntry> = self
            .layers
            .layers()
            .iter()
            .map(|layer| LayerEntry {
                id: layer.id.clone(),
                name: layer.name.clone(),
                color: layer.color.clone(),
                kind: layer.geometry_kind,
                visible: self.layers.is_visible(&layer.id),
            })
            .collect();

        let auth_click = if self.session.is_logged_in() {
            link.callback(|_| MainMsg::Logout)
        } else {
            link.callback(|_| MainMsg::ToggleLoginModal)
        };

        html! { <>
            <MapComponent
                basemap={self.basemap}
                layers={visible_layers}
                drivers={self.drivers.clone()}
            />

            <div class="basemap-toggle">
                <button
                    class={classes!((self.basemap == Basemap::Satellite).then_some("active"))}
                    onclick={link.callback(|_| MainMsg::SetBasemap(Basemap::Satellite))}
                >
                    {"Satellite"}
                </button>
                <button
                    class={classes!((self.basemap == Basemap::Street).then_some("active"))}
                    onclick={link.callback(|_| MainMsg::SetBasemap(Basemap::Street))}
                >
                    {"Street"}
                </button>
            </div>

            if self.session.is_admin() {
                <button class="upload-btn" onclick={link.callback(|_| MainMsg::ToggleUploadModal)}>
                    {"Upload GeoJSON"}
                </button>
            }

            <button class="auth-btn" onclick={auth_click}>
                { if self.session.is_logged_in() { "Logout" } else { "Login" } }
            </button>

            <button class="sidebar-btn" onclick={link.callback(|_| MainMsg::ToggleSidebar)}>
                { if self.show_sidebar { "Hide Layers" } else { "Show Layers" } }
            </button>

            if self.show_sidebar {
                <LayerPanel
                    {entries}
                    is_admin={self.session.is_admin()}
                    on_toggle={link.callback(MainMsg::ToggleLayer)}
                    on_delete={link.callback(MainMsg::DeleteLayer)}
                />
            }

            if self.show_login && !self.session.is_logged_in() {
                <LoginModal
                    username={self.username.clone()}
                    password={self.password.clone()}
                    error={self.login_error.clone()}
                    on_username={link.callback(MainMsg::SetUsername)}
                    on_password={link.callback(MainMsg::SetPassword)}
                    on_submit={link.callback(|_| MainMsg::SubmitLogin)}
                    on_cancel={link.callback(|_| MainMsg::ToggleLoginModal)}
                />
            }

            if self.show_upload && self.session.is_admin() {
                <UploadModal
                    name={self.layer_name.clone()}
                    color={self.layer_color.clone()}
                    on_name={link.callback(MainMsg::SetLayerName)}
                    on_color={link.callback(MainMsg::SetLayerColor)}
                    on_file={link.callback(MainMsg::SetLayerFile)}
                    on_submit={link.callback(|_| MainMsg::SubmitUpload)}
                    on_cancel={link.callback(|_| MainMsg::ToggleUploadModal)}
                />
            }
        </> }
    }
}

const DEFAULT_LAYER_COLOR: &str = "#ff0000";

impl Model {
    fn reset_upload_form(&mut self) {
        self.layer_name.clear();
        self.layer_color = DEFAULT_LAYER_COLOR.to_string();
        self.layer_file = None;
    }
}

fn start_tracking(username: &str) -> Option<LocationWatcher> {
    match LocationWatcher::start(username.to_string()) {
        Ok(watcher) => {
            info!(format!("Started location tracking for {username}"));
            Some(watcher)
        }
        Err(err) => {
            error!(format!("Failed to start location tracking: {err}"));
            alert("Could not start location tracking. Make sure location access is enabled.");
            None
        }
    }
}

async fn upload_layer(name: String, color: String, file: File) -> Result<Layer, ApiError> {
    let read_failed = || ApiError::Backend("failed to read the selected file".to_string());
    let text = JsFuture::from(file.text())
        .await
        .map_err(|_| read_failed())?
        .as_string()
        .ok_or_else(read_failed)?;

    let collection = parse_feature_collection(&text)?;
    // The document stores the re-serialized text, not the raw file contents.
    let data = collection.to_string();
    let id = api::create_layer(&name, &data, &color).await?;
    Ok(Layer::new(id, name, color, collection))
}

async fn unregister_worker_and_reload() {
    let window = gloo_utils::window();

    let registration = window.navigator().service_worker().get_registration();
    if let Ok(value) = JsFuture::from(registration).await {
        if let Ok(registration) = value.dyn_into::<ServiceWorkerRegistration>() {
            if let Ok(promise) = registration.unregister() {
                if JsFuture::from(promise).await.is_ok() {
                    info!("Service worker unregistered");
                }
            }
        }
    }

    if let Err(err) = window.location().reload_with_forceget(true) {
        error!("Failed to reload", err);
    }
}

fn login_message(err: &ApiError) -> String {
    match err {
        ApiError::NotFound => "Username not found!".to_string(),
        ApiError::WrongPassword => "Wrong password!".to_string(),
        _ => "Login failed. Check the console for details.".to_string(),
    }
}

fn alert(message: &str) {
    let _ = gloo_utils::window().alert_with_message(message);
}

fn main() {
    yew::Renderer::<Model>::new().render();
}
