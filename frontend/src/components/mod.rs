pub mod layer_panel;
pub mod login_modal;
pub mod map_component;
pub mod upload_modal;
