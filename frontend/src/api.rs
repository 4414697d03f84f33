use std::collections::HashMap;

use chrono::Utc;
use fleet_map_lib::doc::{self, Document, DocumentList};
use fleet_map_lib::driver::DriverPosition;
use fleet_map_lib::error::ApiError;
use fleet_map_lib::layer::{Layer, parse_feature_collection};
use fleet_map_lib::session::{UserInfo, verify_password};
use gloo_console::error;
use gloo_net::http::Request;

/// Hosted backend project the viewer talks to. Access is keyed, not
/// authenticated; the store's own rules are the only enforcement.
pub struct FirebaseConfig {
    pub project_id: &'static str,
    pub api_key: &'static str,
    pub database_url: &'static str,
}

pub const CONFIG: FirebaseConfig = FirebaseConfig {
    project_id: "fleet-map-viewer",
    api_key: "AIzaSyD3moFleetMapViewerWebKey0000000000",
    database_url: "https://fleet-map-viewer-default-rtdb.asia-southeast1.firebasedatabase.app",
};

fn firestore_url(path: &str) -> String {
    format!(
        "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents/{}?key={}",
        CONFIG.project_id, path, CONFIG.api_key
    )
}

pub fn realtime_url(path: &str) -> String {
    format!("{}/{}.json", CONFIG.database_url, path)
}

fn backend(err: gloo_net::Error) -> ApiError {
    ApiError::Backend(err.to_string())
}

pub async fn log_in(username: &str, password: &str) -> Result<UserInfo, ApiError> {
    let response = Request::get(&firestore_url(&format!("users/{username}")))
        .send()
        .await
        .map_err(backend)?;

    if response.status() == 404 {
        return Err(ApiError::NotFound);
    }
    if !response.ok() {
        return Err(ApiError::Backend(format!(
            "user lookup failed with status {}",
            response.status()
        )));
    }

    let document: Document = response.json().await.map_err(backend)?;
    let user = doc::decode_user(&document)?;
    verify_password(&user.password, password)?;

    Ok(UserInfo {
        username: username.to_string(),
        role: user.role,
    })
}

pub async fn fetch_layers() -> Result<Vec<Layer>, ApiError> {
    let response = Request::get(&firestore_url("geojson_layers"))
        .send()
        .await
        .map_err(backend)?;
    if !response.ok() {
        return Err(ApiError::Backend(format!(
            "layer fetch failed with status {}",
            response.status()
        )));
    }

    let list: DocumentList = response.json().await.map_err(backend)?;
    let mut layers = Vec::with_capacity(list.documents.len());
    for document in &list.documents {
        let decoded = doc::decode_layer(document).and_then(|layer| {
            parse_feature_collection(&layer.data)
                .map(|collection| Layer::new(layer.id, layer.name, layer.color, collection))
        });
        match decoded {
            Ok(layer) => layers.push(layer),
            // One bad document must not take the whole list down.
            Err(err) => error!(format!("Skipping layer document {}: {err}", document.name)),
        }
    }
    Ok(layers)
}

/// Create a layer document and return its backend-assigned id.
pub async fn create_layer(name: &str, data: &str, color: &str) -> Result<String, ApiError> {
    let body = doc::encode_layer(name, data, color, Utc::now());
    let response = Request::post(&firestore_url("geojson_layers"))
        .json(&body)
        .map_err(backend)?
        .send()
        .await
        .map_err(backend)?;
    if !response.ok() {
        return Err(ApiError::Backend(format!(
            "layer create failed with status {}",
            response.status()
        )));
    }

    let document: Document = response.json().await.map_err(backend)?;
    Ok(doc::document_id(&document.name).to_string())
}

pub async fn delete_layer(id: &str) -> Result<(), ApiError> {
    let response = Request::delete(&firestore_url(&format!("geojson_layers/{id}")))
        .send()
        .await
        .map_err(backend)?;
    if !response.ok() {
        return Err(ApiError::Backend(format!(
            "layer delete failed with status {}",
            response.status()
        )));
    }
    Ok(())
}

pub async fn put_driver_position(
    driver_id: &str,
    position: &DriverPosition,
) -> Result<(), ApiError> {
    let response = Request::put(&realtime_url(&format!("drivers/{driver_id}")))
        .json(position)
        .map_err(backend)?
        .send()
        .await
        .map_err(backend)?;
    if !response.ok() {
        return Err(ApiError::Backend(format!(
            "position write failed with status {}",
            response.status()
        )));
    }
    Ok(())
}

pub async fn clear_driver_position(driver_id: &str) -> Result<(), ApiError> {
    let response = Request::delete(&realtime_url(&format!("drivers/{driver_id}")))
        .send()
        .await
        .map_err(backend)?;
    if !response.ok() {
        return Err(ApiError::Backend(format!(
            "position delete failed with status {}",
            response.status()
        )));
    }
    Ok(())
}

/// Whole snapshot of every currently-broadcasting driver.
pub async fn fetch_driver_positions() -> Result<HashMap<String, DriverPosition>, ApiError> {
    let response = Request::get(&realtime_url("drivers"))
        .send()
        .await
        .map_err(backend)?;
    if !response.ok() {
        return Err(ApiError::Backend(format!(
            "position fetch failed with status {}",
            response.status()
        )));
    }

    // The store returns a JSON null when the path is empty.
    let snapshot: Option<HashMap<String, DriverPosition>> =
        response.json().await.map_err(backend)?;
    Ok(snapshot.unwrap_or_default())
}
