use std::collections::HashMap;

use fleet_map_lib::driver::DriverPosition;
use fleet_map_lib::error::ApiError;
use gloo_console::{error, info};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;
use web_sys::{EventSource, MessageEvent};
use yew::Callback;

use crate::api;

/// One streamed change: `data` is the value now at `path`, relative to the
/// subscribed location.
#[derive(Debug, Deserialize)]
struct StreamEvent {
    path: String,
    data: serde_json::Value,
}

/// Continuous subscription to the `drivers` path of the realtime store.
///
/// Every event ends in a whole-snapshot replace on the consumer side: the
/// root-path event carries the full snapshot directly, and a sub-path event
/// triggers a full refetch instead of a merge. Dropping the handle closes
/// the stream.
pub struct DriverSubscription {
    source: EventSource,
    _on_put: Closure<dyn FnMut(MessageEvent)>,
    _on_patch: Closure<dyn FnMut(MessageEvent)>,
}

impl DriverSubscription {
    pub fn subscribe(
        on_snapshot: Callback<HashMap<String, DriverPosition>>,
    ) -> Result<Self, ApiError> {
        let source = EventSource::new(&api::realtime_url("drivers")).map_err(|_| {
            ApiError::Backend("failed to open the driver position stream".to_string())
        })?;

        let on_put = Self::handler(on_snapshot.clone());
        let on_patch = Self::handler(on_snapshot);
        let attach_failed =
            |_| ApiError::Backend("failed to attach a stream listener".to_string());
        source
            .add_event_listener_with_callback("put", on_put.as_ref().unchecked_ref())
            .map_err(attach_failed)?;
        source
            .add_event_listener_with_callback("patch", on_patch.as_ref().unchecked_ref())
            .map_err(attach_failed)?;

        info!("Subscribed to driver positions");
        Ok(Self {
            source,
            _on_put: on_put,
            _on_patch: on_patch,
        })
    }

    fn handler(
        on_snapshot: Callback<HashMap<String, DriverPosition>>,
    ) -> Closure<dyn FnMut(MessageEvent)> {
        Closure::new(move |event: MessageEvent| {
            let Some(payload) = event.data().as_string() else {
                return;
            };
            let parsed: StreamEvent = match serde_json::from_str(&payload) {
                Ok(parsed) => parsed,
                Err(err) => {
                    error!(format!("Malformed stream event: {err}"));
                    return;
                }
            };

            if parsed.path == "/" {
                match serde_json::from_value::<Option<HashMap<String, DriverPosition>>>(parsed.data)
                {
                    Ok(snapshot) => on_snapshot.emit(snapshot.unwrap_or_default()),
                    Err(err) => error!(format!("Malformed driver snapshot: {err}")),
                }
            } else {
                // Sub-path change: refetch the whole snapshot, never merge.
                let on_snapshot = on_snapshot.clone();
                spawn_local(async move {
                    match api::fetch_driver_positions().await {
                        Ok(snapshot) => on_snapshot.emit(snapshot),
                        Err(err) => {
                            error!(format!("Failed to refresh driver positions: {err}"));
                        }
                    }
                });
            }
        })
    }
}

impl Drop for DriverSubscription {
    fn drop(&mut self) {
        self.source.close();
    }
}
