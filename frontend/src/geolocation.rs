use chrono::Utc;
use fleet_map_lib::driver::DriverPosition;
use fleet_map_lib::error::ApiError;
use gloo_console::error;
use gloo_utils::window;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Geolocation, Position, PositionError, PositionOptions};

use crate::api;

const ACQUISITION_TIMEOUT_MS: u32 = 5_000;

/// Continuous device position watch for a logged-in driver.
///
/// Every fix is published to the realtime store, overwriting the previous
/// entry; a failed write is logged and the next fix retries implicitly.
/// Dropping the handle cancels the watch.
pub struct LocationWatcher {
    geolocation: Geolocation,
    watch_id: i32,
    _on_position: Closure<dyn FnMut(Position)>,
    _on_error: Closure<dyn FnMut(PositionError)>,
}

impl LocationWatcher {
    pub fn start(driver_id: String) -> Result<Self, ApiError> {
        let geolocation = window().navigator().geolocation().map_err(|_| {
            ApiError::Backend("geolocation is not supported by this browser".to_string())
        })?;

        let on_position = Closure::new(move |position: Position| {
            let coordinates = position.coords();
            let fix =
                DriverPosition::new(coordinates.latitude(), coordinates.longitude(), Utc::now());
            let driver_id = driver_id.clone();
            spawn_local(async move {
                if let Err(err) = api::put_driver_position(&driver_id, &fix).await {
                    error!(format!("Failed to publish driver position: {err}"));
                }
            });
        });

        // The watch keeps firing after a failed acquisition; the user just
        // sees the alert.
        let on_error = Closure::new(move |err: PositionError| {
            error!(format!("Geolocation error {}: {}", err.code(), err.message()));
            let _ = window().alert_with_message(
                "Could not acquire your location. Make sure location access is enabled.",
            );
        });

        let options = PositionOptions::new();
        options.set_enable_high_accuracy(true);
        options.set_timeout(ACQUISITION_TIMEOUT_MS);
        options.set_maximum_age(0);

        let watch_id = geolocation
            .watch_position_with_error_callback_and_options(
                on_position.as_ref().unchecked_ref(),
                Some(on_error.as_ref().unchecked_ref()),
                &options,
            )
            .map_err(|_| ApiError::Backend("failed to start the location watch".to_string()))?;

        Ok(Self {
            geolocation,
            watch_id,
            _on_position: on_position,
            _on_error: on_error,
        })
    }
}

impl Drop for LocationWatcher {
    fn drop(&mut self) {
        self.geolocation.clear_watch(self.watch_id);
    }
}
