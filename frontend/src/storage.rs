use fleet_map_lib::session::{Session, UserInfo};
use gloo_console::error;
use gloo_storage::{LocalStorage, Storage};

const LOGGED_IN_KEY: &str = "isLoggedIn";
const USER_DATA_KEY: &str = "userData";

/// Restore the persisted session. The stored record is trusted as-is; no
/// backend revalidation happens until the next explicit login or logout.
pub fn load_session() -> Session {
    let mut session = Session::default();

    let logged_in = LocalStorage::raw()
        .get_item(LOGGED_IN_KEY)
        .ok()
        .flatten()
        .is_some_and(|value| value == "true");
    if !logged_in {
        return session;
    }

    match LocalStorage::get::<UserInfo>(USER_DATA_KEY) {
        Ok(user) => session.log_in(user),
        Err(err) => error!(format!("Failed to restore session: {err}")),
    }
    session
}

pub fn save_session(user: &UserInfo) {
    if let Err(err) = LocalStorage::raw().set_item(LOGGED_IN_KEY, "true") {
        error!("Failed to persist login flag", err);
    }
    if let Err(err) = LocalStorage::set(USER_DATA_KEY, user) {
        error!(format!("Failed to persist session: {err}"));
    }
}

pub fn clear_session() {
    LocalStorage::delete(LOGGED_IN_KEY);
    LocalStorage::delete(USER_DATA_KEY);
}
