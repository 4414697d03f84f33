use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Role stored on the backend user record. Unknown values round-trip
/// unchanged so a record with an unexpected role still logs in, just
/// without admin controls or tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Driver,
    Other(String),
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "admin" => Self::Admin,
            "sopir" => Self::Driver,
            _ => Self::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => "admin".to_string(),
            Role::Driver => "sopir".to_string(),
            Role::Other(value) => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    pub role: Role,
}

/// Login state. The user is kept private so "logged in" and "has a user"
/// cannot drift apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<UserInfo>,
}

impl Session {
    pub fn log_in(&mut self, user: UserInfo) {
        self.user = Some(user);
    }

    pub fn clear(&mut self) {
        self.user = None;
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&UserInfo> {
        self.user.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.user, Some(UserInfo { role: Role::Admin, .. }))
    }

    pub fn is_driver(&self) -> bool {
        matches!(self.user, Some(UserInfo { role: Role::Driver, .. }))
    }
}

/// Plain string equality against the stored password field.
pub fn verify_password(stored: &str, given: &str) -> Result<(), ApiError> {
    if stored == given {
        Ok(())
    } else {
        Err(ApiError::WrongPassword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_password_is_rejected() {
        assert_eq!(verify_password("secret", "wrong"), Err(ApiError::WrongPassword));
        assert_eq!(verify_password("secret", "secret"), Ok(()));
    }

    #[test]
    fn session_tracks_login_state() {
        let mut session = Session::default();
        assert!(!session.is_logged_in());
        assert!(session.user().is_none());

        session.log_in(UserInfo {
            username: "alice".into(),
            role: Role::Admin,
        });
        assert!(session.is_logged_in());
        assert!(session.is_admin());
        assert!(!session.is_driver());

        session.clear();
        assert!(!session.is_logged_in());
        assert!(session.user().is_none());
    }

    #[test]
    fn role_round_trips_wire_values() {
        assert_eq!(Role::from("admin".to_string()), Role::Admin);
        assert_eq!(Role::from("sopir".to_string()), Role::Driver);
        assert_eq!(String::from(Role::Driver), "sopir");
        assert_eq!(
            Role::from("dispatcher".to_string()),
            Role::Other("dispatcher".to_string())
        );
        assert_eq!(String::from(Role::Other("dispatcher".to_string())), "dispatcher");
    }

    #[test]
    fn driver_role_deserializes_from_json() {
        let user: UserInfo =
            serde_json::from_str(r#"{"username": "budi", "role": "sopir"}"#).unwrap();
        assert_eq!(user.role, Role::Driver);
        assert_eq!(serde_json::to_string(&user.role).unwrap(), r#""sopir""#);
    }
}
