use crate::models::AccountInfo;
use serde::{Deserialize, Serialize};

pub(crate) const TOKEN_KEY: &str = "trip_planner_token";
pub(crate) const USER_KEY: &str = "trip_planner_user";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let json = local_storage()?.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn save_user_to_storage(user: &AccountInfo) {
    save_json_to_storage(USER_KEY, user);
}

pub(crate) fn load_user_from_storage() -> Option<AccountInfo> {
    load_json_from_storage::<AccountInfo>(USER_KEY).filter(|u| !u.id.trim().is_empty())
}

// Browser-only: run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::api::ApiClient;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const BASE: &str = "http://localhost:6689";

    #[wasm_bindgen_test]
    fn test_session_storage_roundtrip() {
        ApiClient::clear_storage();
        assert!(!ApiClient::load_from_storage(BASE.to_string()).is_authenticated());
        assert!(load_user_from_storage().is_none());

        let mut c = ApiClient::load_from_storage(BASE.to_string());
        c.set_token("t1".to_string());
        c.save_to_storage();
        save_user_to_storage(&AccountInfo {
            id: "u1".to_string(),
            email: "u@example.com".to_string(),
        });

        assert!(ApiClient::load_from_storage(BASE.to_string()).is_authenticated());
        assert_eq!(load_user_from_storage().map(|u| u.id).as_deref(), Some("u1"));

        ApiClient::clear_storage();
        assert!(!ApiClient::load_from_storage(BASE.to_string()).is_authenticated());
        assert!(load_user_from_storage().is_none());
    }
}
