use crate::api::ApiClient;
use crate::config::EnvConfig;
use crate::error::TripError;
use crate::models::{AccountInfo, TripSummary};
use crate::storage::load_user_from_storage;
use leptos::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum NoticeTone {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Notice {
    pub tone: NoticeTone,
    pub message: String,
}

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub config: StoredValue<EnvConfig>,
    pub api_client: RwSignal<ApiClient>,
    pub current_user: RwSignal<Option<AccountInfo>>,

    /// Trips of the signed-in user, most recently updated first.
    pub trips: RwSignal<Vec<TripSummary>>,

    /// Latest user-visible notification.
    pub notice: RwSignal<Option<Notice>>,
}

impl AppState {
    pub fn new(config: EnvConfig) -> Self {
        let mut client = ApiClient::load_from_storage(config.api_url.clone());
        let user = load_user_from_storage();

        // A token without a stored user cannot name an owner; treat it as signed out.
        if user.is_none() && client.is_authenticated() {
            client.logout();
        }

        Self {
            config: StoredValue::new(config),
            api_client: RwSignal::new(client),
            current_user: RwSignal::new(user),
            trips: RwSignal::new(vec![]),
            notice: RwSignal::new(None),
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);

impl AppContext {
    pub fn owner_id(&self) -> Option<String> {
        self.0.current_user.get_untracked().map(|u| u.id)
    }

    pub fn notify(&self, message: impl Into<String>) {
        self.0.notice.set(Some(Notice {
            tone: NoticeTone::Info,
            message: message.into(),
        }));
    }

    /// Surface a failure. An expired session also signs the user out.
    pub fn report(&self, err: &TripError) {
        tracing::warn!(error = %err, "action failed");
        if err.is_unauthorized() {
            self.sign_out();
        }
        self.0.notice.set(Some(Notice {
            tone: NoticeTone::Error,
            message: err.to_string(),
        }));
    }

    pub fn clear_notice(&self) {
        self.0.notice.set(None);
    }

    pub fn sign_out(&self) {
        let mut api_client = self.0.api_client.get_untracked();
        api_client.logout();
        self.0.api_client.set(api_client);
        self.0.current_user.set(None);
        self.0.trips.set(vec![]);
        let _ = window().location().set_href("/login");
    }
}
