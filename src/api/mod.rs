use crate::backend::{TripRepository, UploadAdapter};
use crate::error::TripError;
use crate::models::{
    sort_summaries, AccountInfo, StoredObject, Trip, TripDocument, TripDraft, TripSummary,
};
use crate::storage::{TOKEN_KEY, USER_KEY};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    NotFound,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    fn not_found(ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::NotFound,
            message: format!("{ctx}: not found"),
        }
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {body}"),
        }
    }

    /// Map a trip-record failure into the user-facing taxonomy.
    pub(crate) fn into_persistence(self, trip_id: &str) -> TripError {
        match self.kind {
            ApiErrorKind::Unauthorized => TripError::Unauthorized,
            ApiErrorKind::NotFound => TripError::NotFound(trip_id.to_string()),
            _ => TripError::Persistence(self.message),
        }
    }

    /// Map a blob-storage failure into the user-facing taxonomy.
    pub(crate) fn into_storage(self) -> TripError {
        match self.kind {
            ApiErrorKind::Unauthorized => TripError::Unauthorized,
            _ => TripError::Storage(self.message),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginResponse {
    pub token: String,
    pub user: AccountInfo,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateTripRequest<'a> {
    pub owner_id: &'a str,
    pub trip: &'a TripDraft,
}

#[derive(Serialize, Clone, Debug)]
pub(crate) struct UpdateTripRequest<'a> {
    pub id: &'a str,
    pub trip: &'a TripDocument,
}

#[derive(Deserialize, Clone, Debug)]
struct IdResponse {
    id: String,
}

#[derive(Deserialize, Clone, Debug)]
struct TripResponse {
    trip: Trip,
}

#[derive(Deserialize, Clone, Debug)]
struct StoredResponse {
    url: String,
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            token: None,
        }
    }

    /// Client for `base_url`, signed in when a token is stored.
    pub fn load_from_storage(base_url: String) -> Self {
        let mut client = Self::new(base_url);
        client.token = leptos::web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item(TOKEN_KEY).ok().flatten())
            .filter(|t| !t.is_empty());
        client
    }

    pub fn save_to_storage(&self) {
        if let Some(storage) =
            leptos::web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        {
            if let Some(token) = &self.token {
                let _ = storage.set_item(TOKEN_KEY, token);
            }
        }
    }

    pub fn clear_storage() {
        if let Some(storage) =
            leptos::web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        {
            let _ = storage.remove_item(TOKEN_KEY);
            let _ = storage.remove_item(USER_KEY);
        }
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn logout(&mut self) {
        self.token = None;
        Self::clear_storage();
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn with_auth(&self, mut req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(header) = self.auth_header() {
            req = req.header("Authorization", header);
        }
        req
    }

    async fn read<T: serde::de::DeserializeOwned>(
        res: reqwest::Response,
        ctx: &str,
    ) -> ApiResult<T> {
        let status = res.status();
        if status.is_success() {
            res.json().await.map_err(ApiError::parse)
        } else if status.as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else if status.as_u16() == 404 {
            Err(ApiError::not_found(ctx))
        } else {
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, ctx))
        }
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> ApiResult<T> {
        let req = self.with_auth(reqwest::Client::new().post(self.url(path)));
        let res = req.json(body).send().await.map_err(ApiError::network)?;
        Self::read(res, path).await
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        self.post(
            "/auth/login",
            &LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            },
        )
        .await
    }

    pub(crate) fn parse_trip_list_response(data: serde_json::Value) -> Vec<TripSummary> {
        let list = data
            .get("trips")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let mut out: Vec<TripSummary> = Vec::with_capacity(list.len());
        for item in list {
            match serde_json::from_value::<Trip>(item) {
                Ok(trip) if !trip.id.trim().is_empty() => out.push(trip.into()),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "skipping malformed trip"),
            }
        }

        sort_summaries(out)
    }
}

impl TripRepository for ApiClient {
    async fn create(&self, owner_id: &str, draft: &TripDraft) -> Result<String, TripError> {
        let resp: IdResponse = self
            .post(
                "/trips/create",
                &CreateTripRequest {
                    owner_id,
                    trip: draft,
                },
            )
            .await
            .map_err(|e| e.into_persistence(""))?;

        if resp.id.trim().is_empty() {
            return Err(TripError::Persistence(
                "Create trip succeeded but response is missing trip id".to_string(),
            ));
        }
        tracing::info!(trip_id = %resp.id, "trip created");
        Ok(resp.id)
    }

    async fn get(&self, trip_id: &str) -> Result<Trip, TripError> {
        let resp: TripResponse = self
            .post("/trips/get", &serde_json::json!({ "id": trip_id }))
            .await
            .map_err(|e| e.into_persistence(trip_id))?;
        Ok(resp.trip)
    }

    async fn update(&self, trip_id: &str, doc: &TripDocument) -> Result<(), TripError> {
        self.post::<serde_json::Value>("/trips/update", &UpdateTripRequest { id: trip_id, trip: doc })
            .await
            .map(|_| ())
            .map_err(|e| e.into_persistence(trip_id))
    }

    async fn delete(&self, trip_id: &str) -> Result<(), TripError> {
        self.post::<serde_json::Value>("/trips/delete", &serde_json::json!({ "id": trip_id }))
            .await
            .map(|_| ())
            .map_err(|e| e.into_persistence(trip_id))?;
        tracing::info!(%trip_id, "trip deleted");
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<TripSummary>, TripError> {
        let data: serde_json::Value = self
            .post("/trips/list", &serde_json::json!({ "ownerId": owner_id }))
            .await
            .map_err(|e| e.into_persistence(""))?;
        Ok(Self::parse_trip_list_response(data))
    }
}

impl UploadAdapter for ApiClient {
    async fn store(
        &self,
        bytes: Vec<u8>,
        media_type: &str,
        path: &str,
    ) -> Result<StoredObject, TripError> {
        let url = self.url(&format!(
            "/storage/objects?path={}",
            urlencoding::encode(path)
        ));
        let content_type = if media_type.is_empty() {
            "application/octet-stream"
        } else {
            media_type
        };

        let req = self
            .with_auth(reqwest::Client::new().put(url))
            .header("Content-Type", content_type)
            .body(bytes);
        let res = req
            .send()
            .await
            .map_err(|e| ApiError::network(e).into_storage())?;
        let stored: StoredResponse = Self::read(res, "/storage/objects")
            .await
            .map_err(ApiError::into_storage)?;

        Ok(StoredObject {
            url: stored.url,
            path: path.to_string(),
        })
    }

    async fn release(&self, path: &str) -> Result<(), TripError> {
        self.post::<serde_json::Value>("/storage/delete", &serde_json::json!({ "path": path }))
            .await
            .map(|_| ())
            .map_err(ApiError::into_storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_contract_deserialize() {
        let json = r#"{
            "token": "jwt-token",
            "user": {"id": "u1", "email": "u@example.com"}
        }"#;
        let parsed: LoginResponse =
            serde_json::from_str(json).expect("login response should parse");
        assert_eq!(parsed.token, "jwt-token");
        assert_eq!(parsed.user.id, "u1");
    }

    #[test]
    fn test_create_request_uses_camel_case() {
        let draft = TripDraft::new("Summer", "");
        let v = serde_json::to_value(CreateTripRequest {
            owner_id: "u1",
            trip: &draft,
        })
        .expect("should serialize");
        assert_eq!(v["ownerId"], "u1");
        assert_eq!(v["trip"]["name"], "Summer");
        assert!(v["trip"]["countries"].as_array().is_some_and(|a| a.is_empty()));
    }

    #[test]
    fn test_parse_trip_list_sorts_and_skips_bad_items() {
        let data = serde_json::json!({
            "trips": [
                {"id": "a", "name": "Old", "userId": "u1",
                 "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-02T00:00:00Z"},
                {"id": "", "name": "No id", "userId": "u1",
                 "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-09-02T00:00:00Z"},
                {"name": "Broken"},
                {"id": "b", "name": "New", "userId": "u1",
                 "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-06-02T00:00:00Z",
                 "countries": [{"id": "c", "name": "Japan", "cities": []}]}
            ]
        });
        let list = ApiClient::parse_trip_list_response(data);
        let ids: Vec<_> = list.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(list[0].country_count, 1);
    }

    #[test]
    fn test_parse_trip_list_missing_key() {
        assert!(ApiClient::parse_trip_list_response(serde_json::json!({})).is_empty());
    }

    #[test]
    fn test_error_mapping() {
        let e = ApiError::not_found("/trips/get");
        assert_eq!(e.clone().into_persistence("t9"), TripError::NotFound("t9".into()));
        assert_eq!(e.into_storage(), TripError::Storage("/trips/get: not found".into()));
        assert_eq!(
            ApiError::unauthorized().into_storage(),
            TripError::Unauthorized
        );
        let parse = ApiError::parse("bad json");
        assert_eq!(
            parse.into_persistence("t1"),
            TripError::Persistence("bad json".into())
        );
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient::new("http://localhost:6689/".to_string());
        assert_eq!(client.url("/trips/get"), "http://localhost:6689/trips/get");
    }

    #[test]
    fn test_new_client_is_signed_out() {
        let client = ApiClient::new("https://api.example.com".to_string());
        assert_eq!(client.base_url, "https://api.example.com");
        assert!(client.token.is_none());
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_auth_header() {
        let mut client = ApiClient::new("http://localhost:6689".to_string());
        assert!(client.auth_header().is_none());
        assert!(!client.is_authenticated());
        client.set_token("my-jwt-token".to_string());
        assert_eq!(client.auth_header().as_deref(), Some("Bearer my-jwt-token"));
        assert!(client.is_authenticated());
    }
}
