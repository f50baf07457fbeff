use serde::{Deserialize, Serialize};

const DEFAULT_API_URL: &str = "http://localhost:6689";
const DEFAULT_LOG_LEVEL: &str = "info";
const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct EnvConfig {
    pub api_url: String,
    pub log_level: String,
}

impl EnvConfig {
    /// Read `window.ENV`.
    pub fn new() -> Self {
        let env = web_sys::window()
            .and_then(|w| w.get("ENV"))
            .filter(|env| !env.is_undefined() && env.is_object());

        Self::from_lookup(|key| {
            let env = env.as_ref()?;
            js_sys::Reflect::get(env, &key.into()).ok()?.as_string()
        })
    }

    /// Both `API_URL` (documented) and `api_url` (legacy) are accepted; the
    /// upper-case spelling wins.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |upper: &str, lower: &str| {
            lookup(upper)
                .or_else(|| lookup(lower))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let log_level = pick("LOG_LEVEL", "log_level")
            .filter(|v| v.parse::<tracing::Level>().is_ok())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Self {
            api_url: pick("API_URL", "api_url").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            log_level,
        }
    }

    pub fn max_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }

    pub fn max_upload_bytes(&self) -> u64 {
        MAX_UPLOAD_BYTES
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}
