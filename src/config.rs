use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    /// Directory holding the account registry and per-owner book documents.
    pub data_root: PathBuf,
    pub app_name: String,
    /// Origin used when building shareable fill links; falls back to the
    /// request's Host header when unset.
    pub public_origin: Option<String>,
    pub auth: AuthConfig,
}

#[derive(Clone)]
pub struct AuthConfig {
    /// Base64-encoded HS256 key. `None` means an ephemeral key is
    /// generated at startup.
    pub key: Option<String>,
    pub token_ttl: time::Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

#[cfg(test)]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_root: "/".into(),
            app_name: "Slam Book".to_string(),
            public_origin: None,
            auth: AuthConfig::default(),
        }
    }
}

#[cfg(test)]
impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            key: None,
            token_ttl: time::Duration::days(14),
            cookie_name: "slambook_auth".to_string(),
            cookie_secure: false,
        }
    }
}
