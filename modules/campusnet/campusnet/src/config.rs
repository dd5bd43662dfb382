use serde::{Deserialize, Serialize};

/// Module configuration, read from the `campusnet` section of the app config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CampusnetConfig {
    /// HS256 signing secret for session tokens.
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub min_password_len: usize,
    /// Cap on the "people you may know" listing.
    pub available_users_limit: u64,
    pub admin_page_size: u64,
    pub admin_max_page_size: u64,
    /// Admin identity created at startup when it does not exist yet.
    pub admin: Option<AdminBootstrap>,
}

impl Default for CampusnetConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me".to_owned(),
            token_ttl_secs: 7 * 24 * 60 * 60,
            min_password_len: 6,
            available_users_limit: 20,
            admin_page_size: 10,
            admin_max_page_size: 100,
            admin: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminBootstrap {
    pub name: String,
    pub email: String,
    pub password: String,
}
