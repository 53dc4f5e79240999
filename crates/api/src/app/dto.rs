use serde::{Deserialize, Serialize};

use hotelgate_auth::{Credentials, Identity, KnownRole};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl From<LoginRequest> for Credentials {
    fn from(value: LoginRequest) -> Self {
        Credentials::new(value.username, value.password)
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub identity: Identity,
    pub token: String,
    /// Where the client goes next to be routed to its service.
    pub next: &'static str,
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub service: KnownRole,
    pub identity: Identity,
    pub display_role: Option<&'static str>,
    /// Role areas this identity may use inside the service.
    pub access: Vec<KnownRole>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Automatic re-checks already performed by this page.
    #[serde(default)]
    pub recheck: u32,
}
