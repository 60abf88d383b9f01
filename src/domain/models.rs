use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub ok: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Property {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Listing {
    pub id: String,
    pub property_id: String,
    pub title: String,
    pub channel: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Booking {
    pub id: String,
    pub property_id: String,
    pub guest_id: String,
    pub check_in: String,
    pub check_out: String,
    pub status: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Guest {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Normalized key the fuzzy scorer matches against. The API may supply
    /// it; otherwise it is derived from name and email before ranking.
    #[serde(default)]
    pub search_key: String,
}

#[derive(Debug, Serialize)]
pub struct OutboundMessage {
    pub guest_id: String,
    pub subject: Option<String>,
    pub body: String,
}

#[derive(Serialize)]
pub struct TenantReport {
    pub slug: Option<String>,
}

#[derive(Serialize)]
pub struct EnvReport {
    pub mode: String,
    pub api_base: Option<String>,
    pub api_base_secure: bool,
    pub allowed_email_count: usize,
    pub tenant_default: Option<String>,
    pub missing: Vec<String>,
}

#[derive(Serialize)]
pub struct HygieneReport {
    pub scanned_files: usize,
    pub violations: Vec<String>,
}
