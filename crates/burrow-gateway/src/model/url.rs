use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/url`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUrlRequest {
    #[validate(url)]
    pub original_url: String,
    /// Requested alias; the alphanumeric check happens when it is turned
    /// into a `ShortCode`.
    #[validate(length(min = 4, max = 10))]
    pub custom_code: Option<String>,
    /// Lifetime in hours.
    #[validate(range(min = 1, max = 100))]
    pub duration: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUrlResponse {
    pub short_url: String,
    pub expire_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
