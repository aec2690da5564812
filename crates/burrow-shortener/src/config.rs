use jiff::SignedDuration;
use std::collections::HashSet;
use typed_builder::TypedBuilder;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Settings for [`ShortenerService`](crate::ShortenerService).
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerConfig {
    /// Public base URL that short codes are appended to.
    #[builder(setter(into))]
    pub base_url: String,
    /// Lifetime of a record when the request does not specify one.
    #[builder(default = SignedDuration::from_hours(24))]
    pub default_duration: SignedDuration,
    /// Upper bound on code allocation attempts for one request.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
    /// Codes that are never handed out, such as paths the HTTP layer
    /// routes itself.
    #[builder(
        default,
        setter(transform = |codes: &[&str]| codes.iter().map(|c| c.to_string()).collect())
    )]
    pub reserved_codes: HashSet<String>,
}

impl ShortenerConfig {
    pub fn is_reserved(&self, code: &str) -> bool {
        self.reserved_codes.contains(code)
    }
}
