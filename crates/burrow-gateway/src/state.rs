use std::sync::Arc;

use burrow_shortener::Shortener;

#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<dyn Shortener>,
}

impl AppState {
    pub fn new(shortener: Arc<dyn Shortener>) -> Self {
        Self { shortener }
    }
}
