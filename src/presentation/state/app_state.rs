use std::sync::Arc;
use std::time::Duration;

use crate::application::bus::MessageBus;

#[derive(Clone)]
pub struct AppState {
    pub bus: Arc<MessageBus>,
    pub request_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(bus: Arc<MessageBus>) -> Self {
        Self {
            bus,
            request_timeout: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}
