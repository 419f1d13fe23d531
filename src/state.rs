use crate::controller::Controller;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<Controller>,
}

impl AppState {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller: Arc::new(controller),
        }
    }
}
