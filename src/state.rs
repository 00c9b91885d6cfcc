use std::sync::Arc;

use crate::audit::AuditRecorder;
use crate::database::{Store, Stores};
use crate::services::TextGenerator;

/// Shared handles passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub audit: AuditRecorder,
    pub generator: Arc<dyn TextGenerator>,
}

impl AppState {
    pub fn new(stores: Stores, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            store: stores.store,
            audit: AuditRecorder::new(stores.audit),
            generator,
        }
    }
}
