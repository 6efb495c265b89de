use std::sync::Arc;

use crate::store::KvStore;

/// Shared application state: the injected store handle is the only shared
/// resource, the service itself holds no cross-request state.
pub struct AppState {
    pub store: Arc<dyn KvStore>,
}
