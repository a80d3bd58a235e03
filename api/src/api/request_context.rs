use std::sync::Arc;

use tokio::sync::RwLock;

use super::auth::Session;

#[derive(Default)]
struct ContextData {
    session: Option<Session>,
}

/// Per-request state shared between the auth middleware and handlers.
/// Cheaply cloneable so it can live in the router context.
#[derive(Default, Clone)]
pub struct RequestContext(Arc<RwLock<ContextData>>);

impl RequestContext {
    pub async fn set_session(&self, session: Session) {
        self.0.write().await.session = Some(session);
    }

    pub async fn session(&self) -> Option<Session> {
        self.0.read().await.session.clone()
    }
}
