use common::context::Context;

use crate::api::auth::SessionBridge;
use crate::config::AppConfig;
use crate::content::{ContentSource, SiteContent};

pub struct GlobalState {
    pub config: AppConfig,
    pub ctx: Context,
    pub content: Box<dyn ContentSource>,
    pub site: SiteContent,
    pub session_bridge: SessionBridge,
}

impl GlobalState {
    pub fn new(config: AppConfig, content: Box<dyn ContentSource>, site: SiteContent, ctx: Context) -> Self {
        let session_bridge = SessionBridge::new(config.auth.clone());

        Self {
            config,
            ctx,
            content,
            site,
            session_bridge,
        }
    }
}
