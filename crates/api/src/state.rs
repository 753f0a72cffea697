use std::sync::Arc;

use surveys_db::DbPool;

use crate::config::ServerConfig;

/// Handler state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
}
