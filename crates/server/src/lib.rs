use db::DBService;
use services::services::auth::AuthService;

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;

/// Shared handles cloned into every request.
#[derive(Clone)]
pub struct AppState {
    db: DBService,
    auth: AuthService,
}

impl AppState {
    pub fn new(db: DBService, auth: AuthService) -> Self {
        Self { db, auth }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }
}
