use crate::config::AppConfig;
use crate::db;
use crate::users::repo::{PgUserStore, UserStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    /// Opens the pool, applies the schema and wires the Postgres-backed store.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(&config.database).await?;
        db::bootstrap_schema(&pool).await?;

        let users = Arc::new(PgUserStore::new(pool)) as Arc<dyn UserStore>;
        Ok(Self { users })
    }

    pub fn from_parts(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}
