use sqlx::MySqlPool;

use crate::error::ConfigError;

pub async fn init_db(database_url: &str) -> Result<MySqlPool, ConfigError> {
    MySqlPool::connect(database_url)
        .await
        .map_err(ConfigError::Unreachable)
}
