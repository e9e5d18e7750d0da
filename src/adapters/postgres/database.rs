use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;

/// 埋め込みマイグレーション
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// 設定からコネクションプールを作成する
pub async fn connect(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
}

/// 未適用のマイグレーションを実行する
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Checking for pending migrations");
    MIGRATOR.run(pool).await?;
    tracing::info!("All migrations applied");
    Ok(())
}
