use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::time::Duration;

const CREATE_VERIFICATION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS verification_results (
    id                   BIGSERIAL PRIMARY KEY,
    left_label           TEXT NOT NULL,
    right_label          TEXT NOT NULL,
    left_document_number TEXT,
    left_vendor          TEXT,
    left_total           TEXT,
    right_document_number TEXT,
    right_vendor         TEXT,
    right_total          TEXT,
    overall_status       TEXT NOT NULL,
    total_fields_checked BIGINT NOT NULL,
    matched_fields       BIGINT NOT NULL,
    mismatched_fields    BIGINT NOT NULL,
    match_percentage     DOUBLE PRECISION NOT NULL,
    field_checks         TEXT NOT NULL,
    created_at           TIMESTAMPTZ NOT NULL
)
"#;

/// 创建数据库连接池并确保结果表存在
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let mut connect_options = PgConnectOptions::from_str(database_url)?;

    // 慢查询 (>5秒) 记 warn
    connect_options = connect_options.log_slow_statements(
        tracing::log::LevelFilter::Warn,
        Duration::from_secs(5),
    );

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(connect_options)
        .await?;

    sqlx::query(CREATE_VERIFICATION_TABLE).execute(&pool).await?;
    tracing::info!("verification_results table ready");

    Ok(pool)
}
