use sqlx::SqlitePool;
use anyhow::Result;

/// Run database migrations / 运行数据库迁移
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS content_items (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL DEFAULT '',
            content TEXT NOT NULL DEFAULT '',
            permalink TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL DEFAULT 'draft',
            published_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Status + date is the shape of every listing / 状态+日期索引
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_content_status_published ON content_items(status, published_at)"
    )
    .execute(pool)
    .await?;

    tracing::debug!("Content store migrations applied");
    Ok(())
}
