use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::errors::AppError;

pub const QUERY_TIMEOUT: Duration = Duration::from_millis(10000);

#[tracing::instrument(name = "Initialize database pool", skip(database_url))]
pub async fn init_db(database_url: &str, max_connections: u32) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(QUERY_TIMEOUT)
        .connect(database_url)
        .await?;

    tracing::info!("Running database migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

pub async fn timeout_query<T, F>(duration: Duration, fut: F) -> Result<T, AppError>
where
    F: std::future::Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(Ok(res)) => Ok(res),
        Ok(Err(e)) => Err(AppError::from(e)),
        Err(_) => Err(AppError::Database(anyhow::anyhow!(
            "Query timeout after {:?}",
            duration
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn slow_query_times_out_as_database_error() {
        let result: Result<(), AppError> = timeout_query(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn sqlx_errors_are_converted() {
        let result: Result<(), AppError> =
            timeout_query(QUERY_TIMEOUT, async { Err(sqlx::Error::RowNotFound) }).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
