/// Database layer for Cordon
///
/// Connection pooling and schema migrations. Models live in the `models`
/// module at the crate root; tenant filtering is their concern, not this
/// layer's.
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: Schema migration runner
///
/// # Example
///
/// ```no_run
/// use cordon_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig::from_url(std::env::var("DATABASE_URL")?);
///     let pool = create_pool(config).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
