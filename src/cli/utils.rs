use serde_json::{json, Value};
use sqlx::PgPool;

use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::DatabaseManager;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Pool for one-shot CLI commands, built from the same environment as the server
pub async fn connect() -> anyhow::Result<PgPool> {
    let _ = dotenvy::dotenv();
    let pool = DatabaseManager::connect_lazy(&config().database)?;
    DatabaseManager::health_check(&pool).await?;
    Ok(pool)
}
