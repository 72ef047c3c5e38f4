use std::env;

use lambda_http::Error;

/// Settings read once at startup and immutable for the process lifetime.
/// Handlers receive a reference instead of reading the environment per
/// request.
#[derive(Debug, Clone)]
pub(crate) struct AppConfig {
    pub table_name: String,
    pub cors_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Error> {
        let table_name =
            env::var("TABLE_NAME").map_err(|_| Error::from("TABLE_NAME not set"))?;
        let cors_origin = env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".to_string());

        Ok(Self {
            table_name,
            cors_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::AppConfig;

    #[test]
    fn origin_defaults_to_wildcard() {
        std::env::remove_var("CORS_ORIGIN");
        std::env::set_var("TABLE_NAME", "demo-table");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.table_name, "demo-table");
        assert_eq!(config.cors_origin, "*");
    }
}
