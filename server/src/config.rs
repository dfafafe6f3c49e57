//! Command-line and environment configuration of the server.

use clap::Parser;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:mealprep.db";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_RECIPE_API_URL: &str = "https://www.themealdb.com/api/json/v1/1/search.php";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";

/// Every option can also be set through its `MEALPREP_*` environment variable
#[derive(Debug, Clone, Parser)]
#[command(name = "mealprep-server")]
#[command(about = "Meal planning API: recipes, ingredients, meal plans and reports")]
pub struct ServerConfig {
    /// SQLite database URL; the file is created when missing
    #[arg(long, env = "MEALPREP_DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    /// Address the HTTP server listens on
    #[arg(long, env = "MEALPREP_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Search endpoint of the external recipe service
    #[arg(long, env = "MEALPREP_RECIPE_API_URL", default_value = DEFAULT_RECIPE_API_URL)]
    pub recipe_api_url: String,

    /// Timeout for one external recipe search
    #[arg(long, env = "MEALPREP_RECIPE_API_TIMEOUT_SECS", default_value_t = 5)]
    pub recipe_api_timeout_secs: u64,

    /// Origin allowed to call the API from a browser
    #[arg(long, env = "MEALPREP_CORS_ORIGIN", default_value = DEFAULT_CORS_ORIGIN)]
    pub cors_origin: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["mealprep-server"]).unwrap();

        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.recipe_api_timeout_secs, 5);
        assert_eq!(config.cors_origin, DEFAULT_CORS_ORIGIN);
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "mealprep-server",
            "--database-url",
            "sqlite:/tmp/plans.db",
            "--recipe-api-timeout-secs",
            "2",
        ])
        .unwrap();

        assert_eq!(config.database_url, "sqlite:/tmp/plans.db");
        assert_eq!(config.recipe_api_timeout_secs, 2);
    }
}
