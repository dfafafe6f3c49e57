//! Client for the external recipe search service.
//!
//! The service answers `GET <endpoint>?s=<query>` with
//! `{"meals": [{"idMeal": ..., "strMeal": ..., "strIngredient1": ..., "strMeasure1": ...}] | null}`.
//! A `null` list is a normal "no match" answer. Every call is bounded by the
//! client timeout; transport and decoding problems come back as
//! [`RecipeSearchError`] values instead of panics.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use shared::{ExternalIngredient, ExternalMeal};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Number of numbered ingredient/measure fields per meal
pub const MAX_INGREDIENT_FIELDS: usize = 20;

#[derive(Debug, Error)]
pub enum RecipeSearchError {
    #[error("Recipe search timed out")]
    Timeout,

    #[error("Recipe search network error: {0}")]
    Network(String),

    #[error("Recipe search returned HTTP {0}")]
    Status(StatusCode),

    #[error("Recipe search returned malformed data: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RecipeSearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RecipeSearchError::Timeout
        } else if err.is_decode() {
            RecipeSearchError::Decode(err.to_string())
        } else {
            RecipeSearchError::Network(err.to_string())
        }
    }
}

/// Free-text recipe search against some external catalog
#[async_trait]
pub trait RecipeSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<ExternalMeal>, RecipeSearchError>;
}

/// HTTP client for TheMealDB-style search endpoints
#[derive(Clone)]
pub struct MealDbClient {
    http: Client,
    endpoint: String,
}

impl MealDbClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RecipeSearchError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl RecipeSearch for MealDbClient {
    async fn search(&self, query: &str) -> Result<Vec<ExternalMeal>, RecipeSearchError> {
        debug!("Searching external recipes for '{}'", query);

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("s", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Recipe search for '{}' failed with HTTP {}", query, status);
            return Err(RecipeSearchError::Status(status));
        }

        let body = response.text().await?;
        parse_search_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    meals: Option<Vec<Map<String, Value>>>,
}

/// Decode a search response body into meals
pub fn parse_search_response(body: &str) -> Result<Vec<ExternalMeal>, RecipeSearchError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| RecipeSearchError::Decode(e.to_string()))?;

    response
        .meals
        .unwrap_or_default()
        .iter()
        .map(meal_from_fields)
        .collect()
}

fn meal_from_fields(fields: &Map<String, Value>) -> Result<ExternalMeal, RecipeSearchError> {
    let id = text_field(fields, "idMeal")
        .ok_or_else(|| RecipeSearchError::Decode("meal without idMeal".to_string()))?;
    let name = text_field(fields, "strMeal")
        .ok_or_else(|| RecipeSearchError::Decode(format!("meal {} without strMeal", id)))?;

    let ingredients = (1..=MAX_INGREDIENT_FIELDS)
        .filter_map(|n| {
            let name = text_field(fields, &format!("strIngredient{}", n))?;
            let measure = text_field(fields, &format!("strMeasure{}", n)).unwrap_or_default();
            Some(ExternalIngredient { name, measure })
        })
        .collect();

    Ok(ExternalMeal {
        id,
        name,
        instructions: text_field(fields, "strInstructions").unwrap_or_default(),
        category: text_field(fields, "strCategory"),
        area: text_field(fields, "strArea"),
        thumbnail: text_field(fields, "strMealThumb"),
        ingredients,
    })
}

/// Trimmed non-empty string value; numbers are accepted for ids
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match fields.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_meals_is_empty_result() {
        assert!(parse_search_response(r#"{"meals": null}"#).unwrap().is_empty());
        assert!(parse_search_response(r#"{}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_meal_fields() {
        let body = r#"{
            "meals": [{
                "idMeal": "52772",
                "strMeal": "Teriyaki Chicken Casserole",
                "strInstructions": "Preheat oven to 350F.",
                "strCategory": "Chicken",
                "strArea": "Japanese",
                "strMealThumb": "https://example.com/thumb.jpg",
                "strIngredient1": "soy sauce",
                "strMeasure1": "3/4 cup",
                "strIngredient2": " ",
                "strMeasure2": " ",
                "strIngredient3": "garlic",
                "strMeasure3": null,
                "strIngredient4": null
            }]
        }"#;

        let meals = parse_search_response(body).unwrap();

        assert_eq!(meals.len(), 1);
        let meal = &meals[0];
        assert_eq!(meal.id, "52772");
        assert_eq!(meal.area.as_deref(), Some("Japanese"));
        assert_eq!(
            meal.ingredients,
            vec![
                ExternalIngredient {
                    name: "soy sauce".to_string(),
                    measure: "3/4 cup".to_string()
                },
                ExternalIngredient {
                    name: "garlic".to_string(),
                    measure: String::new()
                },
            ]
        );
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        assert!(matches!(
            parse_search_response("<html>busy</html>"),
            Err(RecipeSearchError::Decode(_))
        ));
        assert!(matches!(
            parse_search_response(r#"{"meals": [{"strMeal": "No id"}]}"#),
            Err(RecipeSearchError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        // Port 9 on localhost is not expected to accept connections
        let client = MealDbClient::new("http://127.0.0.1:9/search.php", Duration::from_secs(2)).unwrap();

        let err = client.search("chicken").await.unwrap_err();

        assert!(matches!(
            err,
            RecipeSearchError::Network(_) | RecipeSearchError::Timeout
        ));
    }
}
