use shared::{ImportRecipeRequest, ImportRecipeResponse, RecipeSummary};

use crate::backend::domain::commands::imports::{ImportRecipeCommand, ImportRecipeResult};

/// Mapper for the recipe import surface.
pub struct ImportMapper;

impl ImportMapper {
    pub fn to_import_command(request: ImportRecipeRequest) -> ImportRecipeCommand {
        ImportRecipeCommand {
            query: request.query,
            meal_id: request.meal_id,
            idempotency_key: request.idempotency_key,
        }
    }

    /// A replayed import carries no report; every counter is zero
    pub fn to_import_response_dto(result: ImportRecipeResult) -> ImportRecipeResponse {
        match result.report {
            Some(report) => ImportRecipeResponse {
                recipe: Some(RecipeSummary {
                    id: report.recipe.id,
                    title: report.recipe.title,
                }),
                recipe_created: report.recipe_created,
                ingredients_created: report.ingredients_created,
                links_created: report.links_created,
                links_updated: report.links_updated,
                replayed: result.replayed,
                success_message: result.success_message,
            },
            None => ImportRecipeResponse {
                recipe: None,
                recipe_created: false,
                ingredients_created: 0,
                links_created: 0,
                links_updated: 0,
                replayed: result.replayed,
                success_message: result.success_message,
            },
        }
    }
}
