use shared::{
    AddRecipeIngredientResponse, Recipe as SharedRecipe, RecipeDetailResponse,
    RecipeLine as SharedRecipeLine, RecipeListResponse, RecipeResponse, RecipeSummary,
};

use crate::backend::domain::commands::recipes::{
    AddRecipeIngredientResult, RecipeDetail, RecipeListResult,
};
use crate::backend::domain::models::recipe::{Recipe as DomainRecipe, RecipeLine};

/// Mapper from domain recipes to the shared Recipe DTOs.
pub struct RecipeMapper;

impl RecipeMapper {
    pub fn to_dto(domain: DomainRecipe) -> SharedRecipe {
        SharedRecipe {
            id: domain.id,
            title: domain.title,
            description: domain.description,
            servings: domain.servings,
            prep_minutes: domain.prep_minutes,
            cook_minutes: domain.cook_minutes,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }

    pub fn to_summary_dto(domain: DomainRecipe) -> RecipeSummary {
        RecipeSummary {
            id: domain.id,
            title: domain.title,
        }
    }

    pub fn to_line_dto(domain: RecipeLine) -> SharedRecipeLine {
        SharedRecipeLine {
            id: domain.id,
            ingredient_id: domain.ingredient_id,
            ingredient_name: domain.ingredient_name,
            quantity: domain.quantity,
            unit: domain.ingredient_unit,
            unit_label: domain.unit_label,
        }
    }

    pub fn to_recipe_response_dto(domain: DomainRecipe) -> RecipeResponse {
        let success_message = format!("Recipe \"{}\" created.", domain.title);
        RecipeResponse {
            recipe: Self::to_dto(domain),
            success_message,
        }
    }

    pub fn to_recipe_list_dto(result: RecipeListResult) -> RecipeListResponse {
        let results_count = result.results_count();
        RecipeListResponse {
            recipes: result.recipes.into_iter().map(Self::to_dto).collect(),
            query: result.query,
            search_results: result
                .search_results
                .map(|found| found.into_iter().map(Self::to_dto).collect()),
            results_count,
        }
    }

    pub fn to_recipe_detail_dto(detail: RecipeDetail) -> RecipeDetailResponse {
        RecipeDetailResponse {
            recipe: Self::to_dto(detail.recipe),
            ingredients: detail.lines.into_iter().map(Self::to_line_dto).collect(),
        }
    }

    pub fn to_add_ingredient_dto(result: AddRecipeIngredientResult) -> AddRecipeIngredientResponse {
        AddRecipeIngredientResponse {
            line: Self::to_line_dto(result.line),
            success_message: result.success_message,
        }
    }
}
