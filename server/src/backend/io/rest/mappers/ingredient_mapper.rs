use shared::{
    Ingredient as SharedIngredient, IngredientDetailResponse, IngredientListResponse,
    IngredientResponse,
};

use crate::backend::domain::commands::ingredients::IngredientDetail;
use crate::backend::domain::models::ingredient::Ingredient as DomainIngredient;
use crate::backend::io::rest::mappers::RecipeMapper;

/// Mapper from domain ingredients to the shared Ingredient DTOs.
pub struct IngredientMapper;

impl IngredientMapper {
    pub fn to_dto(domain: DomainIngredient) -> SharedIngredient {
        SharedIngredient {
            id: domain.id,
            name: domain.name,
            unit: domain.unit,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }

    pub fn to_ingredient_response_dto(domain: DomainIngredient) -> IngredientResponse {
        let success_message = format!("Ingredient \"{}\" created.", domain.name);
        IngredientResponse {
            ingredient: Self::to_dto(domain),
            success_message,
        }
    }

    pub fn to_ingredient_list_dto(domain: Vec<DomainIngredient>) -> IngredientListResponse {
        IngredientListResponse {
            ingredients: domain.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_ingredient_detail_dto(detail: IngredientDetail) -> IngredientDetailResponse {
        let recipes: Vec<_> = detail
            .recipes
            .into_iter()
            .map(RecipeMapper::to_summary_dto)
            .collect();
        IngredientDetailResponse {
            ingredient: Self::to_dto(detail.ingredient),
            total_recipes: recipes.len(),
            recipes,
        }
    }
}
