use shared::{
    CreateMealPlanRequest, MealPlan as SharedMealPlan, MealPlanDetailResponse,
    MealPlanEntry as SharedEntry, MealPlanListResponse, MealPlanResponse,
    MealPlanSummary as SharedSummary, PageInfo, PlanCoverage as SharedCoverage,
    PlanDay as SharedDay, PlanWeek as SharedWeek, RecipeSummary, UpsertEntryRequest,
    UpsertEntryResponse, WeekEntriesResponse, WeekEntry,
};

use crate::backend::domain::commands::meal_plans::{
    CreateMealPlanCommand, MealPlanDetail, MealPlanPage, MealPlanSummary, UpsertEntryCommand,
    UpsertEntryResult, WeekEntries,
};
use crate::backend::domain::models::meal_plan::{MealPlan, MealPlanEntry};
use crate::backend::domain::plan_coverage::{PlanCoverage, PlanDay, PlanWeek};
use crate::backend::storage::DatedEntry;

/// Mapper between the shared meal plan DTOs and the domain models.
pub struct MealPlanMapper;

impl MealPlanMapper {
    pub fn to_create_command(request: CreateMealPlanRequest) -> CreateMealPlanCommand {
        CreateMealPlanCommand {
            name: request.name,
            start_date: request.start_date,
            end_date: request.end_date,
        }
    }

    pub fn to_upsert_command(meal_plan_id: i64, request: UpsertEntryRequest) -> UpsertEntryCommand {
        UpsertEntryCommand {
            meal_plan_id,
            date: request.date,
            meal_type: request.meal_type,
            recipe_id: request.recipe_id,
            notes: request.notes,
            idempotency_key: request.idempotency_key,
        }
    }

    pub fn to_dto(domain: MealPlan) -> SharedMealPlan {
        SharedMealPlan {
            id: domain.id,
            name: domain.name,
            start_date: domain.start_date,
            end_date: domain.end_date,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }

    /// A recipe reference survives only while the recipe does
    pub fn to_entry_dto(domain: MealPlanEntry) -> SharedEntry {
        let recipe = match (domain.recipe_id, domain.recipe_title) {
            (Some(id), Some(title)) => Some(RecipeSummary { id, title }),
            _ => None,
        };
        SharedEntry {
            id: domain.id,
            meal_plan_id: domain.meal_plan_id,
            date: domain.date,
            meal_type: domain.meal_type,
            recipe,
            notes: domain.notes,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }

    pub fn to_plan_response_dto(domain: MealPlan) -> MealPlanResponse {
        let success_message = format!("Meal plan \"{}\" created.", domain.name);
        MealPlanResponse {
            plan: Self::to_dto(domain),
            success_message,
        }
    }

    pub fn to_summary_dto(domain: MealPlanSummary) -> SharedSummary {
        SharedSummary {
            plan: Self::to_dto(domain.plan),
            total_days: domain.total_days,
            covered_days: domain.covered_days,
            coverage_percent: domain.coverage_percent,
            status: domain.status,
        }
    }

    pub fn to_plan_list_dto(page: MealPlanPage) -> MealPlanListResponse {
        MealPlanListResponse {
            plans: page.plans.into_iter().map(Self::to_summary_dto).collect(),
            pagination: PageInfo {
                page: page.page,
                per_page: page.per_page,
                total: page.total,
                has_next: page.has_next,
            },
        }
    }

    pub fn to_coverage_dto(domain: PlanCoverage) -> SharedCoverage {
        SharedCoverage {
            total_days: domain.total_days,
            covered_days: domain.covered_days,
            coverage_percent: domain.coverage_percent,
            status: domain.status,
            weeks: domain.weeks.into_iter().map(Self::to_week_dto).collect(),
        }
    }

    fn to_week_dto(week: PlanWeek) -> SharedWeek {
        SharedWeek {
            start: week.start,
            end: week.end,
            days: week.days.into_iter().map(Self::to_day_dto).collect(),
        }
    }

    fn to_day_dto(day: PlanDay) -> SharedDay {
        SharedDay {
            date: day.date,
            entries: day.entries.into_iter().map(Self::to_entry_dto).collect(),
        }
    }

    pub fn to_plan_detail_dto(detail: MealPlanDetail) -> MealPlanDetailResponse {
        let entries: Vec<_> = detail.entries.into_iter().map(Self::to_entry_dto).collect();
        MealPlanDetailResponse {
            plan: Self::to_dto(detail.plan),
            total_entries: entries.len(),
            entries,
            coverage: Self::to_coverage_dto(detail.coverage),
        }
    }

    pub fn to_upsert_response_dto(result: UpsertEntryResult) -> UpsertEntryResponse {
        UpsertEntryResponse {
            entry: result.entry.map(Self::to_entry_dto),
            created: result.created,
            replayed: result.replayed,
            success_message: result.success_message,
        }
    }

    pub fn to_week_entries_dto(week: WeekEntries) -> WeekEntriesResponse {
        WeekEntriesResponse {
            start: week.start,
            end: week.end,
            entries: week
                .entries
                .into_iter()
                .map(|DatedEntry { plan_name, entry }| WeekEntry {
                    plan_name,
                    entry: Self::to_entry_dto(entry),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use shared::MealType;

    fn entry(recipe_id: Option<i64>, recipe_title: Option<&str>) -> MealPlanEntry {
        let now = Utc::now();
        MealPlanEntry {
            id: 4,
            meal_plan_id: 2,
            date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            meal_type: MealType::Lunch,
            recipe_id,
            recipe_title: recipe_title.map(str::to_string),
            notes: "leftovers".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_entry_with_recipe() {
        let dto = MealPlanMapper::to_entry_dto(entry(Some(9), Some("Lentil soup")));
        assert_eq!(
            dto.recipe,
            Some(RecipeSummary {
                id: 9,
                title: "Lentil soup".to_string()
            })
        );
        assert_eq!(dto.recipe_label(), "Lentil soup");
    }

    #[test]
    fn test_entry_without_recipe_is_tbd() {
        let dto = MealPlanMapper::to_entry_dto(entry(None, None));
        assert_eq!(dto.recipe, None);
        assert_eq!(dto.recipe_label(), "TBD");
        assert_eq!(dto.notes, "leftovers");
    }
}
