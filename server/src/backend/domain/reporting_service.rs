//! Read-only summaries over the catalog and the plans.

use anyhow::Result;
use shared::{
    PlanCompletionResponse, PlanStatus, PlanStatusBreakdownResponse, RecipeIngredientCount,
    RecipeStatsResponse, RecipeUsage, TimeBucket, TotalTimeChartResponse,
};
use tracing::info;

use crate::backend::domain::plan_coverage;
use crate::backend::storage::{DbConnection, ReportRepository};

pub const TOTAL_TIME_CHART_TITLE: &str = "Total time (prep + cook)";

/// Titles listed per bucket before the rest is summarized as `+N more`
pub const BUCKET_TITLE_LIMIT: i64 = 12;

/// (label, min minutes, max minutes), bounds inclusive
pub const TIME_BUCKETS: [(&str, i64, i64); 4] = [
    ("≤15m", 0, 15),
    ("16–30m", 16, 30),
    ("31–45m", 31, 45),
    ("46–60m", 46, 60),
];

#[derive(Clone)]
pub struct ReportingService {
    db: DbConnection,
    reports: ReportRepository,
}

impl ReportingService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            db,
            reports: ReportRepository::new(),
        }
    }

    /// Recipe count, most planned recipes and recipes by ingredient count
    pub async fn recipe_stats(&self) -> Result<RecipeStatsResponse> {
        let mut conn = self.db.acquire().await?;

        let total_recipes = self.reports.count_recipes(&mut conn).await?;
        let top_used_recipes = self
            .reports
            .top_used_recipes(&mut conn)
            .await?
            .into_iter()
            .map(|row| RecipeUsage {
                recipe_id: row.recipe_id,
                title: row.title,
                uses: row.uses,
            })
            .collect();
        let recipes_by_ingredient_count = self
            .reports
            .recipes_by_ingredient_count(&mut conn)
            .await?
            .into_iter()
            .map(|row| RecipeIngredientCount {
                recipe_id: row.recipe_id,
                title: row.title,
                ingredient_count: row.ingredients,
            })
            .collect();

        Ok(RecipeStatsResponse {
            total_recipes,
            top_used_recipes,
            recipes_by_ingredient_count,
        })
    }

    /// Histogram of prep + cook minutes; recipes over an hour are left out
    pub async fn total_time_chart(&self) -> Result<TotalTimeChartResponse> {
        let mut conn = self.db.acquire().await?;

        let mut buckets = Vec::with_capacity(TIME_BUCKETS.len());
        for (label, min_minutes, max_minutes) in TIME_BUCKETS {
            let count = self
                .reports
                .count_by_total_time(&mut conn, min_minutes, max_minutes)
                .await?;
            let titles = self
                .reports
                .titles_by_total_time(&mut conn, min_minutes, max_minutes, BUCKET_TITLE_LIMIT)
                .await?;
            let more = (count - titles.len() as i64).max(0);

            buckets.push(TimeBucket {
                label: label.to_string(),
                min_minutes,
                max_minutes,
                count,
                hover_text: hover_text(&titles, more),
                titles,
                more,
            });
        }

        Ok(TotalTimeChartResponse {
            title: TOTAL_TIME_CHART_TITLE.to_string(),
            buckets,
        })
    }

    /// Plans with at least a week of covered days versus the rest
    ///
    /// Uses [`plan_coverage::is_globally_complete`], not the strict status.
    pub async fn plan_completion(&self) -> Result<PlanCompletionResponse> {
        let mut conn = self.db.acquire().await?;
        let plans = self.reports.plan_covered_days(&mut conn).await?;

        let total = plans.len() as u64;
        let complete = plans
            .iter()
            .filter(|p| plan_coverage::is_globally_complete(covered(p.covered_days)))
            .count() as u64;
        info!("Plan completion: {} of {} plans", complete, total);

        Ok(PlanCompletionResponse {
            complete,
            incomplete: total - complete,
            total,
        })
    }

    /// Counts per strict plan status
    pub async fn plan_status_breakdown(&self) -> Result<PlanStatusBreakdownResponse> {
        let mut conn = self.db.acquire().await?;
        let plans = self.reports.plan_covered_days(&mut conn).await?;

        let mut breakdown = PlanStatusBreakdownResponse {
            complete: 0,
            in_progress: 0,
            empty: 0,
            total: plans.len() as u64,
        };
        for p in &plans {
            let total_days = plan_coverage::total_days(p.plan.start_date, p.plan.end_date);
            match plan_coverage::classify(total_days, covered(p.covered_days)) {
                PlanStatus::Complete => breakdown.complete += 1,
                PlanStatus::InProgress => breakdown.in_progress += 1,
                PlanStatus::Empty => breakdown.empty += 1,
            }
        }

        Ok(breakdown)
    }
}

fn covered(days: i64) -> u32 {
    u32::try_from(days).unwrap_or(0)
}

/// One title per line, `+N more` when truncated, `No recipes` when empty
fn hover_text(titles: &[String], more: i64) -> String {
    if titles.is_empty() {
        return "No recipes".to_string();
    }
    let mut text = titles.join("\n");
    if more > 0 {
        text.push_str(&format!("\n+{} more", more));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::commands::meal_plans::{CreateMealPlanCommand, UpsertEntryCommand};
    use crate::backend::domain::commands::recipes::CreateRecipeCommand;
    use crate::backend::domain::meal_plan_service::MealPlanService;
    use crate::backend::domain::recipe_service::RecipeService;
    use chrono::{Duration, NaiveDate};

    struct Fixture {
        reporting: ReportingService,
        recipes: RecipeService,
        plans: MealPlanService,
    }

    async fn setup_test() -> Fixture {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        Fixture {
            reporting: ReportingService::new(db.clone()),
            recipes: RecipeService::new(db.clone()),
            plans: MealPlanService::new(db),
        }
    }

    async fn create_recipe(f: &Fixture, title: &str, prep: i64, cook: i64) -> i64 {
        f.recipes
            .create_recipe(CreateRecipeCommand {
                title: title.to_string(),
                description: None,
                servings: None,
                prep_minutes: prep,
                cook_minutes: cook,
            })
            .await
            .unwrap()
            .id
    }

    /// Create a plan and fill `covered` of its days with a dinner
    async fn create_plan(f: &Fixture, name: &str, days: i64, covered: i64, recipe_id: i64) {
        let start = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let end = start + Duration::days(days - 1);
        let plan = f
            .plans
            .create_plan(CreateMealPlanCommand {
                name: name.to_string(),
                start_date: start.to_string(),
                end_date: end.to_string(),
            })
            .await
            .unwrap();
        for offset in 0..covered {
            f.plans
                .upsert_entry(UpsertEntryCommand {
                    meal_plan_id: plan.id,
                    date: Some((start + Duration::days(offset)).to_string()),
                    meal_type: Some("dinner".to_string()),
                    recipe_id: Some(recipe_id),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_total_time_buckets() {
        let f = setup_test().await;
        create_recipe(&f, "Boiled eggs", 0, 10).await;
        create_recipe(&f, "Club sandwich", 15, 0).await;
        create_recipe(&f, "Chicken curry", 15, 15).await;
        create_recipe(&f, "Roast chicken", 20, 70).await;

        let chart = f.reporting.total_time_chart().await.unwrap();

        assert_eq!(chart.title, TOTAL_TIME_CHART_TITLE);
        let counts: Vec<_> = chart.buckets.iter().map(|b| (b.label.as_str(), b.count)).collect();
        assert_eq!(counts, vec![("≤15m", 2), ("16–30m", 1), ("31–45m", 0), ("46–60m", 0)]);
        assert_eq!(chart.buckets[0].hover_text, "Boiled eggs\nClub sandwich");
        assert_eq!(chart.buckets[2].hover_text, "No recipes");
    }

    #[tokio::test]
    async fn test_bucket_titles_are_truncated() {
        let f = setup_test().await;
        for i in 0..15 {
            create_recipe(&f, &format!("Snack {:02}", i), 1, 1).await;
        }

        let chart = f.reporting.total_time_chart().await.unwrap();
        let bucket = &chart.buckets[0];

        assert_eq!(bucket.count, 15);
        assert_eq!(bucket.titles.len(), 12);
        assert_eq!(bucket.more, 3);
        assert!(bucket.hover_text.ends_with("Snack 11\n+3 more"));
    }

    #[tokio::test]
    async fn test_recipe_stats() {
        let f = setup_test().await;
        let soup = create_recipe(&f, "Pumpkin soup", 10, 30).await;
        create_recipe(&f, "Unused recipe", 5, 5).await;
        create_plan(&f, "Soup week", 7, 3, soup).await;

        let stats = f.reporting.recipe_stats().await.unwrap();

        assert_eq!(stats.total_recipes, 2);
        assert_eq!(stats.top_used_recipes.len(), 1);
        assert_eq!(stats.top_used_recipes[0].title, "Pumpkin soup");
        assert_eq!(stats.top_used_recipes[0].uses, 3);
        assert!(stats.recipes_by_ingredient_count.is_empty());
    }

    #[tokio::test]
    async fn test_loose_and_strict_completion_disagree_on_long_plans() {
        let f = setup_test().await;
        let recipe = create_recipe(&f, "Stir fry", 10, 10).await;
        create_plan(&f, "Full week", 7, 7, recipe).await;
        create_plan(&f, "Long fortnight", 14, 9, recipe).await;
        create_plan(&f, "Started", 7, 2, recipe).await;
        create_plan(&f, "Nothing yet", 7, 0, recipe).await;

        let loose = f.reporting.plan_completion().await.unwrap();
        assert_eq!(loose.complete, 2);
        assert_eq!(loose.incomplete, 2);
        assert_eq!(loose.total, 4);

        let strict = f.reporting.plan_status_breakdown().await.unwrap();
        assert_eq!(strict.complete, 1);
        assert_eq!(strict.in_progress, 2);
        assert_eq!(strict.empty, 1);
        assert_eq!(strict.total, 4);
    }

    #[test]
    fn test_hover_text() {
        assert_eq!(hover_text(&[], 0), "No recipes");
        assert_eq!(hover_text(&["A".to_string()], 2), "A\n+2 more");
    }
}
