//! Meal plans and the entries occupying their slots.
//!
//! A slot is the (plan, date, meal type) triple. The store keeps at most one
//! entry per slot with a unique constraint; [`MealPlanService::upsert_entry`]
//! inserts and, when another writer got there first, turns the failed insert
//! into an update of the existing row. The last writer's recipe wins.

use anyhow::{anyhow, Result};
use chrono::{Duration, Local, NaiveDate, Utc};
use shared::MealType;
use tracing::{info, warn};

use crate::backend::domain::commands::meal_plans::{
    CreateMealPlanCommand, MealPlanDetail, MealPlanListQuery, MealPlanPage, MealPlanSummary,
    UpsertEntryCommand, UpsertEntryResult, WeekEntries,
};
use crate::backend::domain::errors::DomainError;
use crate::backend::domain::models::meal_plan::{
    MealPlan, MealPlanEntry, Slot, MAX_NOTES_LENGTH, MAX_PLAN_NAME_LENGTH,
};
use crate::backend::domain::plan_coverage;
use crate::backend::storage::{
    is_unique_violation, DbConnection, MealPlanEntryRepository, MealPlanRepository,
    ProcessedActionRepository, RecipeRepository,
};

pub const PLANS_PER_PAGE: u32 = 10;

/// Days shown by the week view, today included
pub const WEEK_VIEW_DAYS: i64 = 7;

const DATE_FORMAT: &str = "%Y-%m-%d";
const UPSERT_ENTRY_ACTION: &str = "upsert_entry";

/// Service for meal plans and their entries
#[derive(Clone)]
pub struct MealPlanService {
    db: DbConnection,
    plans: MealPlanRepository,
    entries: MealPlanEntryRepository,
    recipes: RecipeRepository,
    processed: ProcessedActionRepository,
}

impl MealPlanService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            db,
            plans: MealPlanRepository::new(),
            entries: MealPlanEntryRepository::new(),
            recipes: RecipeRepository::new(),
            processed: ProcessedActionRepository::new(),
        }
    }

    /// Create a new meal plan
    pub async fn create_plan(&self, command: CreateMealPlanCommand) -> Result<MealPlan> {
        info!(
            "Creating meal plan: name={}, start={}, end={}",
            command.name, command.start_date, command.end_date
        );

        let name = command.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("Plan name cannot be empty").into());
        }
        if name.chars().count() > MAX_PLAN_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Plan name cannot exceed {} characters",
                MAX_PLAN_NAME_LENGTH
            ))
            .into());
        }
        let start_date = parse_date(&command.start_date, "Start date")?;
        let end_date = parse_date(&command.end_date, "End date")?;
        if end_date < start_date {
            return Err(DomainError::validation("End date cannot be before start date").into());
        }

        let mut conn = self.db.acquire().await?;
        match self
            .plans
            .insert(&mut conn, &name, start_date, end_date, Utc::now())
            .await
        {
            Ok(plan) => {
                info!("Created meal plan {} with ID {}", plan.name, plan.id);
                Ok(plan)
            }
            Err(e) if is_unique_violation(&e) => Err(DomainError::conflict(format!(
                "A plan named '{}' already starts on {}",
                name, start_date
            ))
            .into()),
            Err(e) => Err(e),
        }
    }

    /// One page of plans, newest first, each with its coverage
    pub async fn list_plans(&self, query: MealPlanListQuery) -> Result<MealPlanPage> {
        let page = query.page.unwrap_or(1).max(1);
        let offset = i64::from(page - 1) * i64::from(PLANS_PER_PAGE);

        let mut conn = self.db.acquire().await?;
        let total = self.plans.count(&mut conn).await?;
        let plans = self
            .plans
            .list_page(&mut conn, i64::from(PLANS_PER_PAGE), offset)
            .await?;

        let mut summaries = Vec::with_capacity(plans.len());
        for plan in plans {
            let entries = self.entries.list_for_plan(&mut conn, plan.id).await?;
            summaries.push(summarize(plan, &entries));
        }

        let total = u64::try_from(total).unwrap_or_default();
        let shown = u64::from(page) * u64::from(PLANS_PER_PAGE);
        info!("Listing meal plans page {}: {} of {}", page, summaries.len(), total);

        Ok(MealPlanPage {
            plans: summaries,
            page,
            per_page: PLANS_PER_PAGE,
            total,
            has_next: shown < total,
        })
    }

    /// A plan with its entries and full coverage view
    pub async fn get_plan(&self, id: i64) -> Result<MealPlanDetail> {
        let mut conn = self.db.acquire().await?;
        let plan = self.require_plan(&mut conn, id).await?;
        let entries = self.entries.list_for_plan(&mut conn, id).await?;
        let coverage = plan_coverage::compute_coverage(plan.start_date, plan.end_date, &entries);

        Ok(MealPlanDetail {
            plan,
            entries,
            coverage,
        })
    }

    /// Delete a plan together with its entries
    pub async fn delete_plan(&self, id: i64) -> Result<()> {
        info!("Deleting meal plan: {}", id);

        let mut conn = self.db.acquire().await?;
        if !self.plans.delete(&mut conn, id).await? {
            return Err(DomainError::not_found(format!("Meal plan {} not found", id)).into());
        }
        Ok(())
    }

    /// Assign a recipe to a slot, creating the entry or overwriting the existing one
    pub async fn upsert_entry(&self, command: UpsertEntryCommand) -> Result<UpsertEntryResult> {
        info!(
            "Upserting entry in plan {}: date={:?}, meal_type={:?}, recipe={:?}",
            command.meal_plan_id, command.date, command.meal_type, command.recipe_id
        );

        let validated = self.validate_upsert(&command).await?;
        let slot = validated.slot;
        let now = Utc::now();

        let mut tx = self.db.begin().await?;

        if let Some(key) = command.idempotency_key.as_deref() {
            if !self
                .processed
                .record(&mut *tx, key, UPSERT_ENTRY_ACTION, now)
                .await?
            {
                tx.rollback().await?;
                info!("Idempotency key {} already processed, skipping write", key);
                let mut conn = self.db.acquire().await?;
                let entry = self.entries.find_by_slot(&mut conn, &slot).await?;
                return Ok(UpsertEntryResult {
                    entry,
                    created: false,
                    replayed: true,
                    success_message: None,
                });
            }
        }

        let (entry_id, created) = match self
            .entries
            .insert(&mut *tx, &slot, Some(validated.recipe_id), &validated.notes, now)
            .await
        {
            Ok(id) => (id, true),
            Err(e) if is_unique_violation(&e) => {
                info!("Slot already taken, updating existing entry");
                let id = self
                    .entries
                    .update_slot(&mut *tx, &slot, Some(validated.recipe_id), &validated.notes, now)
                    .await?
                    .ok_or_else(|| anyhow!("Slot conflict reported but no entry found"))?;
                (id, false)
            }
            Err(e) => return Err(e),
        };

        let entry = self
            .entries
            .get(&mut *tx, entry_id)
            .await?
            .ok_or_else(|| anyhow!("Entry {} vanished during upsert", entry_id))?;
        tx.commit().await?;

        let success_message = format!(
            "{} on {} set to \"{}\".",
            entry.meal_type.label(),
            entry.date.format(DATE_FORMAT),
            entry.recipe_title.as_deref().unwrap_or("TBD")
        );
        info!("{} (entry {}, created={})", success_message, entry.id, created);

        Ok(UpsertEntryResult {
            entry: Some(entry),
            created,
            replayed: false,
            success_message: Some(success_message),
        })
    }

    /// Remove one entry from a plan
    pub async fn delete_entry(&self, meal_plan_id: i64, entry_id: i64) -> Result<()> {
        info!("Deleting entry {} from plan {}", entry_id, meal_plan_id);

        let mut conn = self.db.acquire().await?;
        if !self.entries.delete(&mut conn, meal_plan_id, entry_id).await? {
            return Err(DomainError::not_found(format!(
                "Entry {} not found in meal plan {}",
                entry_id, meal_plan_id
            ))
            .into());
        }
        Ok(())
    }

    /// Entries of every plan from today through the next six days
    pub async fn week_entries(&self) -> Result<WeekEntries> {
        self.week_entries_from(Local::now().date_naive()).await
    }

    pub async fn week_entries_from(&self, start: NaiveDate) -> Result<WeekEntries> {
        let end = start + Duration::days(WEEK_VIEW_DAYS - 1);

        let mut conn = self.db.acquire().await?;
        let entries = self.entries.list_between(&mut conn, start, end).await?;
        info!("Found {} entries between {} and {}", entries.len(), start, end);

        Ok(WeekEntries {
            start,
            end,
            entries,
        })
    }

    async fn require_plan(&self, conn: &mut sqlx::SqliteConnection, id: i64) -> Result<MealPlan> {
        self.plans
            .get(conn, id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Meal plan {} not found", id)).into())
    }

    /// Check the submitted slot values against the plan and the catalog
    async fn validate_upsert(&self, command: &UpsertEntryCommand) -> Result<ValidatedEntry> {
        let date_text = command
            .date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or_else(|| DomainError::validation("Date is required"))?;
        let date = parse_date(date_text, "Date")?;

        let meal_type_text = command
            .meal_type
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| DomainError::validation("Meal type is required"))?;
        let meal_type: MealType = meal_type_text
            .parse()
            .map_err(|e: shared::ParseEnumError| DomainError::validation(e.to_string()))?;

        let recipe_id = command
            .recipe_id
            .ok_or_else(|| DomainError::validation("Please select a recipe"))?;

        let notes = command.notes.as_deref().map(str::trim).unwrap_or("").to_string();
        if notes.chars().count() > MAX_NOTES_LENGTH {
            return Err(DomainError::validation(format!(
                "Notes cannot exceed {} characters",
                MAX_NOTES_LENGTH
            ))
            .into());
        }

        let mut conn = self.db.acquire().await?;
        let plan = self.require_plan(&mut conn, command.meal_plan_id).await?;
        if self.recipes.get(&mut conn, recipe_id).await?.is_none() {
            return Err(DomainError::validation("Selected recipe does not exist").into());
        }
        if !plan.contains(date) {
            warn!("Date {} outside plan {} range", date, plan.id);
            return Err(DomainError::validation(format!(
                "Date {} is outside the plan range {} to {}",
                date, plan.start_date, plan.end_date
            ))
            .into());
        }

        Ok(ValidatedEntry {
            slot: Slot {
                meal_plan_id: plan.id,
                date,
                meal_type,
            },
            recipe_id,
            notes,
        })
    }
}

struct ValidatedEntry {
    slot: Slot,
    recipe_id: i64,
    notes: String,
}

fn parse_date(text: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).map_err(|_| {
        DomainError::validation(format!("{} must be a valid date (YYYY-MM-DD)", field)).into()
    })
}

/// Coverage summary of a plan for listings
pub fn summarize(plan: MealPlan, entries: &[MealPlanEntry]) -> MealPlanSummary {
    let total_days = plan_coverage::total_days(plan.start_date, plan.end_date);
    let covered_days = plan_coverage::covered_days(
        plan.start_date,
        plan.end_date,
        entries.iter().map(|e| e.date),
    );

    MealPlanSummary {
        plan,
        total_days,
        covered_days,
        coverage_percent: plan_coverage::coverage_percent(covered_days, total_days),
        status: plan_coverage::classify(total_days, covered_days),
    }
}
