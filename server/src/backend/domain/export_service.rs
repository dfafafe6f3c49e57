//! Export of meal plan summaries as CSV or JSON documents.

use anyhow::Result;
use chrono::NaiveDate;
use csv::Writer;
use serde::Serialize;
use shared::PlanSummaryRecord;
use tracing::info;

use crate::backend::domain::plan_coverage;
use crate::backend::storage::{DbConnection, ReportRepository};

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

/// A rendered export ready to be sent as a download
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

/// Flat CSV row; the status is written with its display label
#[derive(Debug, Serialize)]
struct PlanSummaryCsvRow<'a> {
    name: &'a str,
    start_date: String,
    end_date: String,
    total_days: u32,
    covered_days: u32,
    coverage_percent: u32,
    status: &'static str,
}

impl<'a> From<&'a PlanSummaryRecord> for PlanSummaryCsvRow<'a> {
    fn from(record: &'a PlanSummaryRecord) -> Self {
        Self {
            name: &record.name,
            start_date: record.start_date.to_string(),
            end_date: record.end_date.to_string(),
            total_days: record.total_days,
            covered_days: record.covered_days,
            coverage_percent: record.coverage_percent,
            status: record.status.label(),
        }
    }
}

#[derive(Clone)]
pub struct ExportService {
    db: DbConnection,
    reports: ReportRepository,
}

impl ExportService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            db,
            reports: ReportRepository::new(),
        }
    }

    /// Summary records of all plans, latest start date first
    pub async fn plan_summaries(&self) -> Result<Vec<PlanSummaryRecord>> {
        let mut conn = self.db.acquire().await?;
        let plans = self.reports.plan_covered_days(&mut conn).await?;

        Ok(plans
            .into_iter()
            .map(|p| {
                let total_days = plan_coverage::total_days(p.plan.start_date, p.plan.end_date);
                let covered_days = u32::try_from(p.covered_days).unwrap_or(0);
                PlanSummaryRecord {
                    name: p.plan.name,
                    start_date: p.plan.start_date,
                    end_date: p.plan.end_date,
                    total_days,
                    covered_days,
                    coverage_percent: plan_coverage::coverage_percent(covered_days, total_days),
                    status: plan_coverage::classify(total_days, covered_days),
                }
            })
            .collect())
    }

    /// Render all plan summaries in the requested format
    pub async fn export_plan_summaries(
        &self,
        format: ExportFormat,
        today: NaiveDate,
    ) -> Result<ExportDocument> {
        let records = self.plan_summaries().await?;
        info!("Exporting {} plan summaries as {}", records.len(), format.extension());

        let body = match format {
            ExportFormat::Csv => render_csv(&records)?,
            ExportFormat::Json => serde_json::to_string_pretty(&records)?,
        };

        Ok(ExportDocument {
            filename: format!("meal_plans_{}.{}", today.format("%Y%m%d"), format.extension()),
            content_type: format.content_type(),
            body,
        })
    }
}

fn render_csv(records: &[PlanSummaryRecord]) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    if records.is_empty() {
        // serialize() only writes the header together with the first row
        writer.write_record([
            "name",
            "start_date",
            "end_date",
            "total_days",
            "covered_days",
            "coverage_percent",
            "status",
        ])?;
    }
    for record in records {
        writer.serialize(PlanSummaryCsvRow::from(record))?;
    }
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("CSV flush failed: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}
