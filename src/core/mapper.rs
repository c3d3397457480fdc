use chrono::NaiveDate;

use crate::models::{Lead, LeadCriteria, LeadStatus};

/// Prefix of locally generated lead ids that the row-store has not assigned yet
pub const SYNTHETIC_ID_PREFIX: &str = "gs-";

const COL_NAME: usize = 0;
const COL_EMAIL: usize = 1;
const COL_STATUS: usize = 2;
const COL_BUDGET_MIN: usize = 3;
const COL_BUDGET_MAX: usize = 4;
const COL_LOCATION: usize = 5;
const COL_MIN_BEDROOMS: usize = 6;
const COL_MIN_BATHROOMS: usize = 7;
const COL_PREFERRED_TYPE: usize = 8;
const COL_LIFESTYLE: usize = 9;
const COL_FEATURES: usize = 10;

pub fn synthetic_id(index: usize) -> String {
    format!("{}{}", SYNTHETIC_ID_PREFIX, index)
}

pub fn is_synthetic_id(id: &str) -> bool {
    id.starts_with(SYNTHETIC_ID_PREFIX)
}

/// Map parsed sheet rows to leads.
///
/// Row 0 is always treated as the header and dropped. Malformed cells degrade to
/// defaults, so this never fails. Every lead is stamped as contacted on `today`.
pub fn map_leads(rows: &[Vec<String>], today: NaiveDate) -> Vec<Lead> {
    rows.iter()
        .skip(1)
        .enumerate()
        .map(|(index, row)| map_row(index, row, today))
        .collect()
}

fn map_row(index: usize, row: &[String], today: NaiveDate) -> Lead {
    let criteria = LeadCriteria {
        budget_min: number(row, COL_BUDGET_MIN),
        budget_max: number(row, COL_BUDGET_MAX),
        location: text(row, COL_LOCATION).unwrap_or_default().to_string(),
        min_bedrooms: number(row, COL_MIN_BEDROOMS).max(0.0) as u32,
        min_bathrooms: number(row, COL_MIN_BATHROOMS),
        preferred_type: text(row, COL_PREFERRED_TYPE).unwrap_or("House").to_string(),
        lifestyle: text(row, COL_LIFESTYLE).unwrap_or_default().to_string(),
        essential_features: text(row, COL_FEATURES).map(split_features).unwrap_or_default(),
    };

    let id = synthetic_id(index);
    if criteria.has_inverted_budget() {
        tracing::debug!(
            "Lead {} has budget_min {} above budget_max {}",
            id,
            criteria.budget_min,
            criteria.budget_max
        );
    }

    Lead {
        id,
        name: text(row, COL_NAME).unwrap_or("Unknown Lead").to_string(),
        email: text(row, COL_EMAIL).unwrap_or_default().to_string(),
        status: text(row, COL_STATUS)
            .and_then(LeadStatus::parse)
            .unwrap_or_default(),
        last_contacted: today,
        criteria,
    }
}

/// Non-empty cell at `index`
fn text(row: &[String], index: usize) -> Option<&str> {
    row.get(index).map(String::as_str).filter(|s| !s.is_empty())
}

/// Numeric cell, 0 when absent, blank or not a finite number
fn number(row: &[String], index: usize) -> f64 {
    text(row, index)
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn split_features(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
