//! EstateFlow sync - lead ingestion and AI property matching service
//!
//! This library pulls buyer leads from a shared spreadsheet, keeps them in
//! step with a hosted row-store, and asks a generative model to match leads
//! against property inventory.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{csv::parse as parse_csv, map_leads, rank, Library, Reconciler, SortOrder, Workspace};
pub use crate::models::{Lead, LeadCriteria, Property, Recommendation, RecommendationResponse, StoredDocument};
