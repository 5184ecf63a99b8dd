//! Lookup data for populating the professor form

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use phdtrack_common::{db::models::*, errors::Result};

#[derive(Debug, Serialize)]
pub struct Choice {
    pub code: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub universities: Vec<University>,
    pub departments: Vec<Department>,
    pub programs: Vec<Program>,
    pub research_areas: Vec<ResearchArea>,
    pub hiring_statuses: Vec<Choice>,
    pub contact_methods: Vec<Choice>,
}

pub async fn catalog(State(state): State<AppState>) -> Result<Json<CatalogResponse>> {
    let repo = state.repo();

    Ok(Json(CatalogResponse {
        universities: repo.list_universities().await?,
        departments: repo.list_departments().await?,
        programs: repo.list_programs().await?,
        research_areas: repo.list_research_areas().await?,
        hiring_statuses: HiringStatus::ALL
            .iter()
            .map(|s| Choice { code: s.code(), label: s.label() })
            .collect(),
        contact_methods: ContactMethod::ALL
            .iter()
            .map(|m| Choice { code: m.code(), label: m.label() })
            .collect(),
    }))
}
