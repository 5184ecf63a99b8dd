//! Dashboard summary

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use phdtrack_common::{
    db::{HiringStatusCount, TableCounts},
    errors::Result,
};

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub counts: TableCounts,
    pub hiring_status: Vec<HiringStatusCount>,
}

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>> {
    let repo = state.repo();

    Ok(Json(DashboardResponse {
        counts: repo.table_counts().await?,
        hiring_status: repo.hiring_status_counts().await?,
    }))
}
