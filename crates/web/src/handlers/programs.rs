//! Program listing with professor counts

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use phdtrack_common::{errors::Result, report::ProgramCount};

#[derive(Debug, Serialize)]
pub struct ProgramRow {
    pub program_id: i32,
    pub program: String,
    pub department_id: i32,
    pub department: String,
    pub university_id: i32,
    pub university: String,
    pub professor_count: i64,
}

impl From<ProgramCount> for ProgramRow {
    fn from(row: ProgramCount) -> Self {
        Self {
            program_id: row.program.id,
            program: row.program.name,
            department_id: row.department.id,
            department: row.department.name,
            university_id: row.university.id,
            university: row.university.name,
            professor_count: row.professor_count,
        }
    }
}

/// Programs ordered by university, department and name
pub async fn list_programs(State(state): State<AppState>) -> Result<Json<Vec<ProgramRow>>> {
    let rows = state.repo().programs_with_counts().await?;
    Ok(Json(rows.into_iter().map(ProgramRow::from).collect()))
}
