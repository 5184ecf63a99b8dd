//! Idempotent schema bootstrap
//!
//! Tables are derived from the entity definitions (foreign keys included);
//! the composite uniqueness rules the entities cannot express are added as
//! separate unique indexes.

use crate::db::models::*;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectionTrait, DbErr, Schema};
use tracing::debug;

/// Every table the tracker owns, parents before children
pub const KNOWN_TABLES: [&str; 8] = [
    "university",
    "department",
    "program",
    "research_area",
    "professor",
    "professor_programs",
    "professor_research_areas",
    "applicant",
];

fn unique_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("uq_department_name_university")
            .table(DepartmentEntity)
            .col(DepartmentColumn::Name)
            .col(DepartmentColumn::UniversityId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("uq_program_name_department")
            .table(ProgramEntity)
            .col(ProgramColumn::Name)
            .col(ProgramColumn::DepartmentId)
            .unique()
            .if_not_exists()
            .to_owned(),
    ]
}

/// Create all missing tables and indexes
pub async fn create_schema<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let tables = [
        schema.create_table_from_entity(UniversityEntity),
        schema.create_table_from_entity(DepartmentEntity),
        schema.create_table_from_entity(ProgramEntity),
        schema.create_table_from_entity(ResearchAreaEntity),
        schema.create_table_from_entity(ProfessorEntity),
        schema.create_table_from_entity(ProfessorProgramEntity),
        schema.create_table_from_entity(ProfessorResearchAreaEntity),
        schema.create_table_from_entity(ApplicantEntity),
    ];

    for mut table in tables {
        table.if_not_exists();
        db.execute(backend.build(&table)).await?;
    }

    for index in unique_indexes() {
        db.execute(backend.build(&index)).await?;
    }

    debug!(tables = KNOWN_TABLES.len(), "Schema ensured");
    Ok(())
}
