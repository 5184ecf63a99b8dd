//! Full-replace synchronization of a professor's program and research area links

use std::collections::BTreeSet;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::Serialize;
use tracing::debug;

use crate::db::models::*;
use crate::errors::Result;
use crate::reconcile::names::parse_name_list;
use crate::reconcile::resolver::Resolver;

/// The complete set of names a professor should be linked to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredAssociations {
    pub programs: BTreeSet<String>,
    pub research_areas: BTreeSet<String>,
}

impl DesiredAssociations {
    /// Build from the raw comma-separated form fields
    pub fn from_lists(programs: &str, research_areas: &str) -> Self {
        Self {
            programs: parse_name_list(programs),
            research_areas: parse_name_list(research_areas),
        }
    }
}

/// Links that exist after a sync
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncedAssociations {
    pub programs: Vec<Program>,
    pub research_areas: Vec<ResearchArea>,
}

/// Replace every association of `professor` with exactly `desired`.
///
/// Programs are resolved inside the professor's current department. Prior
/// links not named in `desired` are dropped; the referenced programs and
/// research areas themselves stay.
pub async fn sync_associations<C>(
    resolver: &mut Resolver<'_, C>,
    professor: &Professor,
    desired: &DesiredAssociations,
) -> Result<SyncedAssociations>
where
    C: ConnectionTrait + TransactionTrait,
{
    let conn = resolver.connection();

    let removed_programs = ProfessorProgramEntity::delete_many()
        .filter(ProfessorProgramColumn::ProfessorId.eq(professor.id))
        .exec(conn)
        .await?
        .rows_affected;
    let removed_areas = ProfessorResearchAreaEntity::delete_many()
        .filter(ProfessorResearchAreaColumn::ProfessorId.eq(professor.id))
        .exec(conn)
        .await?
        .rows_affected;

    let mut synced = SyncedAssociations::default();
    // Names that trim to the same entity link once
    let mut linked_programs = BTreeSet::new();
    let mut linked_areas = BTreeSet::new();

    for name in &desired.programs {
        let program = resolver.resolve_program(name, professor.department_id).await?;
        if !linked_programs.insert(program.id) {
            continue;
        }
        let link = ProfessorProgramActiveModel {
            professor_id: Set(professor.id),
            program_id: Set(program.id),
        };
        ProfessorProgramEntity::insert(link)
            .exec_without_returning(conn)
            .await?;
        synced.programs.push(program);
    }

    for name in &desired.research_areas {
        let area = resolver.resolve_research_area(name).await?;
        if !linked_areas.insert(area.id) {
            continue;
        }
        let link = ProfessorResearchAreaActiveModel {
            professor_id: Set(professor.id),
            research_area_id: Set(area.id),
        };
        ProfessorResearchAreaEntity::insert(link)
            .exec_without_returning(conn)
            .await?;
        synced.research_areas.push(area);
    }

    debug!(
        professor_id = professor.id,
        removed_programs,
        removed_areas,
        programs = synced.programs.len(),
        research_areas = synced.research_areas.len(),
        "Associations replaced"
    );

    Ok(synced)
}
