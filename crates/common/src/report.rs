//! Aggregate read views
//!
//! Shared by the web listings and the dump utility. Ordering is done in
//! Rust on the stored strings so every backend sorts the same way.

use std::collections::{BTreeSet, HashMap};

use sea_orm::sea_query::Expr;
use sea_orm::{
    ConnectionTrait, EntityTrait, FromQueryResult, JoinType, ModelTrait, QuerySelect,
    RelationTrait,
};
use serde::Serialize;
use tracing::warn;

use crate::db::models::*;
use crate::errors::Result;

/// One program with its parents and the number of distinct professors linked to it
#[derive(Debug, Clone, Serialize)]
pub struct ProgramCount {
    pub program: Program,
    pub department: Department,
    pub university: University,
    pub professor_count: i64,
}

/// Sorted, de-duplicated association names of one professor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfessorSummary {
    pub programs: Vec<String>,
    pub research_areas: Vec<String>,
}

impl ProfessorSummary {
    fn from_names(
        programs: impl IntoIterator<Item = String>,
        research_areas: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            programs: programs.into_iter().collect::<BTreeSet<_>>().into_iter().collect(),
            research_areas: research_areas
                .into_iter()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        }
    }
}

/// A professor with everything the listing shows about them
#[derive(Debug, Clone, Serialize)]
pub struct ProfessorOverview {
    pub professor: Professor,
    pub university: Option<University>,
    pub department: Option<Department>,
    pub summary: ProfessorSummary,
}

#[derive(Debug, FromQueryResult)]
struct ProgramCountRow {
    program_id: i32,
    professor_count: i64,
}

/// Every program with its department, university and distinct professor
/// count (zero when unlinked), ordered by university, department and
/// program name.
pub async fn programs_with_counts<C: ConnectionTrait>(db: &C) -> Result<Vec<ProgramCount>> {
    let counts: HashMap<i32, i64> = ProgramEntity::find()
        .select_only()
        .column_as(ProgramColumn::Id, "program_id")
        .column_as(
            Expr::cust("COUNT(DISTINCT professor_programs.professor_id)"),
            "professor_count",
        )
        .join(JoinType::LeftJoin, ProgramRelation::ProfessorPrograms.def())
        .group_by(ProgramColumn::Id)
        .into_model::<ProgramCountRow>()
        .all(db)
        .await?
        .into_iter()
        .map(|row| (row.program_id, row.professor_count))
        .collect();

    programs_with_parents(db, &counts).await
}

/// Programs with their parents and every count at zero, for databases that
/// have no `professor_programs` table
pub async fn programs_without_links<C: ConnectionTrait>(db: &C) -> Result<Vec<ProgramCount>> {
    programs_with_parents(db, &HashMap::new()).await
}

async fn programs_with_parents<C: ConnectionTrait>(
    db: &C,
    counts: &HashMap<i32, i64>,
) -> Result<Vec<ProgramCount>> {
    let universities = by_id(UniversityEntity::find().all(db).await?, |u| u.id);
    let departments = by_id(DepartmentEntity::find().all(db).await?, |d| d.id);

    let programs = ProgramEntity::find().all(db).await?;
    let mut rows = Vec::with_capacity(programs.len());
    for program in programs {
        let Some(department) = departments.get(&program.department_id) else {
            warn!(program_id = program.id, "Program references a missing department");
            continue;
        };
        let Some(university) = universities.get(&department.university_id) else {
            warn!(department_id = department.id, "Department references a missing university");
            continue;
        };

        rows.push(ProgramCount {
            professor_count: counts.get(&program.id).copied().unwrap_or(0),
            department: department.clone(),
            university: university.clone(),
            program,
        });
    }

    rows.sort_by(|a, b| {
        (&a.university.name, &a.department.name, &a.program.name)
            .cmp(&(&b.university.name, &b.department.name, &b.program.name))
    });

    Ok(rows)
}

/// Program and research area names linked to one professor
pub async fn professor_summary<C: ConnectionTrait>(
    db: &C,
    professor: &Professor,
) -> Result<ProfessorSummary> {
    let programs = professor.find_related(ProgramEntity).all(db).await?;
    let research_areas = professor.find_related(ResearchAreaEntity).all(db).await?;

    Ok(ProfessorSummary::from_names(
        programs.into_iter().map(|p| p.name),
        research_areas.into_iter().map(|a| a.name),
    ))
}

/// Every professor with university, department and summary, ordered by name
pub async fn professor_overviews<C: ConnectionTrait>(db: &C) -> Result<Vec<ProfessorOverview>> {
    let universities = by_id(UniversityEntity::find().all(db).await?, |u| u.id);
    let departments = by_id(DepartmentEntity::find().all(db).await?, |d| d.id);

    let mut programs: HashMap<i32, Vec<String>> = HashMap::new();
    for (link, program) in ProfessorProgramEntity::find()
        .find_also_related(ProgramEntity)
        .all(db)
        .await?
    {
        if let Some(program) = program {
            programs.entry(link.professor_id).or_default().push(program.name);
        }
    }

    let mut research_areas: HashMap<i32, Vec<String>> = HashMap::new();
    for (link, area) in ProfessorResearchAreaEntity::find()
        .find_also_related(ResearchAreaEntity)
        .all(db)
        .await?
    {
        if let Some(area) = area {
            research_areas.entry(link.professor_id).or_default().push(area.name);
        }
    }

    let mut professors = ProfessorEntity::find().all(db).await?;
    professors.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

    Ok(professors
        .into_iter()
        .map(|professor| ProfessorOverview {
            university: universities.get(&professor.university_id).cloned(),
            department: departments.get(&professor.department_id).cloned(),
            summary: ProfessorSummary::from_names(
                programs.remove(&professor.id).unwrap_or_default(),
                research_areas.remove(&professor.id).unwrap_or_default(),
            ),
            professor,
        })
        .collect())
}

fn by_id<T>(rows: Vec<T>, key: impl Fn(&T) -> i32) -> HashMap<i32, T> {
    rows.into_iter().map(|row| (key(&row), row)).collect()
}
