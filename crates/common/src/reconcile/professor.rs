//! Professor add/edit as one atomic reconciliation
//!
//! University first, then the department under that university, then the
//! professor row, then a full replace of its associations. Any failure
//! rolls the whole transaction back.

use std::time::Instant;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseTransaction, DbBackend, EntityTrait,
    IntoActiveModel, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::db::models::*;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::reconcile::associations::{sync_associations, DesiredAssociations};
use crate::reconcile::resolver::{CreatedEntities, Resolver, UniversityDetails};

/// A university given by name, with the details used when it must be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniversityInput {
    pub name: String,
    pub details: UniversityDetails,
}

/// How the professor's university is identified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniversityRef {
    Named(UniversityInput),
    Existing(i32),
}

/// How the professor's department is identified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepartmentRef {
    Named(String),
    Existing(i32),
}

/// Everything needed to add or edit one professor
#[derive(Debug, Clone)]
pub struct ProfessorInput {
    /// `Some` edits that professor, `None` adds a new one
    pub professor_id: Option<i32>,
    pub name: String,
    pub title: String,
    pub email: String,
    pub university: UniversityRef,
    pub department: DepartmentRef,
    pub personal_website: Option<String>,
    pub lab_group_name: Option<String>,
    pub lab_website: Option<String>,
    pub hiring_status: HiringStatus,
    pub contact_through: ContactMethod,
    pub form_link: Option<String>,
    pub notes: Option<String>,
    pub associations: DesiredAssociations,
}

impl ProfessorInput {
    /// Required-field checks that must pass before anything is written
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("name", &self.name), ("title", &self.title), ("email", &self.email)] {
            if value.trim().is_empty() {
                return Err(AppError::MissingField { field: field.to_string() });
            }
        }

        if let UniversityRef::Named(university) = &self.university {
            if university.name.trim().is_empty() {
                return Err(AppError::MissingField { field: "university_name".into() });
            }
        }

        if let DepartmentRef::Named(name) = &self.department {
            if name.trim().is_empty() {
                return Err(AppError::MissingField { field: "department_name".into() });
            }
        }

        Ok(())
    }

    fn mode(&self) -> &'static str {
        if self.professor_id.is_some() { "edit" } else { "add" }
    }
}

/// Result of a committed upsert
#[derive(Debug, Clone, Serialize)]
pub struct UpsertOutcome {
    pub professor: Professor,
    pub university: University,
    pub department: Department,
    /// True when a new professor row was inserted
    pub created: bool,
    pub entities_created: CreatedEntities,
    pub programs: Vec<String>,
    pub research_areas: Vec<String>,
}

/// Add or edit a professor in a single transaction
#[instrument(skip_all, fields(mode = input.mode(), professor_id = ?input.professor_id))]
pub async fn upsert_professor<C>(db: &C, input: ProfessorInput) -> Result<UpsertOutcome>
where
    C: TransactionTrait,
{
    input.validate()?;

    let start = Instant::now();
    let mode = input.mode();
    let txn = db.begin().await?;

    let result = match claim_write_lock(&txn).await {
        Ok(()) => upsert_in_transaction(&txn, input).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(outcome) => {
            txn.commit().await?;

            metrics::record_professor_upsert(start.elapsed().as_secs_f64(), mode);
            info!(
                professor_id = outcome.professor.id,
                university_id = outcome.university.id,
                department_id = outcome.department.id,
                created = outcome.created,
                entities_created = outcome.entities_created.total(),
                programs = outcome.programs.len(),
                research_areas = outcome.research_areas.len(),
                "Professor saved"
            );

            Ok(outcome)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

/// Take SQLite's write lock before the first read. A deferred transaction
/// that has already read cannot wait for another writer and fails with
/// `SQLITE_BUSY`; one that starts by writing waits on the busy timeout.
async fn claim_write_lock(txn: &DatabaseTransaction) -> Result<()> {
    if txn.get_database_backend() == DbBackend::Sqlite {
        txn.execute_unprepared("UPDATE university SET id = id WHERE 0")
            .await?;
    }
    Ok(())
}

async fn upsert_in_transaction(txn: &DatabaseTransaction, input: ProfessorInput) -> Result<UpsertOutcome> {
    let existing = match input.professor_id {
        Some(id) => Some(
            ProfessorEntity::find_by_id(id)
                .one(txn)
                .await?
                .ok_or(AppError::ProfessorNotFound { id })?,
        ),
        None => None,
    };

    let mut resolver = Resolver::new(txn);

    let university = match &input.university {
        UniversityRef::Named(named) => {
            let resolved = resolver.resolve_university(named.name.trim(), &named.details).await?;
            match &existing {
                // Same university as before: the submitted details win
                Some(current) if current.university_id == resolved.id => {
                    resolver.update_university_details(resolved, &named.details).await?
                }
                _ => resolved,
            }
        }
        UniversityRef::Existing(id) => resolver.existing_university(*id).await?,
    };

    let department = match &input.department {
        DepartmentRef::Named(name) => resolver.resolve_department(name.trim(), university.id).await?,
        DepartmentRef::Existing(id) => {
            let department = resolver.existing_department(*id).await?;
            if department.university_id != university.id {
                return Err(AppError::invalid_field(
                    "department_id",
                    format!(
                        "department {} does not belong to university {}",
                        department.id, university.id
                    ),
                ));
            }
            department
        }
    };

    let now = Utc::now();
    let created = existing.is_none();

    let professor = match existing {
        Some(current) => {
            let mut active = current.into_active_model();
            apply_fields(&mut active, &input, university.id, department.id, now);
            active.update(txn).await?
        }
        None => {
            let mut active = ProfessorActiveModel {
                created_at: Set(now),
                ..Default::default()
            };
            apply_fields(&mut active, &input, university.id, department.id, now);
            active.insert(txn).await?
        }
    };

    let synced = sync_associations(&mut resolver, &professor, &input.associations).await?;

    Ok(UpsertOutcome {
        programs: synced.programs.into_iter().map(|p| p.name).collect(),
        research_areas: synced.research_areas.into_iter().map(|a| a.name).collect(),
        entities_created: resolver.created(),
        professor,
        university,
        department,
        created,
    })
}

fn apply_fields(
    active: &mut ProfessorActiveModel,
    input: &ProfessorInput,
    university_id: i32,
    department_id: i32,
    now: DateTime<Utc>,
) {
    active.name = Set(input.name.trim().to_string());
    active.title = Set(input.title.trim().to_string());
    active.email = Set(input.email.trim().to_string());
    active.university_id = Set(university_id);
    active.department_id = Set(department_id);
    active.personal_website = Set(input.personal_website.clone());
    active.lab_group_name = Set(input.lab_group_name.clone());
    active.lab_website = Set(input.lab_website.clone());
    active.hiring_status = Set(input.hiring_status);
    active.contact_through = Set(input.contact_through);
    active.form_link = Set(input.form_link.clone());
    active.notes = Set(input.notes.clone());
    active.updated_at = Set(now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbPool;
    use sea_orm::{ModelTrait, PaginatorTrait};

    fn input(programs: &str, areas: &str) -> ProfessorInput {
        ProfessorInput {
            professor_id: None,
            name: "Ada Lovelace".into(),
            title: "Associate Professor".into(),
            email: "ada@mit.edu".into(),
            university: UniversityRef::Named(UniversityInput {
                name: "MIT".into(),
                details: UniversityDetails {
                    country: "USA".into(),
                    state: Some("MA".into()),
                    city: "Cambridge".into(),
                    ranking_usnews: Some(2),
                },
            }),
            department: DepartmentRef::Named("EECS".into()),
            personal_website: None,
            lab_group_name: Some("CSAIL".into()),
            lab_website: None,
            hiring_status: HiringStatus::Hiring,
            contact_through: ContactMethod::Email,
            form_link: None,
            notes: None,
            associations: DesiredAssociations::from_lists(programs, areas),
        }
    }

    #[tokio::test]
    async fn test_add_then_edit_end_to_end() {
        let pool = DbPool::in_memory().await.unwrap();
        let db = pool.conn();

        let added = upsert_professor(db, input("PhD CS, Robotics", "AI")).await.unwrap();
        assert!(added.created);
        assert_eq!(added.entities_created.universities, 1);
        assert_eq!(added.entities_created.departments, 1);
        assert_eq!(added.entities_created.programs, 2);
        assert_eq!(added.programs, vec!["PhD CS", "Robotics"]);

        let mut edit = input("PhD CS", "AI, Vision");
        edit.professor_id = Some(added.professor.id);
        let edited = upsert_professor(db, edit).await.unwrap();

        assert!(!edited.created);
        assert_eq!(edited.professor.id, added.professor.id);
        assert_eq!(edited.university.id, added.university.id);
        assert_eq!(edited.entities_created.research_areas, 1);
        assert_eq!(edited.programs, vec!["PhD CS"]);
        assert_eq!(edited.research_areas, vec!["AI", "Vision"]);

        // The Robotics program survives its last association being removed
        assert_eq!(ProgramEntity::find().count(db).await.unwrap(), 2);
        let linked = edited.professor.find_related(ProgramEntity).all(db).await.unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(UniversityEntity::find().count(db).await.unwrap(), 1);
        assert_eq!(DepartmentEntity::find().count(db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_repeated_submission_is_idempotent() {
        let pool = DbPool::in_memory().await.unwrap();
        let db = pool.conn();

        let first = upsert_professor(db, input("PhD CS", "AI")).await.unwrap();
        let mut again = input("PhD CS", "AI");
        again.professor_id = Some(first.professor.id);
        let second = upsert_professor(db, again).await.unwrap();

        assert_eq!(second.entities_created.total(), 0);
        assert_eq!(ProfessorProgramEntity::find().count(db).await.unwrap(), 1);
        assert_eq!(ProfessorResearchAreaEntity::find().count(db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_edit_with_same_university_overwrites_details() {
        let pool = DbPool::in_memory().await.unwrap();
        let db = pool.conn();

        let added = upsert_professor(db, input("", "")).await.unwrap();

        let mut edit = input("", "");
        edit.professor_id = Some(added.professor.id);
        if let UniversityRef::Named(university) = &mut edit.university {
            university.details.ranking_usnews = Some(1);
            university.details.city = "Boston".into();
        }
        let edited = upsert_professor(db, edit).await.unwrap();

        assert_eq!(edited.university.ranking_usnews, Some(1));
        assert_eq!(edited.university.city, "Boston");
    }

    #[tokio::test]
    async fn test_new_professor_does_not_overwrite_existing_university() {
        let pool = DbPool::in_memory().await.unwrap();
        let db = pool.conn();

        upsert_professor(db, input("", "")).await.unwrap();

        let mut other = input("", "");
        other.name = "Grace Hopper".into();
        other.email = "grace@mit.edu".into();
        if let UniversityRef::Named(university) = &mut other.university {
            university.details.city = "Somewhere Else".into();
        }
        let outcome = upsert_professor(db, other).await.unwrap();

        assert_eq!(outcome.university.city, "Cambridge");
    }

    #[tokio::test]
    async fn test_university_change_rescopes_department() {
        let pool = DbPool::in_memory().await.unwrap();
        let db = pool.conn();

        let added = upsert_professor(db, input("PhD", "")).await.unwrap();

        let mut moved = input("PhD", "");
        moved.professor_id = Some(added.professor.id);
        moved.university = UniversityRef::Named(UniversityInput {
            name: "CMU".into(),
            details: UniversityDetails::default(),
        });
        let outcome = upsert_professor(db, moved).await.unwrap();

        assert_ne!(outcome.department.id, added.department.id);
        assert_eq!(outcome.department.university_id, outcome.university.id);
        assert_eq!(outcome.entities_created.programs, 1);
    }

    #[tokio::test]
    async fn test_failure_rolls_back_everything() {
        let pool = DbPool::in_memory().await.unwrap();
        let db = pool.conn();

        let mut bad = input("PhD", "AI");
        bad.department = DepartmentRef::Existing(4242);
        let err = upsert_professor(db, bad).await.unwrap_err();

        assert!(matches!(err, AppError::ReferentialIntegrity { id: 4242, .. }));
        // The university resolved earlier in the transaction is gone too
        assert_eq!(UniversityEntity::find().count(db).await.unwrap(), 0);
        assert_eq!(ProfessorEntity::find().count(db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_professor_id() {
        let pool = DbPool::in_memory().await.unwrap();
        let mut edit = input("", "");
        edit.professor_id = Some(77);

        let err = upsert_professor(pool.conn(), edit).await.unwrap_err();
        assert!(matches!(err, AppError::ProfessorNotFound { id: 77 }));
    }

    #[tokio::test]
    async fn test_missing_required_field() {
        let pool = DbPool::in_memory().await.unwrap();
        let mut blank = input("", "");
        blank.email = "  ".into();

        let err = upsert_professor(pool.conn(), blank).await.unwrap_err();
        assert!(matches!(err, AppError::MissingField { ref field } if field == "email"));
    }

    #[tokio::test]
    async fn test_existing_department_must_match_university() {
        let pool = DbPool::in_memory().await.unwrap();
        let db = pool.conn();

        let mit = upsert_professor(db, input("", "")).await.unwrap();

        let mut other = input("", "");
        other.university = UniversityRef::Named(UniversityInput {
            name: "CMU".into(),
            details: UniversityDetails::default(),
        });
        other.department = DepartmentRef::Existing(mit.department.id);

        let err = upsert_professor(db, other).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(ProfessorEntity::find().count(db).await.unwrap(), 1);
    }
}
