//! Get-or-create for universities, departments, programs and research areas
//!
//! Lookups are exact, case-sensitive matches within the entity's scope.
//! Creation runs inside a savepoint so a uniqueness conflict with a
//! concurrent writer can be rolled back locally and resolved by re-reading
//! the winner's row without aborting the caller's transaction.

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, Set, SqlErr, TransactionTrait,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::db::models::*;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::reconcile::names::require_name;

/// Descriptive fields carried alongside a university name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniversityDetails {
    pub country: String,
    pub state: Option<String>,
    pub city: String,
    pub ranking_usnews: Option<i32>,
}

/// Rows created by a resolver, per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CreatedEntities {
    pub universities: u32,
    pub departments: u32,
    pub programs: u32,
    pub research_areas: u32,
}

impl CreatedEntities {
    pub fn total(&self) -> u32 {
        self.universities + self.departments + self.programs + self.research_areas
    }
}

/// Resolves names to stable ids on a single connection or transaction
pub struct Resolver<'c, C> {
    conn: &'c C,
    created: CreatedEntities,
}

impl<'c, C> Resolver<'c, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(conn: &'c C) -> Self {
        Self {
            conn,
            created: CreatedEntities::default(),
        }
    }

    /// The connection every lookup and insert runs on
    pub fn connection(&self) -> &'c C {
        self.conn
    }

    pub fn created(&self) -> CreatedEntities {
        self.created
    }

    // ===== Universities =====

    /// Find the university with this exact name, creating it from `details`
    /// when absent. An existing row's descriptive fields are left untouched.
    pub async fn resolve_university(
        &mut self,
        name: &str,
        details: &UniversityDetails,
    ) -> Result<University> {
        let name = require_name("university_name", name)?;

        if let Some(existing) = self.find_university(name).await? {
            return Ok(existing);
        }

        let model = UniversityActiveModel {
            name: Set(name.to_string()),
            country: Set(details.country.clone()),
            state: Set(details.state.clone()),
            city: Set(details.city.clone()),
            ranking_usnews: Set(details.ranking_usnews),
            ..Default::default()
        };

        match self.insert_guarded("university", model).await? {
            Some(created) => {
                self.created.universities += 1;
                Ok(created)
            }
            None => self
                .find_university(name)
                .await?
                .ok_or_else(|| lost_race("university", name)),
        }
    }

    /// Overwrite the descriptive fields of an existing university
    pub async fn update_university_details(
        &mut self,
        university: University,
        details: &UniversityDetails,
    ) -> Result<University> {
        if university.country == details.country
            && university.state == details.state
            && university.city == details.city
            && university.ranking_usnews == details.ranking_usnews
        {
            return Ok(university);
        }

        let id = university.id;
        let mut active = university.into_active_model();
        active.country = Set(details.country.clone());
        active.state = Set(details.state.clone());
        active.city = Set(details.city.clone());
        active.ranking_usnews = Set(details.ranking_usnews);

        let updated = active.update(self.conn).await?;
        debug!(university_id = id, "University details updated");
        Ok(updated)
    }

    /// Load a university by id, failing when it does not exist
    pub async fn existing_university(&self, id: i32) -> Result<University> {
        UniversityEntity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::ReferentialIntegrity {
                entity: "university".into(),
                id,
            })
    }

    async fn find_university(&self, name: &str) -> Result<Option<University>> {
        UniversityEntity::find()
            .filter(UniversityColumn::Name.eq(name))
            .one(self.conn)
            .await
            .map_err(Into::into)
    }

    // ===== Departments =====

    /// Find or create the department `name` within `university_id`
    pub async fn resolve_department(&mut self, name: &str, university_id: i32) -> Result<Department> {
        let name = require_name("department_name", name)?;

        if let Some(existing) = self.find_department(name, university_id).await? {
            return Ok(existing);
        }

        self.existing_university(university_id).await?;

        let model = DepartmentActiveModel {
            name: Set(name.to_string()),
            university_id: Set(university_id),
            ..Default::default()
        };

        match self.insert_guarded("department", model).await? {
            Some(created) => {
                self.created.departments += 1;
                Ok(created)
            }
            None => self
                .find_department(name, university_id)
                .await?
                .ok_or_else(|| lost_race("department", name)),
        }
    }

    /// Load a department by id, failing when it does not exist
    pub async fn existing_department(&self, id: i32) -> Result<Department> {
        DepartmentEntity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::ReferentialIntegrity {
                entity: "department".into(),
                id,
            })
    }

    async fn find_department(&self, name: &str, university_id: i32) -> Result<Option<Department>> {
        DepartmentEntity::find()
            .filter(DepartmentColumn::Name.eq(name))
            .filter(DepartmentColumn::UniversityId.eq(university_id))
            .one(self.conn)
            .await
            .map_err(Into::into)
    }

    // ===== Programs =====

    /// Find or create the program `name` within `department_id`
    pub async fn resolve_program(&mut self, name: &str, department_id: i32) -> Result<Program> {
        let name = require_name("program_name", name)?;

        if let Some(existing) = self.find_program(name, department_id).await? {
            return Ok(existing);
        }

        self.existing_department(department_id).await?;

        let model = ProgramActiveModel {
            name: Set(name.to_string()),
            department_id: Set(department_id),
            ..Default::default()
        };

        match self.insert_guarded("program", model).await? {
            Some(created) => {
                self.created.programs += 1;
                Ok(created)
            }
            None => self
                .find_program(name, department_id)
                .await?
                .ok_or_else(|| lost_race("program", name)),
        }
    }

    async fn find_program(&self, name: &str, department_id: i32) -> Result<Option<Program>> {
        ProgramEntity::find()
            .filter(ProgramColumn::Name.eq(name))
            .filter(ProgramColumn::DepartmentId.eq(department_id))
            .one(self.conn)
            .await
            .map_err(Into::into)
    }

    // ===== Research Areas =====

    /// Find or create the globally unique research area `name`
    pub async fn resolve_research_area(&mut self, name: &str) -> Result<ResearchArea> {
        let name = require_name("research_area", name)?;

        if let Some(existing) = self.find_research_area(name).await? {
            return Ok(existing);
        }

        let model = ResearchAreaActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };

        match self.insert_guarded("research_area", model).await? {
            Some(created) => {
                self.created.research_areas += 1;
                Ok(created)
            }
            None => self
                .find_research_area(name)
                .await?
                .ok_or_else(|| lost_race("research_area", name)),
        }
    }

    async fn find_research_area(&self, name: &str) -> Result<Option<ResearchArea>> {
        ResearchAreaEntity::find()
            .filter(ResearchAreaColumn::Name.eq(name))
            .one(self.conn)
            .await
            .map_err(Into::into)
    }

    // ===== Insert with conflict recovery =====

    /// Insert inside a savepoint. `Ok(None)` means another writer already
    /// holds the unique key and the caller should re-read.
    async fn insert_guarded<A>(
        &self,
        kind: &'static str,
        model: A,
    ) -> Result<Option<<A::Entity as EntityTrait>::Model>>
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    {
        let savepoint = self.conn.begin().await?;

        match model.insert(&savepoint).await {
            Ok(row) => {
                savepoint.commit().await?;
                metrics::record_entity_created(kind);
                debug!(kind, "Entity created");
                Ok(Some(row))
            }
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                savepoint.rollback().await?;
                metrics::record_resolve_conflict(kind);
                warn!(kind, "Uniqueness conflict on insert, re-reading existing row");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// The unique key was taken but the holder is not visible to this
/// transaction; reported as a persistence failure
fn lost_race(kind: &str, name: &str) -> AppError {
    AppError::Database(DbErr::RecordNotFound(format!(
        "{kind} {name:?} conflicted on insert but could not be re-read"
    )))
}
