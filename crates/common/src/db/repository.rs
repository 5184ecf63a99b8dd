//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations
//! with proper error handling and transaction support.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::reconcile::{self, ProfessorInput, UpsertOutcome};
use crate::report::{self, ProfessorOverview, ProfessorSummary, ProgramCount};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

/// A professor with its parents and association names
#[derive(Debug, Clone, Serialize)]
pub struct ProfessorDetail {
    pub professor: Professor,
    pub university: Option<University>,
    pub department: Option<Department>,
    pub summary: ProfessorSummary,
}

/// Row counts for the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCounts {
    pub universities: u64,
    pub departments: u64,
    pub programs: u64,
    pub research_areas: u64,
    pub professors: u64,
    pub applicants: u64,
}

/// Professors per hiring status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HiringStatusCount {
    pub status: HiringStatus,
    pub label: &'static str,
    pub count: u64,
}

/// Payload for a new applicant profile
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewApplicant {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    #[validate(email(message = "email must be a valid address"))]
    pub email: String,

    pub undergraduate_institution: Option<String>,

    pub major: Option<String>,

    #[validate(range(min = 0.0, max = 4.0, message = "gpa must be between 0.00 and 4.00"))]
    pub gpa: Option<f64>,

    #[validate(range(min = 0, max = 120, message = "toefl must be between 0 and 120"))]
    pub toefl: Option<i32>,

    #[validate(range(min = 0.0, max = 9.0, message = "ielts must be between 0.0 and 9.0"))]
    pub ielts: Option<f64>,

    #[validate(range(min = 260, max = 340, message = "gre must be between 260 and 340"))]
    pub gre: Option<i32>,

    pub research_interests: Option<String>,

    pub notes: Option<String>,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Professor Operations
    // ========================================================================

    /// Add or edit a professor, reconciling all referenced entities
    pub async fn upsert_professor(&self, input: ProfessorInput) -> Result<UpsertOutcome> {
        reconcile::upsert_professor(self.conn(), input).await
    }

    /// Find professor by ID
    pub async fn find_professor(&self, id: i32) -> Result<Option<Professor>> {
        ProfessorEntity::find_by_id(id)
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Professor with university, department and association names
    pub async fn professor_detail(&self, id: i32) -> Result<ProfessorDetail> {
        let professor = self
            .find_professor(id)
            .await?
            .ok_or(AppError::ProfessorNotFound { id })?;

        let university = UniversityEntity::find_by_id(professor.university_id)
            .one(self.conn())
            .await?;
        let department = DepartmentEntity::find_by_id(professor.department_id)
            .one(self.conn())
            .await?;
        let summary = report::professor_summary(self.conn(), &professor).await?;

        Ok(ProfessorDetail {
            professor,
            university,
            department,
            summary,
        })
    }

    /// All professors for the listing view
    pub async fn professor_overviews(&self) -> Result<Vec<ProfessorOverview>> {
        report::professor_overviews(self.conn()).await
    }

    /// Delete a professor and its association rows.
    ///
    /// Returns false when no such professor exists.
    pub async fn delete_professor(&self, id: i32) -> Result<bool> {
        let txn = self.conn().begin().await?;

        if ProfessorEntity::find_by_id(id).one(&txn).await?.is_none() {
            txn.rollback().await?;
            return Ok(false);
        }

        ProfessorProgramEntity::delete_many()
            .filter(ProfessorProgramColumn::ProfessorId.eq(id))
            .exec(&txn)
            .await?;
        ProfessorResearchAreaEntity::delete_many()
            .filter(ProfessorResearchAreaColumn::ProfessorId.eq(id))
            .exec(&txn)
            .await?;
        let result = ProfessorEntity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        metrics::record_professor_deleted();
        info!(professor_id = id, "Professor deleted");

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Catalog Operations
    // ========================================================================

    pub async fn list_universities(&self) -> Result<Vec<University>> {
        UniversityEntity::find()
            .order_by_asc(UniversityColumn::Name)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    pub async fn list_departments(&self) -> Result<Vec<Department>> {
        DepartmentEntity::find()
            .order_by_asc(DepartmentColumn::UniversityId)
            .order_by_asc(DepartmentColumn::Name)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    pub async fn list_programs(&self) -> Result<Vec<Program>> {
        ProgramEntity::find()
            .order_by_asc(ProgramColumn::DepartmentId)
            .order_by_asc(ProgramColumn::Name)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    pub async fn list_research_areas(&self) -> Result<Vec<ResearchArea>> {
        ResearchAreaEntity::find()
            .order_by_asc(ResearchAreaColumn::Name)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Programs with distinct professor counts
    pub async fn programs_with_counts(&self) -> Result<Vec<ProgramCount>> {
        report::programs_with_counts(self.conn()).await
    }

    // ========================================================================
    // Dashboard Operations
    // ========================================================================

    /// Row count of every entity table
    pub async fn table_counts(&self) -> Result<TableCounts> {
        let db = self.conn();

        Ok(TableCounts {
            universities: UniversityEntity::find().count(db).await?,
            departments: DepartmentEntity::find().count(db).await?,
            programs: ProgramEntity::find().count(db).await?,
            research_areas: ResearchAreaEntity::find().count(db).await?,
            professors: ProfessorEntity::find().count(db).await?,
            applicants: ApplicantEntity::find().count(db).await?,
        })
    }

    /// Professor count for each hiring status, zero included
    pub async fn hiring_status_counts(&self) -> Result<Vec<HiringStatusCount>> {
        let mut counts = Vec::with_capacity(HiringStatus::ALL.len());

        for status in HiringStatus::ALL {
            let count = ProfessorEntity::find()
                .filter(ProfessorColumn::HiringStatus.eq(status))
                .count(self.conn())
                .await?;
            counts.push(HiringStatusCount {
                status,
                label: status.label(),
                count,
            });
        }

        Ok(counts)
    }

    // ========================================================================
    // Applicant Operations
    // ========================================================================

    /// Validate and store a new applicant profile
    pub async fn create_applicant(&self, new: NewApplicant) -> Result<Applicant> {
        new.validate()?;

        let applicant = ApplicantActiveModel {
            name: Set(new.name.trim().to_string()),
            email: Set(new.email.trim().to_string()),
            undergraduate_institution: Set(reconcile::optional_text(new.undergraduate_institution)),
            major: Set(reconcile::optional_text(new.major)),
            gpa: Set(new.gpa),
            toefl: Set(new.toefl),
            ielts: Set(new.ielts),
            gre: Set(new.gre),
            research_interests: Set(reconcile::optional_text(new.research_interests)),
            notes: Set(reconcile::optional_text(new.notes)),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let applicant = applicant.insert(self.conn()).await?;

        metrics::record_applicant_created();
        info!(applicant_id = applicant.id, "Applicant created");

        Ok(applicant)
    }

    /// Newest first
    pub async fn list_applicants(&self) -> Result<Vec<Applicant>> {
        ApplicantEntity::find()
            .order_by_desc(ApplicantColumn::CreatedAt)
            .order_by_desc(ApplicantColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    pub async fn find_applicant(&self, id: i32) -> Result<Option<Applicant>> {
        ApplicantEntity::find_by_id(id)
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Returns false when no such applicant exists
    pub async fn delete_applicant(&self, id: i32) -> Result<bool> {
        let result = ApplicantEntity::delete_by_id(id).exec(self.conn()).await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{
        DepartmentRef, DesiredAssociations, UniversityDetails, UniversityInput, UniversityRef,
    };

    async fn repo() -> Repository {
        Repository::new(DbPool::in_memory().await.unwrap())
    }

    fn professor(name: &str, status: HiringStatus) -> ProfessorInput {
        ProfessorInput {
            professor_id: None,
            name: name.into(),
            title: "Professor".into(),
            email: "prof@mit.edu".into(),
            university: UniversityRef::Named(UniversityInput {
                name: "MIT".into(),
                details: UniversityDetails::default(),
            }),
            department: DepartmentRef::Named("EECS".into()),
            personal_website: None,
            lab_group_name: None,
            lab_website: None,
            hiring_status: status,
            contact_through: ContactMethod::Form,
            form_link: Some("https://example.edu/form".into()),
            notes: None,
            associations: DesiredAssociations::from_lists("PhD", "AI"),
        }
    }

    fn applicant() -> NewApplicant {
        NewApplicant {
            name: "Sam".into(),
            email: "sam@example.com".into(),
            gpa: Some(3.9),
            toefl: Some(110),
            gre: Some(330),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_delete_professor_removes_links_only() {
        let repo = repo().await;
        let outcome = repo.upsert_professor(professor("Ada", HiringStatus::Hiring)).await.unwrap();

        assert!(repo.delete_professor(outcome.professor.id).await.unwrap());
        assert!(repo.find_professor(outcome.professor.id).await.unwrap().is_none());
        assert_eq!(ProfessorProgramEntity::find().count(repo.conn()).await.unwrap(), 0);
        assert_eq!(ProfessorResearchAreaEntity::find().count(repo.conn()).await.unwrap(), 0);

        // Programs and research areas outlive the professor
        let counts = repo.table_counts().await.unwrap();
        assert_eq!(counts.programs, 1);
        assert_eq!(counts.research_areas, 1);
        assert_eq!(counts.professors, 0);
    }

    #[tokio::test]
    async fn test_delete_unknown_professor() {
        let repo = repo().await;
        assert!(!repo.delete_professor(404).await.unwrap());
    }

    #[tokio::test]
    async fn test_professor_detail() {
        let repo = repo().await;
        let outcome = repo.upsert_professor(professor("Ada", HiringStatus::Hiring)).await.unwrap();

        let detail = repo.professor_detail(outcome.professor.id).await.unwrap();
        assert_eq!(detail.university.map(|u| u.name), Some("MIT".to_string()));
        assert_eq!(detail.summary.programs, vec!["PhD"]);

        let err = repo.professor_detail(999).await.unwrap_err();
        assert!(matches!(err, AppError::ProfessorNotFound { id: 999 }));
    }

    #[tokio::test]
    async fn test_hiring_status_counts_include_zero() {
        let repo = repo().await;
        repo.upsert_professor(professor("Ada", HiringStatus::Hiring)).await.unwrap();
        repo.upsert_professor(professor("Alan", HiringStatus::Hiring)).await.unwrap();

        let counts = repo.hiring_status_counts().await.unwrap();
        let view: Vec<(&str, u64)> = counts.iter().map(|c| (c.label, c.count)).collect();
        assert_eq!(view, vec![("Not Hiring", 0), ("Hiring", 2), ("Unavailable", 0)]);
    }

    #[tokio::test]
    async fn test_applicant_lifecycle() {
        let repo = repo().await;

        let created = repo.create_applicant(applicant()).await.unwrap();
        assert_eq!(created.gre, Some(330));
        assert_eq!(repo.list_applicants().await.unwrap().len(), 1);
        assert!(repo.find_applicant(created.id).await.unwrap().is_some());

        assert!(repo.delete_applicant(created.id).await.unwrap());
        assert!(!repo.delete_applicant(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_applicant_score_ranges() {
        let repo = repo().await;

        for bad in [
            NewApplicant { gpa: Some(4.5), ..applicant() },
            NewApplicant { toefl: Some(121), ..applicant() },
            NewApplicant { ielts: Some(9.5), ..applicant() },
            NewApplicant { gre: Some(259), ..applicant() },
            NewApplicant { name: String::new(), ..applicant() },
        ] {
            let err = repo.create_applicant(bad).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }), "unexpected {err:?}");
        }

        assert!(repo.list_applicants().await.unwrap().is_empty());
    }
}
