//! Professor handlers
//!
//! The add/edit submission is form-encoded and redirects back to the
//! listing; everything else is JSON.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::AppState;
use phdtrack_common::{
    db::{models::*, ProfessorDetail},
    errors::{AppError, Result},
    reconcile::{
        optional_text, DepartmentRef, DesiredAssociations, ProfessorInput, UniversityDetails,
        UniversityInput, UniversityRef,
    },
    report::ProfessorOverview,
};

/// Fields posted by the professor add/edit form
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ProfessorForm {
    /// Hidden field; present and non-empty on edit
    pub professor_id: Option<String>,

    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,

    pub university_name: Option<String>,
    pub university_id: Option<String>,
    pub university_country: Option<String>,
    pub university_state: Option<String>,
    pub university_city: Option<String>,
    pub university_ranking: Option<String>,

    pub department_name: Option<String>,
    pub department_id: Option<String>,

    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,

    pub personal_website: Option<String>,
    pub lab_group_name: Option<String>,
    pub lab_website: Option<String>,
    pub hiring_status: String,
    pub contact_through: String,
    pub form_link: Option<String>,
    pub notes: Option<String>,
    pub program_names: Option<String>,
    pub research_area_names: Option<String>,
}

impl TryFrom<ProfessorForm> for ProfessorInput {
    type Error = AppError;

    fn try_from(form: ProfessorForm) -> Result<Self> {
        form.validate()?;

        let professor_id = parse_id("professor_id", form.professor_id.as_deref())?;

        let university = match optional_text(form.university_name) {
            Some(name) => UniversityRef::Named(UniversityInput {
                name,
                details: UniversityDetails {
                    country: optional_text(form.university_country).unwrap_or_default(),
                    state: optional_text(form.university_state),
                    city: optional_text(form.university_city).unwrap_or_default(),
                    ranking_usnews: parse_ranking(form.university_ranking.as_deref())?,
                },
            }),
            None => match parse_id("university_id", form.university_id.as_deref())? {
                Some(id) => UniversityRef::Existing(id),
                None => return Err(AppError::MissingField { field: "university_name".into() }),
            },
        };

        let department = match optional_text(form.department_name) {
            Some(name) => DepartmentRef::Named(name),
            None => match parse_id("department_id", form.department_id.as_deref())? {
                Some(id) => DepartmentRef::Existing(id),
                None => return Err(AppError::MissingField { field: "department_name".into() }),
            },
        };

        let hiring_status = required_code("hiring_status", &form.hiring_status)?.parse::<HiringStatus>()?;
        let contact_through = required_code("contact_through", &form.contact_through)?.parse::<ContactMethod>()?;

        Ok(ProfessorInput {
            professor_id,
            name: form.name,
            title: form.title,
            email: form.email,
            university,
            department,
            personal_website: optional_text(form.personal_website),
            lab_group_name: optional_text(form.lab_group_name),
            lab_website: optional_text(form.lab_website),
            hiring_status,
            contact_through,
            form_link: optional_text(form.form_link),
            notes: optional_text(form.notes),
            associations: DesiredAssociations::from_lists(
                form.program_names.as_deref().unwrap_or_default(),
                form.research_area_names.as_deref().unwrap_or_default(),
            ),
        })
    }
}

/// Blank means absent; anything else must be an integer
fn parse_ranking(raw: Option<&str>) -> Result<Option<i32>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => value.parse::<i32>().map(Some).map_err(|_| {
            AppError::invalid_field(
                "university_ranking",
                format!("university_ranking must be an integer, got {value:?}"),
            )
        }),
    }
}

fn parse_id(field: &str, raw: Option<&str>) -> Result<Option<i32>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse::<i32>()
            .map(Some)
            .map_err(|_| AppError::invalid_field(field, format!("{field} must be an integer id"))),
    }
}

fn required_code<'a>(field: &str, raw: &'a str) -> Result<&'a str> {
    let code = raw.trim();
    if code.is_empty() {
        return Err(AppError::MissingField { field: field.to_string() });
    }
    Ok(code)
}

/// Flat record used to populate the edit form
#[derive(Debug, Serialize)]
pub struct ProfessorRecord {
    pub id: i32,
    pub name: String,
    pub title: String,
    pub university_name: String,
    pub university_country: String,
    pub university_state: String,
    pub university_city: String,
    pub university_ranking: Option<i32>,
    pub department_name: String,
    pub email: String,
    pub personal_website: String,
    pub lab_group_name: String,
    pub lab_website: String,
    pub hiring_status: &'static str,
    pub contact_through: &'static str,
    pub form_link: String,
    pub notes: String,
    pub programs: Vec<String>,
    pub research_areas: Vec<String>,
}

impl From<ProfessorDetail> for ProfessorRecord {
    fn from(detail: ProfessorDetail) -> Self {
        let ProfessorDetail {
            professor,
            university,
            department,
            summary,
        } = detail;

        let (university_name, university_country, university_state, university_city, university_ranking) =
            match university {
                Some(u) => (u.name, u.country, u.state.unwrap_or_default(), u.city, u.ranking_usnews),
                None => Default::default(),
            };

        Self {
            id: professor.id,
            name: professor.name,
            title: professor.title,
            university_name,
            university_country,
            university_state,
            university_city,
            university_ranking,
            department_name: department.map(|d| d.name).unwrap_or_default(),
            email: professor.email,
            personal_website: professor.personal_website.unwrap_or_default(),
            lab_group_name: professor.lab_group_name.unwrap_or_default(),
            lab_website: professor.lab_website.unwrap_or_default(),
            hiring_status: professor.hiring_status.code(),
            contact_through: professor.contact_through.code(),
            form_link: professor.form_link.unwrap_or_default(),
            notes: professor.notes.unwrap_or_default(),
            programs: summary.programs,
            research_areas: summary.research_areas,
        }
    }
}

/// One row of the professor listing
#[derive(Debug, Serialize)]
pub struct ProfessorListItem {
    pub id: i32,
    pub name: String,
    pub title: String,
    pub email: String,
    pub university: Option<String>,
    pub department: Option<String>,
    pub lab_group_name: Option<String>,
    pub hiring_status: HiringStatus,
    pub hiring_status_label: &'static str,
    pub contact_through: ContactMethod,
    pub contact_through_label: &'static str,
    pub form_link: Option<String>,
    pub programs: Vec<String>,
    pub research_areas: Vec<String>,
    pub updated_at: String,
}

impl From<ProfessorOverview> for ProfessorListItem {
    fn from(overview: ProfessorOverview) -> Self {
        let professor = overview.professor;
        Self {
            id: professor.id,
            name: professor.name,
            title: professor.title,
            email: professor.email,
            university: overview.university.map(|u| u.name),
            department: overview.department.map(|d| d.name),
            lab_group_name: professor.lab_group_name,
            hiring_status: professor.hiring_status,
            hiring_status_label: professor.hiring_status.label(),
            contact_through: professor.contact_through,
            contact_through_label: professor.contact_through.label(),
            form_link: professor.form_link,
            programs: overview.summary.programs,
            research_areas: overview.summary.research_areas,
            updated_at: professor.updated_at.to_rfc3339(),
        }
    }
}

/// All professors with university, department and association names
pub async fn list_professors(State(state): State<AppState>) -> Result<Json<Vec<ProfessorListItem>>> {
    let overviews = state.repo().professor_overviews().await?;
    Ok(Json(overviews.into_iter().map(ProfessorListItem::from).collect()))
}

/// Add or edit a professor from the form submission
pub async fn submit_professor(
    State(state): State<AppState>,
    Form(form): Form<ProfessorForm>,
) -> Result<Redirect> {
    let input = ProfessorInput::try_from(form)?;
    let outcome = state.repo().upsert_professor(input).await?;

    tracing::info!(
        professor_id = outcome.professor.id,
        created = outcome.created,
        "Professor form processed"
    );

    Ok(Redirect::to("/professors"))
}

/// Flat JSON record for one professor
pub async fn get_professor(
    State(state): State<AppState>,
    Path(professor_id): Path<i32>,
) -> Result<Json<ProfessorRecord>> {
    let detail = state.repo().professor_detail(professor_id).await?;
    Ok(Json(ProfessorRecord::from(detail)))
}

/// Delete a professor; persistence failures answer `{"error": "<message>"}`
pub async fn delete_professor(
    State(state): State<AppState>,
    Path(professor_id): Path<i32>,
) -> Response {
    match state.repo().delete_professor(professor_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => AppError::ProfessorNotFound { id: professor_id }.into_response(),
        Err(err) => {
            tracing::error!(professor_id, error = %err, "Failed to delete professor");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}
