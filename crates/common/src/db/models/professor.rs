//! Professor entity and its status enumerations

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a professor is taking students
///
/// Stored as a short code; `label()` is what people read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum HiringStatus {
    #[sea_orm(string_value = "not_hiring")]
    NotHiring,
    #[sea_orm(string_value = "hiring")]
    Hiring,
    #[sea_orm(string_value = "unavailable")]
    Unavailable,
}

impl HiringStatus {
    pub const ALL: [HiringStatus; 3] = [
        HiringStatus::NotHiring,
        HiringStatus::Hiring,
        HiringStatus::Unavailable,
    ];

    /// Stored code
    pub fn code(&self) -> &'static str {
        match self {
            HiringStatus::NotHiring => "not_hiring",
            HiringStatus::Hiring => "hiring",
            HiringStatus::Unavailable => "unavailable",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            HiringStatus::NotHiring => "Not Hiring",
            HiringStatus::Hiring => "Hiring",
            HiringStatus::Unavailable => "Unavailable",
        }
    }
}

impl FromStr for HiringStatus {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == s)
            .ok_or_else(|| UnknownCode::new("hiring_status", s))
    }
}

impl fmt::Display for HiringStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Preferred way to reach a professor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    #[sea_orm(string_value = "email")]
    Email,
    #[sea_orm(string_value = "application")]
    Application,
    #[sea_orm(string_value = "form")]
    Form,
}

impl ContactMethod {
    pub const ALL: [ContactMethod; 3] = [
        ContactMethod::Email,
        ContactMethod::Application,
        ContactMethod::Form,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ContactMethod::Email => "email",
            ContactMethod::Application => "application",
            ContactMethod::Form => "form",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContactMethod::Email => "Email",
            ContactMethod::Application => "Through Application",
            ContactMethod::Form => "Interest Form",
        }
    }
}

impl FromStr for ContactMethod {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.code() == s)
            .ok_or_else(|| UnknownCode::new("contact_through", s))
    }
}

impl fmt::Display for ContactMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A stored code that matches no enumeration variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {field} code: {code:?}")]
pub struct UnknownCode {
    pub field: &'static str,
    pub code: String,
}

impl UnknownCode {
    fn new(field: &'static str, code: &str) -> Self {
        Self {
            field,
            code: code.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "professor")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub title: String,

    pub university_id: i32,

    pub department_id: i32,

    pub email: String,

    pub personal_website: Option<String>,

    pub lab_group_name: Option<String>,

    pub lab_website: Option<String>,

    pub hiring_status: HiringStatus,

    pub contact_through: ContactMethod,

    pub form_link: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::university::Entity",
        from = "Column::UniversityId",
        to = "super::university::Column::Id",
        on_delete = "Cascade"
    )]
    University,

    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id",
        on_delete = "Cascade"
    )]
    Department,

    #[sea_orm(has_many = "super::professor_program::Entity")]
    ProfessorPrograms,

    #[sea_orm(has_many = "super::professor_research_area::Entity")]
    ProfessorResearchAreas,
}

impl Related<super::university::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::University.def()
    }
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::program::Entity> for Entity {
    fn to() -> RelationDef {
        super::professor_program::Relation::Program.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::professor_program::Relation::Professor.def().rev())
    }
}

impl Related<super::research_area::Entity> for Entity {
    fn to() -> RelationDef {
        super::professor_research_area::Relation::ResearchArea.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::professor_research_area::Relation::Professor.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hiring_status_codes_round_trip() {
        for status in HiringStatus::ALL {
            assert_eq!(status.code().parse::<HiringStatus>().unwrap(), status);
        }
        assert_eq!(HiringStatus::NotHiring.to_string(), "Not Hiring");
    }

    #[test]
    fn test_unknown_contact_code() {
        let err = "carrier_pigeon".parse::<ContactMethod>().unwrap_err();
        assert_eq!(err.field, "contact_through");
        assert_eq!(err.code, "carrier_pigeon");
    }

    #[test]
    fn test_active_enum_matches_code() {
        assert_eq!(ContactMethod::Form.to_value(), "form");
        assert_eq!(HiringStatus::Unavailable.to_value(), "unavailable");
    }
}
