//! Applicant profile entity
//!
//! Stands alone; nothing links applicants to the professor graph.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "applicant")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub email: String,

    pub undergraduate_institution: Option<String>,

    pub major: Option<String>,

    /// 0.00 - 4.00
    pub gpa: Option<f64>,

    /// 0 - 120
    pub toefl: Option<i32>,

    /// 0.0 - 9.0
    pub ielts: Option<f64>,

    /// 260 - 340
    pub gre: Option<i32>,

    #[sea_orm(column_type = "Text", nullable)]
    pub research_interests: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
