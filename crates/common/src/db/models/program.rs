//! Program entity
//!
//! Program names are only unique within a department; "Computer Science"
//! may exist under several departments.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "program")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub department_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id",
        on_delete = "Cascade"
    )]
    Department,

    #[sea_orm(has_many = "super::professor_program::Entity")]
    ProfessorPrograms,
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::professor_program::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProfessorPrograms.def()
    }
}

impl Related<super::professor::Entity> for Entity {
    fn to() -> RelationDef {
        super::professor_program::Relation::Professor.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::professor_program::Relation::Program.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
