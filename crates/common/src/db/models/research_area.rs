//! Research area entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "research_area")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::professor_research_area::Entity")]
    ProfessorResearchAreas,
}

impl Related<super::professor_research_area::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProfessorResearchAreas.def()
    }
}

impl Related<super::professor::Entity> for Entity {
    fn to() -> RelationDef {
        super::professor_research_area::Relation::Professor.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::professor_research_area::Relation::ResearchArea.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
