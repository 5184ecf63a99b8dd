//! professor <-> research area association table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "professor_research_areas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub professor_id: i32,

    #[sea_orm(primary_key, auto_increment = false)]
    pub research_area_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::professor::Entity",
        from = "Column::ProfessorId",
        to = "super::professor::Column::Id",
        on_delete = "Cascade"
    )]
    Professor,

    #[sea_orm(
        belongs_to = "super::research_area::Entity",
        from = "Column::ResearchAreaId",
        to = "super::research_area::Column::Id",
        on_delete = "Cascade"
    )]
    ResearchArea,
}

impl Related<super::professor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Professor.def()
    }
}

impl Related<super::research_area::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ResearchArea.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
