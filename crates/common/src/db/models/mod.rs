//! SeaORM entity models
//!
//! Database entities for the tracker

mod university;
mod department;
mod program;
mod research_area;
mod professor;
mod professor_program;
mod professor_research_area;
mod applicant;

pub use university::{
    Entity as UniversityEntity,
    Model as University,
    ActiveModel as UniversityActiveModel,
    Column as UniversityColumn,
};

pub use department::{
    Entity as DepartmentEntity,
    Model as Department,
    ActiveModel as DepartmentActiveModel,
    Column as DepartmentColumn,
};

pub use program::{
    Entity as ProgramEntity,
    Model as Program,
    ActiveModel as ProgramActiveModel,
    Column as ProgramColumn,
    Relation as ProgramRelation,
};

pub use research_area::{
    Entity as ResearchAreaEntity,
    Model as ResearchArea,
    ActiveModel as ResearchAreaActiveModel,
    Column as ResearchAreaColumn,
};

pub use professor::{
    Entity as ProfessorEntity,
    Model as Professor,
    ActiveModel as ProfessorActiveModel,
    Column as ProfessorColumn,
    ContactMethod,
    HiringStatus,
    UnknownCode,
};

pub use professor_program::{
    Entity as ProfessorProgramEntity,
    Model as ProfessorProgram,
    ActiveModel as ProfessorProgramActiveModel,
    Column as ProfessorProgramColumn,
    Relation as ProfessorProgramRelation,
};

pub use professor_research_area::{
    Entity as ProfessorResearchAreaEntity,
    Model as ProfessorResearchArea,
    ActiveModel as ProfessorResearchAreaActiveModel,
    Column as ProfessorResearchAreaColumn,
    Relation as ProfessorResearchAreaRelation,
};

pub use applicant::{
    Entity as ApplicantEntity,
    Model as Applicant,
    ActiveModel as ApplicantActiveModel,
    Column as ApplicantColumn,
};
