//! Entity reconciliation
//!
//! Turns free-text form input into normalized rows: names are resolved to
//! existing universities, departments, programs and research areas (or
//! created on first use), and a professor's associations are replaced with
//! the resolved set, all inside the caller's transaction.

mod associations;
mod names;
mod professor;
mod resolver;

pub use associations::{sync_associations, DesiredAssociations, SyncedAssociations};
pub use names::{optional_text, parse_name_list};
pub use professor::{
    upsert_professor, DepartmentRef, ProfessorInput, UniversityInput, UniversityRef, UpsertOutcome,
};
pub use resolver::{CreatedEntities, Resolver, UniversityDetails};
