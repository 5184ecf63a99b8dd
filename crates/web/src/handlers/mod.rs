//! API handlers module

pub mod applicants;
pub mod catalog;
pub mod dashboard;
pub mod health;
pub mod professors;
pub mod programs;
