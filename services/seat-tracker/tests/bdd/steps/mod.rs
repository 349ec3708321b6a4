//! BDD step definitions for seat tracker service

pub mod classifier_steps;
pub mod session_steps;
