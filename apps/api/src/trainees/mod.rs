//! Trainee account endpoints: read access and admin bulk creation.

pub mod handlers;
