pub mod batch;
pub mod trainee;
