//! Batches: persisting allocator output, the upload pipeline, and the
//! admin-triggered account creation that turns a batch into trainee accounts.

pub mod handlers;
pub mod materialize;
pub mod pipeline;
