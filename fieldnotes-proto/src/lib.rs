//! Shared domain definitions for Field Notes projects and tasks.

pub mod auth;
pub mod codec;
pub mod ids;
pub mod project;
pub mod query;
pub mod status;
pub mod task;
pub mod validation;
