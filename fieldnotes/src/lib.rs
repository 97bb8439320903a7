//! Field Notes research workspace: projects and tasks with optimistic
//! updates over a simulated API.

pub mod api;
pub mod config;
pub mod notify;
pub mod optimistic;
pub mod session;
pub mod storage;
pub mod store;
pub mod workspace;
