//! Nexa CRM API Library
//!
//! Backend for the agency's business-management dashboard: client CRM with an
//! append-only activity log, dashboard aggregation, the in-memory task board,
//! contract document generation and session auth.
//!
//! # Modules
//!
//! - `auth`: accounts, session tokens and auth-state notifications.
//! - `config`: configuration management.
//! - `contracts`: contract template rendering and paginated export.
//! - `crm`: form validation and list filtering.
//! - `db`: database connection and pool management.
//! - `errors`: error handling types.
//! - `handlers`: HTTP request handlers and the router.
//! - `models`: core data models.
//! - `repository`: storage contract and Postgres implementation.
//! - `tasks`: the in-memory task board.

pub mod auth;
pub mod config;
pub mod contracts;
pub mod crm;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod tasks;
