//! Blocking client for the categories service.
//!
//! # Overview
//! Wraps the ten REST endpoints of the categories service: creating and
//! fetching categories, and linking them to projects and skills. Every call
//! is a single request/response round-trip with a fixed expected status
//! code; there are no retries and no client-side caching.
//!
//! # Design
//! - `CategoriesClient` is immutable after construction and safe to share.
//! - Each operation is split into `build_*` (produces `HttpRequest`) and
//!   `parse_*` (consumes `HttpResponse`); the plain method runs both through
//!   a `Transport`.
//! - `UreqTransport` is the default transport; tests and callers with their
//!   own HTTP stack plug in a different one.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::CategoriesClient;
pub use config::{ClientConfig, ConfigError, DEFAULT_TIMEOUT};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{
    AssociateCategoryWithProjectRequest, AssociateCategoryWithSkillRequest, Category,
    CreateCategoryRequest, DisassociateCategoryFromSkillRequest, GetCategoriesForSkillRequest,
    GetCategoriesForSkillResponse, GetSkillIDsForCategoryRequest, GetSkillIDsForCategoryResponse,
};
