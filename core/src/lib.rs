//! Async API client core for the TickTick task service.
//!
//! # Overview
//! Authenticates with the OAuth client-credentials grant, caches the bearer
//! token until it expires, and maps task and list operations onto the REST
//! endpoints of the remote service.
//!
//! # Design
//! - `TickTickClient` owns its credentials and a single cached token; it
//!   holds no task or list data.
//! - Every operation has a pure `build_*` counterpart producing an `ApiCall`,
//!   so request shapes are testable without I/O.
//! - The HTTP round-trip goes through the `Transport` trait. `ReqwestTransport`
//!   is the default; tests substitute their own.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod transport;
pub mod types;

pub use client::TickTickClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{ApiCall, HttpMethod, HttpRequest, HttpResponse, Transport};
pub use session::{Session, TokenResponse};
pub use transport::ReqwestTransport;
pub use types::{
    NewProject, NewTask, Project, ProjectUpdate, Task, TaskQuery, TaskStatus, TaskUpdate,
};
