//! Goods-receipt integration backend.
//!
//! Hexagonal layout: [`domain`] holds the posting workflow and its ports,
//! [`inbound`] exposes it over HTTP, and [`outbound`] implements the ports
//! against PostgreSQL, the ERP and argon2.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
