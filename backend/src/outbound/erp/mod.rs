//! ERP outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `ErpGateway` port.

mod http_gateway;

pub use http_gateway::{ErpConnection, HttpErpGateway};
