//! taskhub: a task tracking service.
//!
//! Tasks carry a title, description, priority, optional due date and a
//! status that moves along a small lifecycle graph. They can be listed with
//! filters and pagination, soft-deleted, restored and erased.
//!
//! # Architecture
//!
//! taskhub follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//!
//! # Modules
//!
//! - [`task`]: Task domain, storage and lifecycle services
//! - [`http`]: JSON API over the task services
//! - [`config`]: Environment-driven runtime configuration

pub mod config;
pub mod http;
pub mod task;
