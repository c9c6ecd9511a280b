//! Domain core of the agency site: records, validation, the admin session
//! gate, persistence, notification templates and the contact and meeting
//! workflows.

pub mod auth;
pub mod calendar;
pub mod model;
pub mod notify;
pub mod saga;
pub mod store;
pub mod validate;
pub mod workflow;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;
