//! Enable/disable lifecycle of the overlay client.
//!
//! # Responsibility
//! - Bind the toolbar checkbox to the activation cookie.
//! - Compose store, tracker and presenter into one page-lifetime object.
//!
//! # Invariants
//! - Handlers run to completion on the caller's thread; `&mut self` keeps
//!   them non-reentrant.

pub mod controller;
pub mod cookie;

pub use controller::{BrowserHost, InspectorSession, Key, SessionMode};
pub use cookie::CookieFlag;
