//! # OpsDesk Dashboard
//!
//! The command center as an explicit state machine. Every user action is an
//! [`Event`] applied to a [`Session`] value by the [`Dashboard`] controller,
//! which then renders a [`Page`] view model. The HTTP layer only moves
//! sessions, events and pages around.

pub mod controller;
pub mod event;
pub mod filter;
pub mod page;
pub mod render;
pub mod session;

pub use controller::{Dashboard, DashboardSettings, Effect, Pass};
pub use event::{Event, TaskDraft, TaskEdit};
pub use page::Page;
pub use session::{Level, Notice, Session, View};
