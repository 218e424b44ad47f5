//! Lifecycle scheduling and featured rotation for the carnival display.
//!
//! This crate decides, from wall-clock time alone, which events are
//! upcoming, about to start, live, or completed, and which single event
//! the public display features.
//!
//! # Modules
//!
//! - [`clock`] -- Wall-clock source, system or anchored to tokio time
//! - [`config`] -- Configuration loading from `carnival-config.yaml` into
//!   strongly-typed structs
//! - [`control`] -- Shared stop control for the display loop
//! - [`featured`] -- Rotation state and featured-event selection
//! - [`runner`] -- The three-timer display loop
//! - [`scheduler`] -- Per-tick lifecycle rules and the imminent-start lock
//! - [`timing`] -- Countdown math and venue-time text
//! - [`venue`] -- The shared venue record and snapshot assembly

pub mod clock;
pub mod config;
pub mod control;
pub mod featured;
pub mod runner;
pub mod scheduler;
pub mod timing;
pub mod venue;

pub use clock::VenueClock;
pub use config::CarnivalConfig;
pub use control::DisplayControl;
pub use runner::{DisplayCallback, DisplayRunResult, DisplayUpdate, run_display};
pub use scheduler::{LifecycleScheduler, SchedulerState, TickSummary};
pub use venue::Venue;
