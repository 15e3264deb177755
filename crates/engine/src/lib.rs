//! Weird Wizard Engine library.
//!
//! Host-facing orchestration of the Weird Wizard rules: attribute, damage and
//! healing rolls, effects and afflictions, chat card buttons and the combat
//! tracker.
//!
//! ## Structure
//!
//! - `use_cases/` - User story orchestration over the domain rules
//! - `infrastructure/` - Port traits and the adapters shipped with the engine
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::{App, Ports};
