//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Document access (actors, effects, combats)
//! - Host services (chat log, templates, dialogs, notifications)
//! - Settings storage
//! - Clock/Random (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::*;

// =============================================================================
// Host Service Ports
// =============================================================================
pub use external::{
    ChatLogPort, ChatMessage, DialogPort, NotificationPort, RollMode, Speaker, TemplatePort,
};

#[cfg(test)]
pub use external::{MockChatLogPort, MockDialogPort, MockNotificationPort, MockTemplatePort};

// =============================================================================
// Testability Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{HostError, RepoError};
