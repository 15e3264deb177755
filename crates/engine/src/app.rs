//! Application state and composition.

use std::sync::Arc;

use weirdwizard_domain::{AfflictionCatalog, EffectChangeRegistry};

use crate::infrastructure::ports::{
    ActorRepo, ChatLogPort, ClockPort, CombatRepo, DialogPort, NotificationPort, RandomPort,
    SettingsRepo, TemplatePort,
};
use crate::use_cases;

/// Main application state.
///
/// Holds the ports, the rules tables built at start-up and all use cases.
pub struct App {
    pub ports: Ports,
    pub registry: Arc<EffectChangeRegistry>,
    pub catalog: Arc<AfflictionCatalog>,
    pub use_cases: UseCases,
}

/// Every port the host provides.
#[derive(Clone)]
pub struct Ports {
    pub actors: Arc<dyn ActorRepo>,
    pub combats: Arc<dyn CombatRepo>,
    pub settings: Arc<dyn SettingsRepo>,
    pub chat: Arc<dyn ChatLogPort>,
    pub templates: Arc<dyn TemplatePort>,
    pub dialog: Arc<dyn DialogPort>,
    pub notifier: Arc<dyn NotificationPort>,
    pub clock: Arc<dyn ClockPort>,
    pub random: Arc<dyn RandomPort>,
}

/// Container for all use cases.
pub struct UseCases {
    pub roll: use_cases::RollUseCases,
    pub effects: Arc<use_cases::EffectOps>,
    pub afflictions: Arc<use_cases::AfflictionOps>,
    pub combat: Arc<use_cases::CombatOps>,
    pub chat_actions: Arc<use_cases::ChatActions>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(ports: Ports) -> Self {
        // Built once and shared by every use case.
        let registry = Arc::new(EffectChangeRegistry::standard());
        let catalog = Arc::new(AfflictionCatalog::build_all());
        tracing::debug!(afflictions = catalog.len(), "Rules tables built");

        let afflictions = Arc::new(use_cases::AfflictionOps::new(
            ports.actors.clone(),
            ports.dialog.clone(),
            ports.notifier.clone(),
            catalog.clone(),
            registry.clone(),
        ));
        let effects = Arc::new(use_cases::EffectOps::new(
            ports.actors.clone(),
            ports.random.clone(),
            afflictions.clone(),
            registry.clone(),
        ));
        let roll = use_cases::RollUseCases::new(
            ports.actors.clone(),
            ports.templates.clone(),
            ports.chat.clone(),
            ports.notifier.clone(),
            ports.settings.clone(),
            ports.clock.clone(),
            ports.random.clone(),
            afflictions.clone(),
            registry.clone(),
        );
        let combat = Arc::new(use_cases::CombatOps::new(
            ports.combats.clone(),
            ports.dialog.clone(),
            ports.notifier.clone(),
            ports.settings.clone(),
        ));
        let chat_actions = Arc::new(use_cases::ChatActions::new(
            effects.clone(),
            afflictions.clone(),
            roll.damage.clone(),
            roll.healing.clone(),
        ));

        Self {
            ports,
            registry,
            catalog,
            use_cases: UseCases {
                roll,
                effects,
                afflictions,
                combat,
                chat_actions,
            },
        }
    }
}
