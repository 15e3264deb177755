//! Weird Wizard Engine - developer entry point.
//!
//! Runs the rules against in-memory documents and prints chat cards to the
//! console:
//!
//! ```text
//! weirdwizard-engine [roll|damage|afflictions|combat] [--dice 14,3,5]
//! ```

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weirdwizard_domain::effects::paths;
use weirdwizard_domain::{
    Actor, ActorKind, AfflictionId, Attribute, Combat, Combatant, Disposition, EffectTrigger,
    InstantEffect, InstantKind, Item,
};
use weirdwizard_engine::infrastructure::{
    clock::{ScriptedRandom, SystemClock, SystemRandom},
    console::{ConsoleChatLog, FixedDialog, JsonTemplateRenderer, LogNotifier},
    memory::{InMemoryActorRepo, InMemoryCombatRepo},
    ports::{ActorRepo, RandomPort},
    settings::{EngineConfig, EnvSettingsRepo},
};
use weirdwizard_engine::use_cases::roll::{AttributeRollRequest, DamageRollRequest};
use weirdwizard_engine::use_cases::ChatAction;
use weirdwizard_engine::{App, Ports};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Demo {
    Roll,
    Damage,
    Afflictions,
    Combat,
}

struct Args {
    demo: Demo,
    dice: Option<Vec<i32>>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Args> {
    let mut demo = Demo::Roll;
    let mut dice = None;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "roll" => demo = Demo::Roll,
            "damage" => demo = Demo::Damage,
            "afflictions" => demo = Demo::Afflictions,
            "combat" => demo = Demo::Combat,
            "--dice" => {
                let list = args.next().context("--dice needs a comma-separated list")?;
                let values = list
                    .split(',')
                    .map(|v| v.trim().parse::<i32>())
                    .collect::<Result<Vec<_>, _>>()
                    .with_context(|| format!("invalid dice list: {list}"))?;
                dice = Some(values);
            }
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(Args { demo, dice })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary may run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weirdwizard_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = EngineConfig::from_env().context("Failed to read engine configuration")?;
    tracing::info!(demo = ?args.demo, settings = ?config.settings, "Starting Weird Wizard Engine");

    let random: Arc<dyn RandomPort> = match args.dice {
        Some(dice) => Arc::new(ScriptedRandom::new(dice)),
        None => Arc::new(SystemRandom::new()),
    };
    let actors = Arc::new(InMemoryActorRepo::new());
    let combats = Arc::new(InMemoryCombatRepo::new());
    let chat = Arc::new(ConsoleChatLog::new());

    let app = App::new(Ports {
        actors: actors.clone(),
        combats: combats.clone(),
        settings: Arc::new(EnvSettingsRepo::new(&config)),
        chat: chat.clone(),
        templates: Arc::new(JsonTemplateRenderer),
        dialog: Arc::new(FixedDialog::new(true)),
        notifier: Arc::new(LogNotifier),
        clock: Arc::new(SystemClock::new()),
        random,
    });

    let (hero, foe) = seed_actors(&actors).await;

    match args.demo {
        Demo::Roll => {
            let sword = hero.items.first().context("hero has no weapon")?.id;
            let outcome = app
                .use_cases
                .roll
                .attribute
                .execute(AttributeRollRequest::item(hero.id, sword).with_targets(vec![foe.id]))
                .await?;
            if let Some(outcome) = outcome {
                for action in outcome.actions {
                    tracing::info!(?action, "Available button");
                }
            }
        }
        Demo::Damage => {
            let sword = hero.items.first().context("hero has no weapon")?.id;
            let outcome = app
                .use_cases
                .roll
                .damage
                .execute(
                    DamageRollRequest::new(hero.id, sword)
                        .with_bonus_damage()
                        .with_targets(vec![foe.id]),
                )
                .await?;
            if let Some(outcome) = outcome {
                for action in outcome.actions {
                    let result = app.use_cases.chat_actions.execute(action).await?;
                    tracing::info!(?result, "Button clicked");
                }
            }
            let foe = actors.get(foe.id).await?.context("foe vanished")?;
            tracing::info!(name = %foe.name, damage = foe.damage, "After damage");
        }
        Demo::Afflictions => {
            let chat_actions = &app.use_cases.chat_actions;
            chat_actions
                .execute(ChatAction::ApplyAffliction {
                    target: hero.id,
                    affliction: AfflictionId::Unconscious,
                })
                .await?;
            let outcome = app
                .use_cases
                .roll
                .attribute
                .execute(AttributeRollRequest::attribute(hero.id, Attribute::Str))
                .await?;
            tracing::info!(blocked = outcome.is_none(), "Strength roll while unconscious");

            let result = chat_actions
                .execute(ChatAction::ClearAfflictions { target: hero.id })
                .await?;
            tracing::info!(?result, "Afflictions cleared");
        }
        Demo::Combat => {
            let combat = Combat::new(vec![
                Combatant::player(hero.name.clone())
                    .with_actor(hero.id)
                    .with_initiative(3001),
                Combatant::npc(foe.name.clone(), Disposition::Hostile)
                    .with_actor(foe.id)
                    .with_initiative(2001),
            ]);
            let hero_combatant = combat
                .combatants
                .first()
                .context("combat has no combatants")?
                .id;
            let combat_id = combat.id;
            combats.insert(combat).await;

            let ops = &app.use_cases.combat;
            let pointer = ops.start_next_round(combat_id).await?;
            tracing::info!(?pointer, "Round started");
            ops.take_initiative(combat_id, hero_combatant, true).await?;
            let pointer = ops.end_turn(combat_id).await?;
            tracing::info!(?pointer, "Turn ended");
        }
    }

    tracing::info!(messages = chat.messages().await.len(), "Done");
    Ok(())
}

async fn seed_actors(actors: &InMemoryActorRepo) -> (Actor, Actor) {
    let sword = Item::weapon("Sword", Attribute::Str, "1d6+1")
        .with_instant(InstantEffect::new(
            EffectTrigger::OnCritical,
            InstantKind::ApplyAffliction {
                affliction: AfflictionId::Prone,
            },
        ));
    let hero = Actor::new("Ada", ActorKind::Character)
        .with_attribute(Attribute::Str, 14)
        .with_stat(paths::HEALTH_NORMAL, 20)
        .with_stat(paths::HEALTH_CURRENT, 20)
        .with_stat(paths::BONUS_DAMAGE, 1)
        .with_item(sword);
    let foe = Actor::new("Goblin", ActorKind::Npc)
        .with_attribute(Attribute::Agi, 12)
        .with_stat(paths::DEFENSE_NATURAL, 12)
        .with_stat(paths::HEALTH_NORMAL, 10)
        .with_stat(paths::HEALTH_CURRENT, 10);

    actors.insert(hero.clone()).await;
    actors.insert(foe.clone()).await;
    (hero, foe)
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> anyhow::Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_to_roll_demo() {
        let parsed = args(&[]).unwrap();
        assert_eq!(parsed.demo, Demo::Roll);
        assert!(parsed.dice.is_none());
    }

    #[test]
    fn parses_scripted_dice() {
        let parsed = args(&["damage", "--dice", "1, 4,6"]).unwrap();
        assert_eq!(parsed.demo, Demo::Damage);
        assert_eq!(parsed.dice, Some(vec![1, 4, 6]));
    }

    #[test]
    fn rejects_unknown_arguments() {
        assert!(args(&["teleport"]).is_err());
        assert!(args(&["--dice"]).is_err());
        assert!(args(&["--dice", "x"]).is_err());
    }
}
