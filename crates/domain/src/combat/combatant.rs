//! Combatants, combats and initiative brackets.

use serde::{Deserialize, Serialize};

use crate::entities::{ActorKind, Disposition};
use crate::{ActorId, CombatId, CombatantId};

/// Players taking the initiative act first.
pub const TAKING_INITIATIVE_BRACKET: i32 = 1000;
/// Hostile, neutral and secret NPCs.
pub const ENEMY_BRACKET: i32 = 2000;
/// Players and friendly NPCs.
pub const ALLY_BRACKET: i32 = 3000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    pub id: CombatantId,
    #[serde(default)]
    pub actor_id: Option<ActorId>,
    pub name: String,
    pub kind: ActorKind,
    #[serde(default)]
    pub disposition: Disposition,
    /// Finished its turn this round.
    #[serde(default)]
    pub acted: bool,
    /// Player-only toggle moving the combatant to the first bracket.
    #[serde(default)]
    pub taking_initiative: bool,
    /// Sort key within the bracket.
    #[serde(default)]
    pub initiative: Option<i32>,
    #[serde(default)]
    pub defeated: bool,
}

impl Combatant {
    pub fn new(name: impl Into<String>, kind: ActorKind, disposition: Disposition) -> Self {
        Self {
            id: CombatantId::new(),
            actor_id: None,
            name: name.into(),
            kind,
            disposition,
            acted: false,
            taking_initiative: false,
            initiative: None,
            defeated: false,
        }
    }

    pub fn player(name: impl Into<String>) -> Self {
        Self::new(name, ActorKind::Character, Disposition::Friendly)
    }

    pub fn npc(name: impl Into<String>, disposition: Disposition) -> Self {
        Self::new(name, ActorKind::Npc, disposition)
    }

    pub fn with_actor(mut self, actor: ActorId) -> Self {
        self.actor_id = Some(actor);
        self
    }

    pub fn with_initiative(mut self, initiative: i32) -> Self {
        self.initiative = Some(initiative);
        self
    }

    pub fn taking_initiative(mut self) -> Self {
        self.taking_initiative = true;
        self
    }

    pub fn is_player(&self) -> bool {
        self.kind == ActorKind::Character
    }

    /// Coarse phase of the combatant. The taking-initiative flag only counts
    /// for players; NPC brackets depend on disposition alone.
    pub fn initiative_bracket(&self) -> i32 {
        match (self.kind, self.disposition) {
            (ActorKind::Character, _) if self.taking_initiative => TAKING_INITIATIVE_BRACKET,
            (ActorKind::Character, _) => ALLY_BRACKET,
            (ActorKind::Npc, Disposition::Friendly) => ALLY_BRACKET,
            (ActorKind::Npc, _) => ENEMY_BRACKET,
        }
    }
}

/// Orders unset initiative after every set value.
pub(crate) fn initiative_key(combatant: &Combatant) -> (bool, i32) {
    match combatant.initiative {
        Some(initiative) => (false, initiative),
        None => (true, 0),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combat {
    pub id: CombatId,
    /// Zero before the combat starts.
    #[serde(default)]
    pub round: u32,
    /// Index into [`Combat::turns`].
    #[serde(default)]
    pub turn: Option<usize>,
    #[serde(default)]
    pub combatants: Vec<Combatant>,
}

impl Combat {
    pub fn new(combatants: Vec<Combatant>) -> Self {
        Self {
            id: CombatId::new(),
            round: 0,
            turn: None,
            combatants,
        }
    }

    /// Combatants in turn order: ascending initiative, unset last, ties in
    /// insertion order.
    pub fn turns(&self) -> Vec<&Combatant> {
        let mut turns: Vec<&Combatant> = self.combatants.iter().collect();
        turns.sort_by_key(|c| initiative_key(c));
        turns
    }

    pub fn current(&self) -> Option<&Combatant> {
        let turn = self.turn?;
        self.turns().get(turn).copied()
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    pub fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| c.id == id)
    }

    /// Position of a combatant in turn order.
    pub fn turn_of(&self, id: CombatantId) -> Option<usize> {
        self.turns().iter().position(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taking_initiative_player_goes_first_regardless_of_disposition() {
        for disposition in [
            Disposition::Friendly,
            Disposition::Neutral,
            Disposition::Hostile,
            Disposition::Secret,
        ] {
            let player = Combatant::new("Ada", ActorKind::Character, disposition).taking_initiative();
            assert_eq!(player.initiative_bracket(), 1000);
        }
    }

    #[test]
    fn npc_brackets_ignore_the_taking_initiative_flag() {
        let hostile = Combatant::npc("Orc", Disposition::Hostile);
        assert_eq!(hostile.initiative_bracket(), 2000);
        assert_eq!(hostile.clone().taking_initiative().initiative_bracket(), 2000);

        assert_eq!(Combatant::npc("Dog", Disposition::Friendly).initiative_bracket(), 3000);
        assert_eq!(Combatant::npc("Cat", Disposition::Neutral).initiative_bracket(), 2000);
        assert_eq!(Combatant::npc("Spy", Disposition::Secret).initiative_bracket(), 2000);
    }

    #[test]
    fn players_default_to_ally_bracket() {
        assert_eq!(Combatant::player("Ada").initiative_bracket(), 3000);
    }

    #[test]
    fn turn_order_sorts_unset_last() {
        let late = Combatant::player("Late");
        let first = Combatant::player("First").with_initiative(1001);
        let second = Combatant::npc("Second", Disposition::Hostile).with_initiative(2001);
        let combat = Combat::new(vec![late.clone(), second.clone(), first.clone()]);

        let names: Vec<_> = combat.turns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["First", "Second", "Late"]);
        assert_eq!(combat.turn_of(late.id), Some(2));
        assert!(combat.current().is_none());
    }
}
