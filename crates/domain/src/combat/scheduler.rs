//! Turn-order scheduling within initiative brackets.
//!
//! Every operation returns the batch of updates the caller must persist;
//! nothing here mutates a combat in place. Reordering only works inside one
//! bracket: a source and target in different brackets is a no-op (`None`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::CombatantId;

use super::combatant::{initiative_key, Combat, Combatant};

/// New initiative for one combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortUpdate {
    pub id: CombatantId,
    pub initiative: i32,
}

/// Partial combatant update, persisted as one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatantUpdate {
    pub id: CombatantId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiative: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taking_initiative: Option<bool>,
}

impl CombatantUpdate {
    pub fn new(id: CombatantId) -> Self {
        Self {
            id,
            initiative: None,
            acted: None,
            taking_initiative: None,
        }
    }

    pub fn acted(id: CombatantId, acted: bool) -> Self {
        Self {
            acted: Some(acted),
            ..Self::new(id)
        }
    }

    /// Apply to a combatant with the same id.
    pub fn apply(&self, combatant: &mut Combatant) {
        if let Some(initiative) = self.initiative {
            combatant.initiative = Some(initiative);
        }
        if let Some(acted) = self.acted {
            combatant.acted = acted;
        }
        if let Some(taking) = self.taking_initiative {
            combatant.taking_initiative = taking;
        }
    }
}

impl From<SortUpdate> for CombatantUpdate {
    fn from(update: SortUpdate) -> Self {
        Self {
            initiative: Some(update.initiative),
            ..Self::new(update.id)
        }
    }
}

/// Combine updates per combatant, later fields winning. Keeps first-seen order.
pub fn merge_updates(updates: impl IntoIterator<Item = CombatantUpdate>) -> Vec<CombatantUpdate> {
    let mut merged: Vec<CombatantUpdate> = Vec::new();
    for update in updates {
        match merged.iter_mut().find(|u| u.id == update.id) {
            Some(existing) => {
                existing.initiative = update.initiative.or(existing.initiative);
                existing.acted = update.acted.or(existing.acted);
                existing.taking_initiative = update.taking_initiative.or(existing.taking_initiative);
            }
            None => merged.push(update),
        }
    }
    merged
}

/// Move `source` next to `target` within its bracket and renumber the whole
/// bracket densely as `bracket + position + 1`.
///
/// `siblings` may contain combatants of any bracket; only the source's bracket
/// is considered. Without a target the source goes last. When `sort_before` is
/// `None` it is inferred: a source sorting after the target moves before it.
///
/// Returns `None` when source and target are in different brackets or the
/// target is not among the siblings.
pub fn perform_integer_sort(
    source: &Combatant,
    target: Option<&Combatant>,
    siblings: &[Combatant],
    sort_before: Option<bool>,
) -> Option<Vec<SortUpdate>> {
    let bracket = source.initiative_bracket();
    if let Some(target) = target {
        if target.initiative_bracket() != bracket {
            return None;
        }
    }

    let sort_before = sort_before.unwrap_or_else(|| match (source.initiative, target) {
        (Some(source), Some(Combatant {
            initiative: Some(target),
            ..
        })) => source > *target,
        _ => false,
    });

    let mut members: Vec<&Combatant> = siblings
        .iter()
        .filter(|c| c.id != source.id && c.initiative_bracket() == bracket)
        .collect();
    members.sort_by_key(|c| initiative_key(c));

    let index = match target {
        Some(target) => {
            let position = members.iter().position(|c| c.id == target.id)?;
            if sort_before {
                position
            } else {
                position + 1
            }
        }
        None => members.len(),
    };
    members.insert(index, source);

    let updates = members
        .iter()
        .enumerate()
        .map(|(position, c)| SortUpdate {
            id: c.id,
            initiative: bracket + position as i32 + 1,
        })
        .collect();
    Some(updates)
}

/// Renumber every bracket densely, keeping the current order inside each.
pub fn set_all(combatants: &[Combatant]) -> Vec<SortUpdate> {
    let mut brackets: BTreeMap<i32, Vec<&Combatant>> = BTreeMap::new();
    for combatant in combatants {
        brackets
            .entry(combatant.initiative_bracket())
            .or_default()
            .push(combatant);
    }

    let mut updates = Vec::with_capacity(combatants.len());
    for (bracket, mut members) in brackets {
        members.sort_by_key(|c| initiative_key(c));
        for (position, combatant) in members.into_iter().enumerate() {
            updates.push(SortUpdate {
                id: combatant.id,
                initiative: bracket + position as i32 + 1,
            });
        }
    }
    updates
}

/// Toggle the taking-initiative flag and re-sort every bracket.
///
/// Returns `None` for unknown or non-player combatants.
pub fn take_initiative(combat: &Combat, id: CombatantId, taking: bool) -> Option<Vec<CombatantUpdate>> {
    let combatant = combat.combatant(id)?;
    if !combatant.is_player() {
        return None;
    }

    let mut combatants = combat.combatants.clone();
    let flag = CombatantUpdate {
        taking_initiative: Some(taking),
        ..CombatantUpdate::new(id)
    };
    for combatant in combatants.iter_mut().filter(|c| c.id == id) {
        flag.apply(combatant);
    }

    let sorted = set_all(&combatants).into_iter().map(CombatantUpdate::from);
    Some(merge_updates(std::iter::once(flag).chain(sorted)))
}

/// Move `id` immediately before the current combatant.
///
/// `None` when there is no current turn, the combatant is the current one, or
/// the two are in different brackets.
pub fn act_next(combat: &Combat, id: CombatantId) -> Option<Vec<SortUpdate>> {
    let current = combat.current()?;
    if current.id == id {
        return None;
    }
    let source = combat.combatant(id)?;
    perform_integer_sort(source, Some(current), &combat.combatants, Some(true))
}

/// Give `id` another turn: clear its acted flag and place it right after the
/// combatant that currently goes last in its bracket.
pub fn act_again(combat: &Combat, id: CombatantId) -> Option<Vec<CombatantUpdate>> {
    let source = combat.combatant(id)?;
    let bracket = source.initiative_bracket();
    let last = combat
        .combatants
        .iter()
        .filter(|c| c.id != id && c.initiative_bracket() == bracket)
        .filter(|c| c.initiative.is_some())
        .max_by_key(|c| c.initiative);

    let sorted = perform_integer_sort(source, last, &combat.combatants, Some(false))?;
    let updates = std::iter::once(CombatantUpdate::acted(id, false))
        .chain(sorted.into_iter().map(CombatantUpdate::from));
    Some(merge_updates(updates))
}

/// Reorder by ids, as when dropping one tracker row onto another.
pub fn reorder(
    combat: &Combat,
    source: CombatantId,
    target: CombatantId,
    sort_before: Option<bool>,
) -> Option<Vec<SortUpdate>> {
    let source = combat.combatant(source)?;
    let target = combat.combatant(target)?;
    if source.id == target.id {
        return None;
    }
    perform_integer_sort(source, Some(target), &combat.combatants, sort_before)
}

/// Next turn index after the current one, skipping defeated combatants and,
/// when `skip_acted` is set, those that already acted. `None` ends the round.
pub fn next_turn_index(combat: &Combat, skip_acted: bool) -> Option<usize> {
    let start = combat.turn.map_or(0, |turn| turn + 1);
    combat
        .turns()
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, c)| !c.defeated && !(skip_acted && c.acted))
        .map(|(index, _)| index)
}

/// First turn index of a round.
pub fn first_turn_index(combat: &Combat, skip_acted: bool) -> Option<usize> {
    next_turn_index(
        &Combat {
            turn: None,
            ..combat.clone()
        },
        skip_acted,
    )
}

/// Result of ending the current turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnAdvance {
    /// Marks the combatant that just finished as acted.
    pub acted: Option<CombatantUpdate>,
    pub next_turn: Option<usize>,
}

/// End the current turn: mark the current combatant as acted, then find the
/// next turn with that flag already applied.
pub fn end_turn(combat: &Combat, skip_acted: bool) -> TurnAdvance {
    let Some(current) = combat.current() else {
        return TurnAdvance {
            acted: None,
            next_turn: first_turn_index(combat, skip_acted),
        };
    };
    let acted = CombatantUpdate::acted(current.id, true);

    let mut after = combat.clone();
    if let Some(combatant) = after.combatant_mut(current.id) {
        acted.apply(combatant);
    }
    TurnAdvance {
        acted: Some(acted),
        next_turn: next_turn_index(&after, skip_acted),
    }
}

/// A new round clears every acted flag and re-sorts every bracket.
pub fn start_next_round(combat: &Combat) -> Vec<CombatantUpdate> {
    let resets = combat
        .combatants
        .iter()
        .filter(|c| c.acted)
        .map(|c| CombatantUpdate::acted(c.id, false));
    let sorted = set_all(&combat.combatants)
        .into_iter()
        .map(CombatantUpdate::from);
    merge_updates(resets.chain(sorted))
}

/// Apply a batch of updates to a local copy.
pub fn apply_updates(combat: &mut Combat, updates: &[CombatantUpdate]) {
    for update in updates {
        if let Some(combatant) = combat.combatant_mut(update.id) {
            update.apply(combatant);
        }
    }
}
