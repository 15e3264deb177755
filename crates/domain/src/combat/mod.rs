//! Combat turn order: initiative brackets and dense in-bracket sorting.

mod combatant;
mod scheduler;

pub use combatant::{Combat, Combatant, ALLY_BRACKET, ENEMY_BRACKET, TAKING_INITIATIVE_BRACKET};
pub use scheduler::{
    act_again, act_next, apply_updates, end_turn, first_turn_index, merge_updates,
    next_turn_index, perform_integer_sort, reorder, set_all, start_next_round, take_initiative,
    CombatantUpdate, SortUpdate, TurnAdvance,
};
