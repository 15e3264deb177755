//! Combat tracker use cases.
//!
//! Turn order lives in initiative brackets; every operation computes the
//! batch of combatant updates in the domain and persists it in one call.

use std::sync::Arc;

use weirdwizard_domain::combat::{self, CombatantUpdate};
use weirdwizard_domain::{Combat, CombatId, CombatantId};

use crate::infrastructure::ports::{
    CombatRepo, DialogPort, HostError, NotificationPort, RepoError, SettingsRepo,
};

#[derive(Debug, thiserror::Error)]
pub enum CombatError {
    #[error("Combat not found: {0}")]
    NotFound(CombatId),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

/// Round and turn after the turn pointer moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnPointer {
    pub round: u32,
    pub turn: Option<usize>,
}

/// Combat operations.
pub struct CombatOps {
    combats: Arc<dyn CombatRepo>,
    dialog: Arc<dyn DialogPort>,
    notifier: Arc<dyn NotificationPort>,
    settings: Arc<dyn SettingsRepo>,
}

impl CombatOps {
    pub fn new(
        combats: Arc<dyn CombatRepo>,
        dialog: Arc<dyn DialogPort>,
        notifier: Arc<dyn NotificationPort>,
        settings: Arc<dyn SettingsRepo>,
    ) -> Self {
        Self {
            combats,
            dialog,
            notifier,
            settings,
        }
    }

    async fn combat(&self, id: CombatId) -> Result<Combat, CombatError> {
        self.combats
            .get(id)
            .await?
            .ok_or(CombatError::NotFound(id))
    }

    async fn persist(
        &self,
        combat: CombatId,
        updates: Vec<CombatantUpdate>,
    ) -> Result<Vec<CombatantUpdate>, CombatError> {
        if !updates.is_empty() {
            self.combats
                .update_combatants(combat, updates.clone())
                .await?;
        }
        Ok(updates)
    }

    async fn confirm(&self, title: &str, content: &str) -> Result<bool, CombatError> {
        Ok(self.dialog.confirm(title, content).await?)
    }

    /// Toggle a player's taking-initiative flag and re-sort every bracket.
    ///
    /// `Ok(None)` for unknown combatants and non-players.
    pub async fn take_initiative(
        &self,
        combat_id: CombatId,
        combatant_id: CombatantId,
        taking: bool,
    ) -> Result<Option<Vec<CombatantUpdate>>, CombatError> {
        tracing::debug!(combat_id = %combat_id, combatant_id = %combatant_id, taking, "Take initiative requested");

        let combat = self.combat(combat_id).await?;
        let Some(updates) = combat::take_initiative(&combat, combatant_id, taking) else {
            tracing::warn!(combat_id = %combat_id, combatant_id = %combatant_id, "Only player characters can take the initiative");
            return Ok(None);
        };
        let updates = self.persist(combat_id, updates).await?;

        if let Some(combatant) = combat.combatant(combatant_id) {
            let message = if taking {
                format!("{} takes the initiative.", combatant.name)
            } else {
                format!("{} no longer takes the initiative.", combatant.name)
            };
            self.notifier.info(&message);
        }
        tracing::info!(combat_id = %combat_id, combatant_id = %combatant_id, taking, "Initiative changed");
        Ok(Some(updates))
    }

    /// Clear a combatant's acted flag after confirmation. The bracket is
    /// unchanged.
    pub async fn reset_acted(
        &self,
        combat_id: CombatId,
        combatant_id: CombatantId,
    ) -> Result<Option<Vec<CombatantUpdate>>, CombatError> {
        let combat = self.combat(combat_id).await?;
        let Some(combatant) = combat.combatant(combatant_id) else {
            tracing::warn!(combat_id = %combat_id, combatant_id = %combatant_id, "Combatant not in combat");
            return Ok(None);
        };
        if !self
            .confirm(
                "Reset Turn",
                &format!("Let {} act again this round?", combatant.name),
            )
            .await?
        {
            tracing::debug!(combatant_id = %combatant_id, "Reset acted declined");
            return Ok(None);
        }

        let updates = self
            .persist(combat_id, vec![CombatantUpdate::acted(combatant_id, false)])
            .await?;
        tracing::info!(combat_id = %combat_id, combatant_id = %combatant_id, "Acted flag reset");
        Ok(Some(updates))
    }

    /// Move a combatant right before the current one, after confirmation.
    pub async fn act_next(
        &self,
        combat_id: CombatId,
        combatant_id: CombatantId,
    ) -> Result<Option<Vec<CombatantUpdate>>, CombatError> {
        let combat = self.combat(combat_id).await?;
        let Some(sorted) = combat::act_next(&combat, combatant_id) else {
            tracing::warn!(combat_id = %combat_id, combatant_id = %combatant_id, "Cannot act next");
            self.notifier
                .warn("Only a combatant in the current combatant's phase can act next.");
            return Ok(None);
        };

        let name = combat
            .combatant(combatant_id)
            .map(|c| c.name.as_str())
            .unwrap_or_default();
        if !self
            .confirm("Act Next", &format!("Should {} act next?", name))
            .await?
        {
            tracing::debug!(combatant_id = %combatant_id, "Act next declined");
            return Ok(None);
        }

        let updates = self
            .persist(
                combat_id,
                sorted.into_iter().map(CombatantUpdate::from).collect(),
            )
            .await?;
        tracing::info!(combat_id = %combat_id, combatant_id = %combatant_id, "Combatant acts next");
        Ok(Some(updates))
    }

    /// Give a combatant another turn at the end of its bracket.
    pub async fn act_again(
        &self,
        combat_id: CombatId,
        combatant_id: CombatantId,
    ) -> Result<Option<Vec<CombatantUpdate>>, CombatError> {
        let combat = self.combat(combat_id).await?;
        let Some(updates) = combat::act_again(&combat, combatant_id) else {
            tracing::warn!(combat_id = %combat_id, combatant_id = %combatant_id, "Cannot act again");
            return Ok(None);
        };

        let updates = self.persist(combat_id, updates).await?;
        tracing::info!(combat_id = %combat_id, combatant_id = %combatant_id, "Combatant acts again");
        Ok(Some(updates))
    }

    /// Drop one tracker row onto another. Unknown ids and cross-bracket
    /// drops change nothing.
    pub async fn reorder(
        &self,
        combat_id: CombatId,
        source: CombatantId,
        target: CombatantId,
        sort_before: Option<bool>,
    ) -> Result<Option<Vec<CombatantUpdate>>, CombatError> {
        let combat = self.combat(combat_id).await?;
        let Some(sorted) = combat::reorder(&combat, source, target, sort_before) else {
            tracing::debug!(combat_id = %combat_id, source = %source, target = %target, "Reorder ignored");
            return Ok(None);
        };

        let updates = self
            .persist(
                combat_id,
                sorted.into_iter().map(CombatantUpdate::from).collect(),
            )
            .await?;
        tracing::info!(combat_id = %combat_id, count = updates.len(), "Combatants reordered");
        Ok(Some(updates))
    }

    /// End the current turn. The acted flag is persisted before the turn
    /// pointer moves; when nobody is left the next round starts.
    pub async fn end_turn(&self, combat_id: CombatId) -> Result<TurnPointer, CombatError> {
        let combat = self.combat(combat_id).await?;
        let settings = self.settings.get().await?;
        let advance = combat::end_turn(&combat, settings.skip_acted);

        if let Some(acted) = advance.acted {
            self.combats
                .update_combatants(combat_id, vec![acted])
                .await?;
        }

        match advance.next_turn {
            Some(turn) => {
                self.combats
                    .set_turn(combat_id, combat.round, Some(turn))
                    .await?;
                tracing::info!(combat_id = %combat_id, round = combat.round, turn, "Turn ended");
                Ok(TurnPointer {
                    round: combat.round,
                    turn: Some(turn),
                })
            }
            None => {
                let mut after = combat;
                if let Some(acted) = advance.acted {
                    combat::apply_updates(&mut after, &[acted]);
                }
                self.begin_round(after, settings.skip_acted).await
            }
        }
    }

    /// Reset every acted flag, re-sort the brackets and move to the first
    /// turn of the next round.
    pub async fn start_next_round(&self, combat_id: CombatId) -> Result<TurnPointer, CombatError> {
        let combat = self.combat(combat_id).await?;
        let settings = self.settings.get().await?;
        self.begin_round(combat, settings.skip_acted).await
    }

    async fn begin_round(
        &self,
        mut combat: Combat,
        skip_acted: bool,
    ) -> Result<TurnPointer, CombatError> {
        let updates = combat::start_next_round(&combat);
        let updates = self.persist(combat.id, updates).await?;
        combat::apply_updates(&mut combat, &updates);

        let round = combat.round + 1;
        let turn = combat::first_turn_index(&combat, skip_acted);
        self.combats.set_turn(combat.id, round, turn).await?;

        tracing::info!(combat_id = %combat.id, round, turn = ?turn, "Round started");
        Ok(TurnPointer { round, turn })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{
        MockCombatRepo, MockDialogPort, MockNotificationPort, MockSettingsRepo,
    };
    use crate::infrastructure::settings::SystemSettings;
    use mockall::predicate::*;
    use mockall::Sequence;
    use weirdwizard_domain::{Combatant, Disposition};

    struct Mocks {
        combats: MockCombatRepo,
        dialog: MockDialogPort,
        notifier: MockNotificationPort,
        settings: MockSettingsRepo,
    }

    impl Mocks {
        fn new(combat: Combat) -> Self {
            let mut combats = MockCombatRepo::new();
            combats
                .expect_get()
                .returning(move |_| Ok(Some(combat.clone())));
            let mut settings = MockSettingsRepo::new();
            settings
                .expect_get()
                .returning(|| Ok(SystemSettings::default()));
            Self {
                combats,
                dialog: MockDialogPort::new(),
                notifier: MockNotificationPort::new(),
                settings,
            }
        }

        fn build(self) -> CombatOps {
            CombatOps::new(
                Arc::new(self.combats),
                Arc::new(self.dialog),
                Arc::new(self.notifier),
                Arc::new(self.settings),
            )
        }
    }

    /// Two allies and two enemies; the first enemy is up.
    fn skirmish() -> Combat {
        let mut combat = Combat::new(vec![
            Combatant::player("Ada").with_initiative(3001),
            Combatant::player("Bo").with_initiative(3002),
            Combatant::npc("Goblin", Disposition::Hostile).with_initiative(2001),
            Combatant::npc("Orc", Disposition::Hostile).with_initiative(2002),
        ]);
        combat.round = 1;
        combat.turn = Some(0);
        combat
    }

    fn initiative_of(updates: &[CombatantUpdate], id: CombatantId) -> Option<i32> {
        updates
            .iter()
            .find(|u| u.id == id)
            .and_then(|u| u.initiative)
    }

    #[tokio::test]
    async fn player_taking_initiative_moves_to_first_bracket() {
        let combat = skirmish();
        let (combat_id, bo) = (combat.id, combat.combatants[1].id);
        let mut mocks = Mocks::new(combat);
        mocks
            .combats
            .expect_update_combatants()
            .with(eq(combat_id), always())
            .times(1)
            .returning(|_, _| Ok(()));
        mocks
            .notifier
            .expect_info()
            .withf(|message| message == "Bo takes the initiative.")
            .times(1)
            .return_const(());

        let updates = mocks
            .build()
            .take_initiative(combat_id, bo, true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(initiative_of(&updates, bo), Some(1001));
        assert!(updates
            .iter()
            .any(|u| u.id == bo && u.taking_initiative == Some(true)));
    }

    #[tokio::test]
    async fn npc_cannot_take_initiative() {
        let combat = skirmish();
        let (combat_id, goblin) = (combat.id, combat.combatants[2].id);
        let mut mocks = Mocks::new(combat);
        mocks.combats.expect_update_combatants().never();

        let updates = mocks
            .build()
            .take_initiative(combat_id, goblin, true)
            .await
            .unwrap();
        assert!(updates.is_none());
    }

    #[tokio::test]
    async fn act_next_cuts_the_line_after_confirmation() {
        let combat = skirmish();
        let (combat_id, goblin, orc) = (
            combat.id,
            combat.combatants[2].id,
            combat.combatants[3].id,
        );
        let mut mocks = Mocks::new(combat);
        mocks.dialog.expect_confirm().returning(|_, _| Ok(true));
        mocks
            .combats
            .expect_update_combatants()
            .times(1)
            .returning(|_, _| Ok(()));

        let updates = mocks.build().act_next(combat_id, orc).await.unwrap().unwrap();
        assert_eq!(initiative_of(&updates, orc), Some(2001));
        assert_eq!(initiative_of(&updates, goblin), Some(2002));
    }

    #[tokio::test]
    async fn declined_act_next_changes_nothing() {
        let combat = skirmish();
        let (combat_id, orc) = (combat.id, combat.combatants[3].id);
        let mut mocks = Mocks::new(combat);
        mocks.dialog.expect_confirm().returning(|_, _| Ok(false));
        mocks.combats.expect_update_combatants().never();

        let updates = mocks.build().act_next(combat_id, orc).await.unwrap();
        assert!(updates.is_none());
    }

    #[tokio::test]
    async fn act_next_across_brackets_warns() {
        let combat = skirmish();
        let (combat_id, ada) = (combat.id, combat.combatants[0].id);
        let mut mocks = Mocks::new(combat);
        mocks.notifier.expect_warn().times(1).return_const(());
        mocks.dialog.expect_confirm().never();
        mocks.combats.expect_update_combatants().never();

        let updates = mocks.build().act_next(combat_id, ada).await.unwrap();
        assert!(updates.is_none());
    }

    #[tokio::test]
    async fn act_again_clears_acted_and_goes_last() {
        let mut combat = skirmish();
        combat.combatants[2].acted = true;
        let (combat_id, goblin) = (combat.id, combat.combatants[2].id);
        let mut mocks = Mocks::new(combat);
        mocks
            .combats
            .expect_update_combatants()
            .times(1)
            .returning(|_, _| Ok(()));

        let updates = mocks.build().act_again(combat_id, goblin).await.unwrap().unwrap();
        let goblin_update = updates.iter().find(|u| u.id == goblin).unwrap();
        assert_eq!(goblin_update.acted, Some(false));
        assert_eq!(goblin_update.initiative, Some(2002));
    }

    #[tokio::test]
    async fn reset_acted_requires_confirmation() {
        let mut combat = skirmish();
        combat.combatants[0].acted = true;
        let (combat_id, ada) = (combat.id, combat.combatants[0].id);
        let mut mocks = Mocks::new(combat);
        mocks.dialog.expect_confirm().returning(|_, _| Ok(true));
        mocks
            .combats
            .expect_update_combatants()
            .withf(move |_, updates| *updates == vec![CombatantUpdate::acted(ada, false)])
            .times(1)
            .returning(|_, _| Ok(()));

        let updates = mocks.build().reset_acted(combat_id, ada).await.unwrap();
        assert!(updates.is_some());
    }

    #[tokio::test]
    async fn reorder_unknown_target_is_a_no_op() {
        let combat = skirmish();
        let (combat_id, ada) = (combat.id, combat.combatants[0].id);
        let mut mocks = Mocks::new(combat);
        mocks.combats.expect_update_combatants().never();

        let updates = mocks
            .build()
            .reorder(combat_id, ada, CombatantId::new(), None)
            .await
            .unwrap();
        assert!(updates.is_none());
    }

    #[tokio::test]
    async fn end_turn_persists_acted_before_advancing() {
        let combat = skirmish();
        let (combat_id, goblin) = (combat.id, combat.combatants[2].id);
        let mut mocks = Mocks::new(combat);
        let mut seq = Sequence::new();
        mocks
            .combats
            .expect_update_combatants()
            .withf(move |_, updates| *updates == vec![CombatantUpdate::acted(goblin, true)])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mocks
            .combats
            .expect_set_turn()
            .with(eq(combat_id), eq(1), eq(Some(1)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let pointer = mocks.build().end_turn(combat_id).await.unwrap();
        assert_eq!(
            pointer,
            TurnPointer {
                round: 1,
                turn: Some(1)
            }
        );
    }

    #[tokio::test]
    async fn last_turn_starts_the_next_round() {
        let mut combat = skirmish();
        combat.turn = Some(3);
        for combatant in combat.combatants.iter_mut().take(3) {
            combatant.acted = true;
        }
        let combat_id = combat.id;
        let mut mocks = Mocks::new(combat);
        mocks
            .combats
            .expect_update_combatants()
            .times(2)
            .returning(|_, _| Ok(()));
        mocks
            .combats
            .expect_set_turn()
            .with(eq(combat_id), eq(2), eq(Some(0)))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let pointer = mocks.build().end_turn(combat_id).await.unwrap();
        assert_eq!(pointer.round, 2);
        assert_eq!(pointer.turn, Some(0));
    }

    #[tokio::test]
    async fn missing_combat_is_an_error() {
        let mut combats = MockCombatRepo::new();
        combats.expect_get().returning(|_| Ok(None));
        let ops = CombatOps::new(
            Arc::new(combats),
            Arc::new(MockDialogPort::new()),
            Arc::new(MockNotificationPort::new()),
            Arc::new(MockSettingsRepo::new()),
        );

        let err = ops.start_next_round(CombatId::new()).await.unwrap_err();
        assert!(matches!(err, CombatError::NotFound(_)));
    }
}
