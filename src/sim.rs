use crate::model::{clamp_stat, Action, ActionKind, Mood, PetState, Stats, Tunables};

impl PetState {
    /// One simulation step: decay, hunger/tiredness penalties, action
    /// countdown, mood re-derivation. Infallible by construction.
    pub(crate) fn tick(&mut self, t: &Tunables) {
        self.stats.satiation = (self.stats.satiation - t.satiation_decay).max(0.0);
        self.stats.energy = (self.stats.energy - t.energy_decay).max(0.0);

        if self.stats.satiation < t.hunger_medium {
            self.stats.happiness = (self.stats.happiness - t.hungry_penalty).max(0.0);
        }
        if self.stats.energy < t.energy_low {
            self.stats.happiness = (self.stats.happiness - t.tired_penalty).max(0.0);
        }

        if let Some(action) = &mut self.action {
            if action.remaining > 0 {
                action.remaining -= 1;
            }
        }
        if self.action.as_ref().map_or(false, |a| a.remaining == 0) {
            self.action = None;
        }

        // An active action holds its forced mood until the timer clears.
        if self.action.is_none() {
            self.mood = derive_mood(&self.stats, t);
        }
    }

    pub(crate) fn feed(&mut self, food: &str, satiation_gain: f32, t: &Tunables) -> String {
        self.stats.satiation = clamp_stat(self.stats.satiation + satiation_gain);
        self.stats.energy = (self.stats.energy - t.feed_energy_cost).max(0.0);
        self.stats.happiness = clamp_stat(self.stats.happiness + t.feed_happiness_gain);
        self.mood = Mood::Happy;
        self.action = Some(Action {
            kind: ActionKind::Eating(food.to_string()),
            remaining: t.feed_action_ticks,
        });
        format!("Yum! {food}!")
    }

    pub(crate) fn play(&mut self, activity: &str, happiness_gain: f32, t: &Tunables) -> String {
        self.stats.happiness = clamp_stat(self.stats.happiness + happiness_gain);
        self.stats.energy = (self.stats.energy - t.play_energy_cost).max(0.0);
        self.stats.satiation = (self.stats.satiation - t.play_satiation_cost).max(0.0);
        self.mood = Mood::Excited;
        self.action = Some(Action {
            kind: ActionKind::Playing(activity.to_string()),
            remaining: t.play_action_ticks,
        });
        format!("Let's {activity}!")
    }

    /// Full energy restore, not additive.
    pub(crate) fn sleep(&mut self, t: &Tunables) -> String {
        self.stats.energy = 100.0;
        self.stats.satiation = (self.stats.satiation - t.sleep_satiation_cost).max(0.0);
        self.stats.happiness = clamp_stat(self.stats.happiness + t.sleep_happiness_gain);
        self.mood = Mood::Normal;
        self.action = Some(Action {
            kind: ActionKind::Resting,
            remaining: t.sleep_action_ticks,
        });
        "Zzz... Sweet dreams".to_string()
    }

    pub(crate) fn pat(&mut self, t: &Tunables) {
        self.stats.happiness = clamp_stat(self.stats.happiness + t.pat_happiness_gain);
    }

    /// Mood used for frame selection. Eating/playing remap to their
    /// animation sets without touching the stored mood.
    pub(crate) fn display_mood(&self) -> Mood {
        match &self.action {
            Some(Action {
                kind: ActionKind::Eating(_),
                ..
            }) => Mood::Happy,
            Some(Action {
                kind: ActionKind::Playing(_),
                ..
            }) => Mood::Excited,
            _ => self.mood,
        }
    }
}

/// Pure function of the three meters. Priority order is frozen: the
/// energy rule shadows everything after it, so a tired pet reads Normal
/// no matter how happy or hungry it is.
pub(crate) fn derive_mood(stats: &Stats, t: &Tunables) -> Mood {
    if stats.energy < t.energy_low {
        Mood::Normal
    } else if stats.satiation < t.hunger_low {
        Mood::Upset
    } else if stats.satiation < t.hunger_medium {
        Mood::Angry
    } else if stats.happiness > t.happiness_very_high {
        Mood::Love
    } else if stats.happiness > t.happiness_high {
        Mood::Happy
    } else if stats.happiness < t.happiness_low {
        Mood::MostAngry
    } else {
        Mood::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pet(satiation: f32, energy: f32, happiness: f32) -> PetState {
        PetState {
            stats: Stats {
                satiation,
                energy,
                happiness,
            },
            mood: Mood::Normal,
            action: None,
        }
    }

    fn in_range(st: &Stats) -> bool {
        (0.0..=100.0).contains(&st.satiation)
            && (0.0..=100.0).contains(&st.energy)
            && (0.0..=100.0).contains(&st.happiness)
    }

    #[test]
    fn ticks_never_leave_range() {
        let t = Tunables::default();
        let mut p = pet(0.5, 0.2, 0.3);
        for _ in 0..10_000 {
            p.tick(&t);
            assert!(in_range(&p.stats), "out of range: {:?}", p.stats);
        }
    }

    #[test]
    fn actions_clamp_at_both_boundaries() {
        let t = Tunables::default();

        let mut p = pet(100.0, 0.0, 100.0);
        p.feed("Cake", 40.0, &t);
        assert!(in_range(&p.stats));
        assert_eq!(p.stats.satiation, 100.0);
        assert_eq!(p.stats.energy, 0.0);

        let mut p = pet(0.0, 0.0, 0.0);
        p.play("Running", 15.0, &t);
        assert!(in_range(&p.stats));
        assert_eq!(p.stats.satiation, 0.0);
        assert_eq!(p.stats.energy, 0.0);

        let mut p = pet(0.0, 100.0, 100.0);
        p.sleep(&t);
        assert!(in_range(&p.stats));
    }

    #[test]
    fn sleep_restores_energy_exactly() {
        let t = Tunables::default();
        let mut p = pet(60.0, 0.0, 50.0);
        p.sleep(&t);
        assert_eq!(p.stats.energy, 100.0);
        let mut p = pet(60.0, 100.0, 50.0);
        p.sleep(&t);
        assert_eq!(p.stats.energy, 100.0);
    }

    #[test]
    fn mood_priority_energy_wins() {
        let t = Tunables::default();
        // Starving and exhausted but ecstatic: energy rule shadows Love.
        let st = Stats {
            satiation: 10.0,
            energy: 10.0,
            happiness: 90.0,
        };
        assert_eq!(derive_mood(&st, &t), Mood::Normal);
    }

    #[test]
    fn love_unreachable_when_hungry() {
        // Frozen quirk of the priority order: a starving pet never shows
        // Love regardless of happiness.
        let t = Tunables::default();
        let st = Stats {
            satiation: 10.0,
            energy: 90.0,
            happiness: 99.0,
        };
        assert_eq!(derive_mood(&st, &t), Mood::Upset);
    }

    #[test]
    fn mood_threshold_ladder() {
        let t = Tunables::default();
        let m = |s, e, h| {
            derive_mood(
                &Stats {
                    satiation: s,
                    energy: e,
                    happiness: h,
                },
                &t,
            )
        };
        assert_eq!(m(60.0, 80.0, 90.0), Mood::Love);
        assert_eq!(m(60.0, 80.0, 75.0), Mood::Happy);
        assert_eq!(m(60.0, 80.0, 30.0), Mood::MostAngry);
        assert_eq!(m(60.0, 80.0, 55.0), Mood::Normal);
        assert_eq!(m(30.0, 80.0, 90.0), Mood::Angry);
        // Exactly at a `>` threshold does not cross it.
        assert_eq!(m(60.0, 80.0, 70.0), Mood::Normal);
    }

    #[test]
    fn feed_forces_happy_then_reverts_on_expiry() {
        let t = Tunables::default();
        let mut p = pet(60.0, 80.0, 50.0);
        let speech = p.feed("Cake", 40.0, &t);
        assert_eq!(speech, "Yum! Cake!");
        assert_eq!(p.mood, Mood::Happy);
        assert!(matches!(
            p.action.as_ref().map(|a| &a.kind),
            Some(ActionKind::Eating(f)) if f == "Cake"
        ));
        assert_eq!(p.display_mood(), Mood::Happy);

        // Forced mood holds for the whole countdown.
        for _ in 0..59 {
            p.tick(&t);
            assert_eq!(p.mood, Mood::Happy);
            assert!(p.action.is_some());
        }
        // 60th tick clears the action and re-derives from the meters.
        p.tick(&t);
        assert!(p.action.is_none());
        assert_eq!(p.mood, derive_mood(&p.stats, &t));
    }

    #[test]
    fn playing_remaps_display_mood_only() {
        let t = Tunables::default();
        let mut p = pet(60.0, 80.0, 50.0);
        p.play("Dancing", 30.0, &t);
        p.mood = Mood::Angry; // stored mood irrelevant to frame choice
        assert_eq!(p.display_mood(), Mood::Excited);
        assert_eq!(p.mood, Mood::Angry);
    }

    #[test]
    fn resting_holds_normal_without_remapping() {
        let t = Tunables::default();
        let mut p = pet(60.0, 10.0, 95.0);
        p.sleep(&t);
        assert_eq!(p.mood, Mood::Normal);
        assert_eq!(p.display_mood(), Mood::Normal);
        p.tick(&t);
        // Still resting: no re-derivation even though happiness > 85.
        assert_eq!(p.mood, Mood::Normal);
    }

    #[test]
    fn fifty_tick_decay_scenario() {
        let t = Tunables::default();
        let mut p = pet(60.0, 80.0, 70.0);
        for _ in 0..50 {
            p.tick(&t);
        }
        assert!((p.stats.satiation - 59.96).abs() < 1e-3, "{}", p.stats.satiation);
        assert!((p.stats.energy - 79.985).abs() < 1e-3, "{}", p.stats.energy);
        assert_eq!(p.stats.happiness, 70.0);
        assert_eq!(p.mood, Mood::Normal);
    }

    #[test]
    fn hungry_and_tired_penalties_stack() {
        let t = Tunables::default();
        let mut p = pet(30.0, 10.0, 50.0);
        p.tick(&t);
        let expected = 50.0 - t.hungry_penalty - t.tired_penalty;
        assert!((p.stats.happiness - expected).abs() < 1e-4);
    }
}
