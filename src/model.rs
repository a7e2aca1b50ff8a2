use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub(crate) fn clamp_stat(v: f32) -> f32 {
    v.clamp(0.0, 100.0)
}

/// Derived display/behavior category. Never written directly by callers;
/// set only by mood derivation or as the forced side effect of an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Mood {
    Normal,
    Happy,
    Love,
    Angry,
    Upset,
    Excited,
    MostAngry,
}

impl Mood {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Mood::Normal => "normal",
            Mood::Happy => "happy",
            Mood::Love => "love",
            Mood::Angry => "angry",
            Mood::Upset => "upset",
            Mood::Excited => "excited",
            Mood::MostAngry => "most angry",
        }
    }
}

/// What the pet is transiently doing. The food / activity name is carried
/// for the speech line; frame selection keys off the variant alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ActionKind {
    Eating(String),
    Playing(String),
    Resting,
}

#[derive(Clone, Debug)]
pub(crate) struct Action {
    pub(crate) kind: ActionKind,
    pub(crate) remaining: u32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub(crate) struct Stats {
    pub(crate) satiation: f32,
    pub(crate) energy: f32,
    pub(crate) happiness: f32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            satiation: 60.0,
            energy: 80.0,
            happiness: 70.0,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct PetState {
    pub(crate) stats: Stats,
    pub(crate) mood: Mood,
    pub(crate) action: Option<Action>,
}

impl Default for PetState {
    fn default() -> Self {
        Self {
            stats: Stats::default(),
            mood: Mood::Normal,
            action: None,
        }
    }
}

impl PetState {
    /// Rebuild from a persisted snapshot. Values are clamped rather than
    /// rejected; transient action / forced mood are never resurrected.
    pub(crate) fn from_snapshot(snap: &PetSnapshot) -> Self {
        Self {
            stats: Stats {
                satiation: clamp_stat(snap.satiation),
                energy: clamp_stat(snap.energy),
                happiness: clamp_stat(snap.happiness),
            },
            mood: Mood::Normal,
            action: None,
        }
    }

    pub(crate) fn snapshot(&self, now: DateTime<Utc>) -> PetSnapshot {
        PetSnapshot {
            satiation: self.stats.satiation,
            energy: self.stats.energy,
            happiness: self.stats.happiness,
            timestamp: now,
        }
    }
}

/// The persisted blob: just the three meters and a write timestamp.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct PetSnapshot {
    pub(crate) satiation: f32,
    pub(crate) energy: f32,
    pub(crate) happiness: f32,
    pub(crate) timestamp: DateTime<Utc>,
}

/// Every behavior constant in one place, passed explicitly to whoever
/// needs it instead of living in a global.
#[derive(Clone, Debug)]
pub(crate) struct Tunables {
    pub(crate) satiation_decay: f32,
    pub(crate) energy_decay: f32,
    pub(crate) hungry_penalty: f32,
    pub(crate) tired_penalty: f32,

    pub(crate) hunger_low: f32,
    pub(crate) hunger_medium: f32,
    pub(crate) energy_low: f32,
    pub(crate) happiness_low: f32,
    pub(crate) happiness_high: f32,
    pub(crate) happiness_very_high: f32,

    pub(crate) feed_energy_cost: f32,
    pub(crate) feed_happiness_gain: f32,
    pub(crate) feed_action_ticks: u32,
    pub(crate) play_energy_cost: f32,
    pub(crate) play_satiation_cost: f32,
    pub(crate) play_action_ticks: u32,
    pub(crate) sleep_satiation_cost: f32,
    pub(crate) sleep_happiness_gain: f32,
    pub(crate) sleep_action_ticks: u32,
    pub(crate) pat_happiness_gain: f32,

    pub(crate) tick_ms: u64,
    pub(crate) save_interval_ticks: u64,
    pub(crate) frame_speed: u64,
    pub(crate) weather_refresh_secs: u64,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            satiation_decay: 0.0008,
            energy_decay: 0.0003,
            hungry_penalty: 0.15,
            tired_penalty: 0.1,

            hunger_low: 25.0,
            hunger_medium: 40.0,
            energy_low: 25.0,
            happiness_low: 40.0,
            happiness_high: 70.0,
            happiness_very_high: 85.0,

            feed_energy_cost: 5.0,
            feed_happiness_gain: 5.0,
            feed_action_ticks: 60,
            play_energy_cost: 20.0,
            play_satiation_cost: 10.0,
            play_action_ticks: 70,
            sleep_satiation_cost: 5.0,
            sleep_happiness_gain: 5.0,
            sleep_action_ticks: 120,
            pat_happiness_gain: 5.0,

            tick_ms: 50,
            save_interval_ticks: 3000,
            frame_speed: 5,
            weather_refresh_secs: 1800,
        }
    }
}
