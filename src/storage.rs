use crate::config::atomic_rename;
use crate::model::{PetSnapshot, PetState};
use anyhow::Result;
use std::{fs, path::Path};
use tracing::{info, warn};

/// Load the persisted pet, or start fresh on any failure. Out-of-range
/// values are clamped on load rather than rejected; a snapshot never
/// carries an action or forced mood.
pub(crate) fn load_or_default(path: &Path) -> PetState {
    match fs::read_to_string(path) {
        Ok(s) => match serde_json::from_str::<PetSnapshot>(&s) {
            Ok(snap) => {
                info!("pet data loaded from {}", path.display());
                return PetState::from_snapshot(&snap);
            }
            Err(e) => warn!("pet data parse failed, starting fresh: {e}"),
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("no saved pet, starting fresh");
        }
        Err(e) => warn!("pet data read failed, starting fresh: {e}"),
    }
    PetState::default()
}

pub(crate) fn save_atomic(path: &Path, snap: &PetSnapshot) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(snap)?;
    fs::write(&tmp, data)?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, ActionKind, Mood};
    use chrono::Utc;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("termipet-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn round_trip_preserves_meters_and_drops_transients() {
        let path = scratch("roundtrip");
        let mut pet = PetState::default();
        pet.stats.satiation = 42.5;
        pet.stats.happiness = 91.0;
        pet.mood = Mood::Love;
        pet.action = Some(Action {
            kind: ActionKind::Eating("Cake".to_string()),
            remaining: 30,
        });

        save_atomic(&path, &pet.snapshot(Utc::now())).unwrap();
        let loaded = load_or_default(&path);
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.stats.satiation, 42.5);
        assert_eq!(loaded.stats.energy, pet.stats.energy);
        assert_eq!(loaded.stats.happiness, 91.0);
        assert_eq!(loaded.mood, Mood::Normal);
        assert!(loaded.action.is_none());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let pet = load_or_default(Path::new("/nonexistent/termipet/pet_data.json"));
        assert_eq!(pet.stats.satiation, 60.0);
        assert_eq!(pet.stats.energy, 80.0);
        assert_eq!(pet.stats.happiness, 70.0);
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let path = scratch("corrupt");
        std::fs::write(&path, b"{not json").unwrap();
        let pet = load_or_default(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(pet.stats.satiation, 60.0);
    }

    #[test]
    fn out_of_range_values_are_clamped_on_load() {
        let snap = PetSnapshot {
            satiation: 250.0,
            energy: -4.0,
            happiness: 100.0,
            timestamp: Utc::now(),
        };
        let pet = PetState::from_snapshot(&snap);
        assert_eq!(pet.stats.satiation, 100.0);
        assert_eq!(pet.stats.energy, 0.0);
        assert_eq!(pet.stats.happiness, 100.0);
    }
}
