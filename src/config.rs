use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

/// Full configuration surface. Every field carries its own serde default
/// so a user file only needs the keys it wants to override; unknown keys
/// are ignored and a missing or unreadable file falls back wholesale.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Settings {
    #[serde(default = "default_pet_size")]
    pub(crate) pet_size: u16,
    #[serde(default = "default_latitude")]
    pub(crate) latitude: f64,
    #[serde(default = "default_longitude")]
    pub(crate) longitude: f64,
    #[serde(default = "default_pet_name")]
    pub(crate) pet_name: String,
    #[serde(default = "default_location_name")]
    pub(crate) location_name: String,
    #[serde(default = "default_true")]
    pub(crate) window_topmost: bool,
    #[serde(default = "default_true")]
    pub(crate) enable_weather: bool,
    #[serde(default = "default_true")]
    pub(crate) enable_audio: bool,
    #[serde(default = "default_true")]
    pub(crate) enable_bgm: bool,
    #[serde(default = "default_sfx_volume")]
    pub(crate) sfx_volume: f32,
    #[serde(default = "default_bgm_volume")]
    pub(crate) bgm_volume: f32,
    #[serde(default = "default_sounds_dir")]
    pub(crate) sounds_dir: PathBuf,
    #[serde(default = "default_foods")]
    pub(crate) foods: BTreeMap<String, f32>,
    #[serde(default = "default_plays")]
    pub(crate) plays: BTreeMap<String, f32>,
}

fn default_pet_size() -> u16 {
    150
}
// Sydney
fn default_latitude() -> f64 {
    -33.8688
}
fn default_longitude() -> f64 {
    151.2093
}
fn default_pet_name() -> String {
    "Luchen".to_string()
}
fn default_location_name() -> String {
    "Sydney".to_string()
}
fn default_true() -> bool {
    true
}
fn default_sfx_volume() -> f32 {
    0.7
}
fn default_bgm_volume() -> f32 {
    0.3
}
fn default_sounds_dir() -> PathBuf {
    PathBuf::from("sounds")
}

fn default_foods() -> BTreeMap<String, f32> {
    BTreeMap::from([
        ("Rice".to_string(), 30.0),
        ("Meat".to_string(), 50.0),
        ("Fruit".to_string(), 20.0),
        ("Cake".to_string(), 40.0),
    ])
}

fn default_plays() -> BTreeMap<String, f32> {
    BTreeMap::from([
        ("Hide-and-seek".to_string(), 25.0),
        ("Running".to_string(), 15.0),
        ("Dancing".to_string(), 30.0),
        ("Chat".to_string(), 20.0),
    ])
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pet_size: default_pet_size(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            pet_name: default_pet_name(),
            location_name: default_location_name(),
            window_topmost: true,
            enable_weather: true,
            enable_audio: true,
            enable_bgm: true,
            sfx_volume: default_sfx_volume(),
            bgm_volume: default_bgm_volume(),
            sounds_dir: default_sounds_dir(),
            foods: default_foods(),
            plays: default_plays(),
        }
    }
}

pub(crate) struct Paths {
    pub(crate) save_path: PathBuf,
    pub(crate) settings_path: PathBuf,
}

pub(crate) fn project_paths(data_dir: Option<&Path>) -> Result<Paths> {
    let dir = match data_dir {
        Some(d) => d.to_path_buf(),
        None => {
            let proj = ProjectDirs::from("com", "termipet", "Termipet")
                .context("could not resolve project directories")?;
            proj.data_local_dir().to_path_buf()
        }
    };
    fs::create_dir_all(&dir).ok();
    Ok(Paths {
        save_path: dir.join("pet_data.json"),
        settings_path: dir.join("pet_config.json"),
    })
}

pub(crate) fn load_settings(path: &Path) -> Settings {
    match fs::read_to_string(path) {
        Ok(s) => match serde_json::from_str::<Settings>(&s) {
            Ok(v) => {
                info!("config loaded from {}", path.display());
                return v;
            }
            Err(e) => warn!("config parse failed, using defaults: {e}"),
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("config read failed, using defaults: {e}"),
    }
    Settings::default()
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data)?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

pub(crate) fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // Best-effort atomic replace on same filesystem.
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let s = Settings::default();
        assert_eq!(s.pet_name, "Luchen");
        assert_eq!(s.location_name, "Sydney");
        assert!((s.latitude - -33.8688).abs() < 1e-9);
        assert!(s.enable_weather && s.enable_audio && s.enable_bgm);
        assert_eq!(s.foods.get("Meat"), Some(&50.0));
        assert_eq!(s.plays.get("Dancing"), Some(&30.0));
        assert_eq!(s.foods.len(), 4);
        assert_eq!(s.plays.len(), 4);
    }

    #[test]
    fn user_file_overrides_key_by_key() {
        let s: Settings = serde_json::from_str(
            r#"{"pet_name":"Momo","enable_weather":false,"foods":{"Toast":10}}"#,
        )
        .unwrap();
        assert_eq!(s.pet_name, "Momo");
        assert!(!s.enable_weather);
        assert_eq!(s.foods.get("Toast"), Some(&10.0));
        // Untouched keys keep their defaults.
        assert_eq!(s.location_name, "Sydney");
        assert_eq!(s.plays.len(), 4);
        assert_eq!(s.sfx_volume, 0.7);
    }

    #[test]
    fn settings_round_trip() {
        let mut s = Settings::default();
        s.bgm_volume = 0.9;
        let json = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.bgm_volume, 0.9);
        assert_eq!(back.pet_name, s.pet_name);
    }
}
