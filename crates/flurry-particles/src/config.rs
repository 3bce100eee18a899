//! Layered simulation configuration
//!
//! Config is loaded with these layers of precedence (highest wins):
//! 1. Environment variables: `FLURRY_CAPACITY`, `FLURRY_BATCH_SIZE`, `FLURRY_SEED`
//! 2. An explicit path, or project-local `flurry.toml`
//! 3. Global: `~/.flurry/config.toml`
//! 4. Built-in defaults
//!
//! Per-frame constants (gravity, fade-in, rotation speed) are expressed in
//! reference frames; the scheduler converts elapsed seconds using
//! `motion.reference_fps`.

use flurry_core::{FlurryError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Drawing surface the particles live on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Population cap and spawn throttling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub capacity: usize,
    /// Spawn requests drained per tick
    pub batch_size: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            capacity: 1500,
            batch_size: 50,
        }
    }
}

/// Flight physics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub reference_fps: f64,
    /// Added to vertical velocity per frame (screen y grows downward)
    pub gravity: f32,
    pub time_scale: f32,
    pub fade_in_rate: f32,
    pub launch_impulse: f32,
    /// Fraction of the horizontal distance to the target applied as initial velocity
    pub pull_factor: f32,
    /// Width of the uniform horizontal velocity noise
    pub velocity_noise: f32,
    /// Width of the uniform spin range, per frame
    pub rotation_speed_range: f32,
    /// Seconds after creation when a flying particle is forced to settle
    pub settle_timeout: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            reference_fps: 60.0,
            gravity: 0.1,
            time_scale: 0.5,
            fade_in_rate: 0.05,
            launch_impulse: 25.0,
            pull_factor: 0.05,
            velocity_noise: 5.0,
            rotation_speed_range: 0.1,
            settle_timeout: 1.0,
        }
    }
}

/// Where resting positions are drawn from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Horizontal half-width of the pile, applied to a cubic-shaped sample
    pub spread: f32,
    /// Vertical band as fractions of the stage height
    pub target_band: [f32; 2],
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            spread: 225.0,
            target_band: [0.65, 0.9],
        }
    }
}

/// Settled-state presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    /// Width of the uniform final rotation range, in radians
    pub rotation_range: f32,
    /// Upper bound of the random depth offset added to the resting y
    pub depth_jitter: f32,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            rotation_range: 0.3,
            depth_jitter: 5.0,
        }
    }
}

/// Known particle kinds and the settled emblem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    pub kinds: Vec<String>,
    pub emblem: String,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            kinds: ["🔥", "✨", "🎁", "💎", "⭐️"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            emblem: "❤️".to_string(),
        }
    }
}

impl AppearanceConfig {
    pub fn is_known(&self, kind: &str) -> bool {
        self.kinds.iter().any(|k| k == kind)
    }
}

/// Local burst-test session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    /// Requests enqueued over the whole session
    pub total: u32,
    /// Number of timer fires the total is spread across
    pub fires: u32,
    /// Seconds between fires
    pub interval: f64,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            total: 1000,
            fires: 60,
            interval: 1.0,
        }
    }
}

/// Top-level simulation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub stage: StageConfig,
    pub population: PopulationConfig,
    pub motion: MotionConfig,
    pub placement: PlacementConfig,
    pub settle: SettleConfig,
    pub appearance: AppearanceConfig,
    pub burst: BurstConfig,
    /// Fixed RNG seed; entropy-seeded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// Load config with layered precedence: defaults < global < project/explicit < env vars
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut merged = toml::Table::new();

        // Layer 1: Global config (~/.flurry/config.toml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                merge_tables(&mut merged, Self::read_table(&global_path)?);
            }
        }

        // Layer 2: explicit path, falling back to project-local flurry.toml
        match explicit {
            Some(path) => merge_tables(&mut merged, Self::read_table(path)?),
            None => {
                let local_path = PathBuf::from("flurry.toml");
                if local_path.exists() {
                    merge_tables(&mut merged, Self::read_table(&local_path)?);
                }
            }
        }

        let mut config: SimulationConfig = toml::Value::Table(merged).try_into()?;

        // Layer 3: Environment variable overrides
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a specific file path only (no global layer, no env)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply overrides from an environment-like lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("FLURRY_CAPACITY") {
            self.population.capacity = parse_env("FLURRY_CAPACITY", &v)?;
        }
        if let Some(v) = lookup("FLURRY_BATCH_SIZE") {
            self.population.batch_size = parse_env("FLURRY_BATCH_SIZE", &v)?;
        }
        if let Some(v) = lookup("FLURRY_SEED") {
            self.seed = Some(parse_env("FLURRY_SEED", &v)?);
        }
        Ok(())
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.population.capacity == 0 {
            return Err(FlurryError::ConfigError(
                "population.capacity must be at least 1".into(),
            ));
        }
        if self.population.batch_size == 0 {
            return Err(FlurryError::ConfigError(
                "population.batch_size must be at least 1".into(),
            ));
        }
        if self.appearance.kinds.is_empty() {
            return Err(FlurryError::ConfigError(
                "appearance.kinds must list at least one kind".into(),
            ));
        }
        if self.stage.width <= 0.0 || self.stage.height <= 0.0 {
            return Err(FlurryError::ConfigError(format!(
                "stage must have a positive size, got {}x{}",
                self.stage.width, self.stage.height
            )));
        }
        if self.motion.reference_fps <= 0.0 {
            return Err(FlurryError::ConfigError(
                "motion.reference_fps must be positive".into(),
            ));
        }
        if self.motion.settle_timeout <= 0.0 {
            return Err(FlurryError::ConfigError(
                "motion.settle_timeout must be positive".into(),
            ));
        }
        let [lo, hi] = self.placement.target_band;
        for (field, value) in [("placement.target_band[0]", lo), ("placement.target_band[1]", hi)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(FlurryError::ValueOutOfRange {
                    field: field.into(),
                    min: 0.0,
                    max: 1.0,
                    value: value as f64,
                });
            }
        }
        if lo > hi {
            return Err(FlurryError::ConfigError(format!(
                "placement.target_band is inverted: [{lo}, {hi}]"
            )));
        }
        if self.burst.fires == 0 || self.burst.interval <= 0.0 {
            return Err(FlurryError::ConfigError(
                "burst.fires and burst.interval must be positive".into(),
            ));
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".flurry").join("config.toml"))
    }

    fn read_table(path: &Path) -> Result<toml::Table> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            FlurryError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }
}

/// Recursively overlay `overlay` onto `base`; nested tables merge, other values replace
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| FlurryError::ConfigError(format!("{key} has an invalid value: {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("flurry_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn default_config_is_sane() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.population.capacity, 1500);
        assert_eq!(config.population.batch_size, 50);
        assert_eq!(config.appearance.kinds.len(), 5);
        assert!(config.appearance.is_known("🔥"));
        assert!(!config.appearance.is_known("🦀"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
[population]
capacity = 200

[motion]
gravity = 0.2
"#,
        )
        .unwrap();
        assert_eq!(config.population.capacity, 200);
        assert_eq!(config.population.batch_size, 50);
        assert!((config.motion.gravity - 0.2).abs() < 1e-6);
        assert!((config.motion.launch_impulse - 25.0).abs() < 1e-6);
    }

    #[test]
    fn load_from_file_reads_sections() {
        let path = temp_config(
            r#"
seed = 7

[appearance]
kinds = ["a", "b"]
emblem = "*"
"#,
        );
        let config = SimulationConfig::load_from_file(&path).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.appearance.kinds, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(config.appearance.emblem, "*");

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = SimulationConfig::default();
        config
            .apply_env_overrides(|key| match key {
                "FLURRY_CAPACITY" => Some("10".into()),
                "FLURRY_SEED" => Some(" 99 ".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.population.capacity, 10);
        assert_eq!(config.population.batch_size, 50);
        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn bad_env_value_is_reported() {
        let mut config = SimulationConfig::default();
        let err = config
            .apply_env_overrides(|key| (key == "FLURRY_BATCH_SIZE").then(|| "lots".into()))
            .unwrap_err();
        assert!(matches!(err, FlurryError::ConfigError(_)));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = SimulationConfig::default();
        config.population.capacity = 0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.placement.target_band = [0.9, 0.65];
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.placement.target_band = [0.5, 1.5];
        assert!(matches!(
            config.validate(),
            Err(FlurryError::ValueOutOfRange { .. })
        ));

        let mut config = SimulationConfig::default();
        config.appearance.kinds.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn merge_overlays_nested_tables() {
        let mut base: toml::Table = toml::from_str(
            r#"
[population]
capacity = 10
batch_size = 5
"#,
        )
        .unwrap();
        let overlay: toml::Table = toml::from_str(
            r#"
[population]
capacity = 20
"#,
        )
        .unwrap();
        merge_tables(&mut base, overlay);
        let config: SimulationConfig = toml::Value::Table(base).try_into().unwrap();
        assert_eq!(config.population.capacity, 20);
        assert_eq!(config.population.batch_size, 5);
    }

    #[test]
    fn toml_round_trip_of_defaults() {
        let config = SimulationConfig::default();
        let text = config.to_toml_string().unwrap();
        let parsed = SimulationConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
