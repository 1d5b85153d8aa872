use std::io::Read;

/// Tunable rules for a game.
///
/// Fields deserialize from TOML with per-field defaults, so a partial
/// config file (or an empty one) is valid.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Config {
    /// Probability that a spawned tile is a 2; the rest are 4s.
    #[serde(default = "defaults::spawn_rate")]
    pub spawn_rate: f64,

    /// Largest tile value the caller can display. Merges past it still
    /// happen; the engine reports them as oversized.
    #[serde(default = "defaults::max_tile")]
    pub max_tile: u32,

    /// Fixed RNG seed for reproducible games. Seeded from entropy when
    /// omitted.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spawn_rate: defaults::spawn_rate(),
            max_tile: defaults::max_tile(),
            seed: None,
        }
    }
}

impl Config {
    /// Resolve the spawn rate to a sane default (0.9) if it is not a
    /// probability.
    pub fn spawn_rate_or_default(&self) -> f64 {
        match self.spawn_rate {
            rate if rate.is_finite() && (0.0..=1.0).contains(&rate) => rate,
            _ => defaults::spawn_rate(),
        }
    }

    pub fn from_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = std::fs::File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let cfg: Self = toml::from_str(&contents)?;
        Ok(cfg)
    }
}

mod defaults {
    pub fn spawn_rate() -> f64 {
        0.9
    }
    pub fn max_tile() -> u32 {
        4096
    }
}
