//! Board configuration parsed from environment variables.
//!
//! Every knob has a default, so `from_env` never fails. Values that parse
//! but make no geometric sense (zero or negative sizes) fall back to the
//! default as well.

use canvas::{CanvasBounds, EngineConfig};
use canvas::consts::{CANVAS_MAX_X, CANVAS_MAX_Y, DEFAULT_NOTE_HEIGHT, DEFAULT_NOTE_WIDTH, EDGE_HIT_SLOP_PX};

pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    pub canvas_max_x: f64,
    pub canvas_max_y: f64,
    pub note_width: f64,
    pub note_height: f64,
    pub edge_hit_slop_px: f64,
    /// Seed for new-note placement. Random per process unless pinned.
    pub rng_seed: u64,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            canvas_max_x: CANVAS_MAX_X,
            canvas_max_y: CANVAS_MAX_Y,
            note_width: DEFAULT_NOTE_WIDTH,
            note_height: DEFAULT_NOTE_HEIGHT,
            edge_hit_slop_px: EDGE_HIT_SLOP_PX,
            rng_seed: 0,
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
        }
    }
}

impl BoardConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `CANVAS_MAX_X`, `CANVAS_MAX_Y`: world extent, default 3000 × 2000
    /// - `NOTE_DEFAULT_WIDTH`, `NOTE_DEFAULT_HEIGHT`: default 250 × 200
    /// - `EDGE_HIT_SLOP_PX`: connection click tolerance, default 6
    /// - `CANVAS_RNG_SEED`: placement seed, random when absent
    /// - `DATABASE_URL`: Postgres; the in-memory store is used when absent
    /// - `DB_MAX_CONNECTIONS`: default 5
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            canvas_max_x: positive(env_parse("CANVAS_MAX_X", CANVAS_MAX_X), CANVAS_MAX_X),
            canvas_max_y: positive(env_parse("CANVAS_MAX_Y", CANVAS_MAX_Y), CANVAS_MAX_Y),
            note_width: positive(env_parse("NOTE_DEFAULT_WIDTH", DEFAULT_NOTE_WIDTH), DEFAULT_NOTE_WIDTH),
            note_height: positive(env_parse("NOTE_DEFAULT_HEIGHT", DEFAULT_NOTE_HEIGHT), DEFAULT_NOTE_HEIGHT),
            edge_hit_slop_px: positive(env_parse("EDGE_HIT_SLOP_PX", EDGE_HIT_SLOP_PX), EDGE_HIT_SLOP_PX),
            rng_seed: env_parse("CANVAS_RNG_SEED", rand::random::<u64>()),
            database_url: std::env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS).max(1),
        }
    }

    /// Engine tunables derived from this config.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            bounds: CanvasBounds { max_x: self.canvas_max_x, max_y: self.canvas_max_y },
            note_width: self.note_width,
            note_height: self.note_height,
            edge_hit_slop_px: self.edge_hit_slop_px,
            seed: self.rng_seed,
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn positive(value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { default }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
