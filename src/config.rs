//! Game tuning
//!
//! Every balance constant lives in one immutable [`GameConfig`] handed to the
//! simulation at construction. Partial JSON documents override only the fields
//! they name.

use core::fmt;

use serde::{Deserialize, Serialize};

/// How long a slashed enemy stays in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DeadEnemyGrace {
    /// Keep falling (as an explosion) until culled below the viewport
    #[default]
    UntilOffscreen,
    /// Remove after this many frames; `0` removes it in the kill frame
    Frames(u32),
}

/// How breaches within one frame turn into damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BreachDamage {
    /// One health point per breaching enemy
    #[default]
    PerEnemy,
    /// One health point per frame with at least one breach
    PerFrame,
}

/// Error from loading or validating a [`GameConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document is not valid JSON for this schema
    Parse(String),
    /// A field holds a value the simulation cannot run with
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::Invalid { field, reason } => write!(f, "invalid config field `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Game balance configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Difficulty ===
    /// Fall speed at score 0 (viewport units per frame)
    pub start_speed: f32,
    /// Fall speed cap
    pub max_speed: f32,
    /// Fall speed gained per score point
    pub speed_per_point: f32,
    /// Spawn probability per frame at score 0
    pub spawn_chance_base: f32,
    /// Spawn probability gained per score point
    pub spawn_chance_per_point: f32,
    /// Optional ceiling on spawn probability (unbounded when `None`)
    pub spawn_chance_cap: Option<f32>,
    /// Probability a spawned enemy is the major kind
    pub major_chance: f32,

    // === Rules ===
    /// Score that ends the session in victory
    pub win_score: u32,
    /// Starting (and maximum) health
    pub max_health: u8,
    /// Pointer-to-enemy distance that counts as a hit (strictly less than)
    pub hit_radius: f32,

    // === Spawn geometry ===
    pub spawn_y: f32,
    pub spawn_x_min: f32,
    pub spawn_x_max: f32,
    /// Enemies below this row are culled; live ones cause a breach
    pub despawn_y: f32,
    pub dead_enemy_grace: DeadEnemyGrace,
    pub breach_damage: BreachDamage,

    // === Effects ===
    /// Particles per kill
    pub burst_size: u32,
    /// Particle velocity spread (each axis in `-s/2..s/2`)
    pub burst_speed: f32,
    pub particle_decay: f32,
    pub text_decay: f32,
    /// Upward drift of score labels per frame
    pub text_rise: f32,
    pub trail_decay: f32,
    pub shake_intensity: f32,
    /// Frames a shake pulse lasts
    pub shake_frames: u32,

    // === Timing ===
    /// Run steps at a fixed rate instead of once per host callback
    pub fixed_step_hz: Option<f32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_speed: 0.5,
            max_speed: 2.2,
            speed_per_point: 0.02,
            spawn_chance_base: 0.015,
            spawn_chance_per_point: 0.0004,
            spawn_chance_cap: None,
            major_chance: 0.15,

            win_score: 100,
            max_health: 3,
            hit_radius: 10.0,

            spawn_y: -15.0,
            spawn_x_min: 10.0,
            spawn_x_max: 90.0,
            despawn_y: 105.0,
            dead_enemy_grace: DeadEnemyGrace::UntilOffscreen,
            breach_damage: BreachDamage::PerEnemy,

            burst_size: 8,
            burst_speed: 3.0,
            particle_decay: 0.06,
            text_decay: 0.03,
            text_rise: 0.5,
            trail_decay: 0.15,
            shake_intensity: 10.0,
            shake_frames: 18,

            fixed_step_hz: None,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Fall speed for the given score
    pub fn speed_for_score(&self, score: u32) -> f32 {
        (self.start_speed + score as f32 * self.speed_per_point).min(self.max_speed)
    }

    /// Per-frame spawn probability for the given score
    pub fn spawn_chance_for_score(&self, score: u32) -> f32 {
        let chance = self.spawn_chance_base + score as f32 * self.spawn_chance_per_point;
        match self.spawn_chance_cap {
            Some(cap) => chance.min(cap),
            None => chance,
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("start_speed", self.start_speed),
            ("max_speed", self.max_speed),
            ("speed_per_point", self.speed_per_point),
            ("spawn_chance_base", self.spawn_chance_base),
            ("spawn_chance_per_point", self.spawn_chance_per_point),
            ("major_chance", self.major_chance),
            ("hit_radius", self.hit_radius),
            ("spawn_y", self.spawn_y),
            ("spawn_x_min", self.spawn_x_min),
            ("spawn_x_max", self.spawn_x_max),
            ("despawn_y", self.despawn_y),
            ("burst_speed", self.burst_speed),
            ("particle_decay", self.particle_decay),
            ("text_decay", self.text_decay),
            ("text_rise", self.text_rise),
            ("trail_decay", self.trail_decay),
            ("shake_intensity", self.shake_intensity),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(invalid(field, "must be finite"));
            }
        }

        if self.start_speed < 0.0 {
            return Err(invalid("start_speed", "must not be negative"));
        }
        if self.max_speed < self.start_speed {
            return Err(invalid("max_speed", "must be at least start_speed"));
        }
        if self.speed_per_point < 0.0 {
            return Err(invalid("speed_per_point", "must not be negative"));
        }
        if self.spawn_chance_per_point < 0.0 {
            return Err(invalid("spawn_chance_per_point", "must not be negative"));
        }
        if !(0.0..=1.0).contains(&self.spawn_chance_base) {
            return Err(invalid("spawn_chance_base", "must be within 0..=1"));
        }
        if self
            .spawn_chance_cap
            .is_some_and(|cap| !(cap.is_finite() && (0.0..=1.0).contains(&cap)))
        {
            return Err(invalid("spawn_chance_cap", "must be within 0..=1"));
        }
        if !(0.0..=1.0).contains(&self.major_chance) {
            return Err(invalid("major_chance", "must be within 0..=1"));
        }
        if self.win_score == 0 {
            return Err(invalid("win_score", "must be positive"));
        }
        if self.max_health == 0 {
            return Err(invalid("max_health", "must be positive"));
        }
        if self.hit_radius <= 0.0 {
            return Err(invalid("hit_radius", "must be positive"));
        }
        if self.spawn_x_min > self.spawn_x_max {
            return Err(invalid("spawn_x_min", "must not exceed spawn_x_max"));
        }
        if self.despawn_y <= self.spawn_y {
            return Err(invalid("despawn_y", "must be below spawn_y"));
        }
        for (field, decay) in [
            ("particle_decay", self.particle_decay),
            ("text_decay", self.text_decay),
            ("trail_decay", self.trail_decay),
        ] {
            if decay <= 0.0 {
                return Err(invalid(field, "must be positive or entities never expire"));
            }
        }
        if self
            .fixed_step_hz
            .is_some_and(|hz| !(hz.is_finite() && hz > 0.0))
        {
            return Err(invalid("fixed_step_hz", "must be positive"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
