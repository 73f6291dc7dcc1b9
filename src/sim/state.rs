//! Entity store and simulation state
//!
//! The store is mutated in place by the step and copied into a
//! [`FrameSnapshot`] once per frame for rendering.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::phase::GamePhase;
use crate::config::{ConfigError, GameConfig};

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyKind {
    #[default]
    Minor,
    Major,
}

impl EnemyKind {
    /// Score awarded for slashing this kind
    pub fn points(self) -> u32 {
        match self {
            EnemyKind::Minor => 1,
            EnemyKind::Major => 5,
        }
    }

    /// Floating label shown on a kill
    pub fn label(self) -> &'static str {
        match self {
            EnemyKind::Minor => "+1",
            EnemyKind::Major => "+5",
        }
    }

    /// Burst color for a kill
    pub fn color(self) -> ColorKey {
        match self {
            EnemyKind::Minor => ColorKey::Cyan,
            EnemyKind::Major => ColorKey::Red,
        }
    }
}

/// Palette entries the renderer knows how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorKey {
    Cyan,
    Red,
}

impl ColorKey {
    pub fn hex(self) -> &'static str {
        match self {
            ColorKey::Cyan => "#22d3ee",
            ColorKey::Red => "#ef4444",
        }
    }
}

/// A falling enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub kind: EnemyKind,
    /// Slashed; no longer hittable and never causes a breach
    pub dead: bool,
    /// Frames elapsed since the enemy was slashed
    pub dead_frames: u32,
}

/// A particle for kill bursts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32, // 0-1, decreases every frame
    pub color: ColorKey,
}

/// A rising score label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingText {
    pub id: u32,
    pub pos: Vec2,
    pub text: String,
    pub life: f32,
}

/// One sample of the slash trail
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub life: f32,
}

/// Authoritative entity collections plus the running score
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    pub enemies: Vec<Enemy>,
    pub particles: Vec<Particle>,
    pub texts: Vec<FloatingText>,
    pub trail: Vec<TrailPoint>,
    pub score: u32,
    /// Next entity ID (kept across resets so renderer keys stay unique)
    next_id: u32,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Spawn an enemy above the viewport at a random column
    pub fn spawn_enemy<R: Rng>(&mut self, rng: &mut R, config: &GameConfig) -> u32 {
        let x = config.spawn_x_min + rng.random::<f32>() * (config.spawn_x_max - config.spawn_x_min);
        let kind = if rng.random::<f32>() < config.major_chance {
            EnemyKind::Major
        } else {
            EnemyKind::Minor
        };
        self.spawn_enemy_at(Vec2::new(x, config.spawn_y), kind)
    }

    /// Place an enemy at an exact position
    pub fn spawn_enemy_at(&mut self, pos: Vec2, kind: EnemyKind) -> u32 {
        let id = self.next_entity_id();
        self.enemies.push(Enemy {
            id,
            pos,
            kind,
            dead: false,
            dead_frames: 0,
        });
        id
    }

    /// Burst of `count` particles flying out of `pos`
    pub fn spawn_explosion<R: Rng>(
        &mut self,
        rng: &mut R,
        pos: Vec2,
        color: ColorKey,
        count: u32,
        speed: f32,
    ) {
        for _ in 0..count {
            let vel = Vec2::new(
                (rng.random::<f32>() - 0.5) * speed,
                (rng.random::<f32>() - 0.5) * speed,
            );
            let id = self.next_entity_id();
            self.particles.push(Particle {
                id,
                pos,
                vel,
                life: 1.0,
                color,
            });
        }
    }

    pub fn spawn_text(&mut self, pos: Vec2, label: &str) {
        let id = self.next_entity_id();
        self.texts.push(FloatingText {
            id,
            pos,
            text: label.to_string(),
            life: 1.0,
        });
    }

    pub fn append_trail_point(&mut self, pos: Vec2) {
        self.trail.push(TrailPoint { pos, life: 1.0 });
    }

    /// Empty all collections and zero the score
    pub fn clear(&mut self) {
        self.enemies.clear();
        self.particles.clear();
        self.texts.clear();
        self.trail.clear();
        self.score = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
            && self.particles.is_empty()
            && self.texts.is_empty()
            && self.trail.is_empty()
    }
}

/// Immutable copy of the store published at each frame boundary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub enemies: Vec<Enemy>,
    pub particles: Vec<Particle>,
    pub texts: Vec<FloatingText>,
    pub trail: Vec<TrailPoint>,
}

impl FrameSnapshot {
    /// Copy the store's collections, reusing this snapshot's allocations
    pub fn publish_from(&mut self, store: &EntityStore) {
        self.enemies.clone_from(&store.enemies);
        self.particles.clone_from(&store.particles);
        self.texts.clone_from(&store.texts);
        self.trail.clone_from(&store.trail);
    }
}

/// Something noteworthy that happened during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    EnemySpawned { id: u32, kind: EnemyKind },
    EnemyKilled { id: u32, kind: EnemyKind, points: u32 },
    Breach { id: u32 },
    Damaged { health: u8 },
    Victory { score: u32 },
    GameOver { score: u32 },
}

/// The whole game: store, rules and session counters
#[derive(Debug, Clone)]
pub struct Simulation {
    pub(crate) config: GameConfig,
    pub(crate) rng: Pcg32,
    pub(crate) seed: u64,
    pub(crate) store: EntityStore,
    pub(crate) snapshot: FrameSnapshot,
    pub(crate) phase: GamePhase,
    pub(crate) health: u8,
    /// Steps taken in the current session
    pub(crate) frame: u64,
    pub(crate) shake: f32,
    pub(crate) shake_frames_left: u32,
}

impl Simulation {
    /// Create a simulation sitting in the menu.
    /// Fails if `config` does not pass [`GameConfig::validate`].
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let health = config.max_health;
        Ok(Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
            seed,
            store: EntityStore::new(),
            snapshot: FrameSnapshot::default(),
            phase: GamePhase::Menu,
            health,
            frame: 0,
            shake: 0.0,
            shake_frames_left: 0,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.store.score
    }

    pub fn health(&self) -> u8 {
        self.health
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Current screen-shake intensity (0 when idle)
    pub fn shake(&self) -> f32 {
        self.shake
    }

    /// Live entity store (read-only outside the step)
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Collections as of the last completed frame
    pub fn snapshot(&self) -> &FrameSnapshot {
        &self.snapshot
    }

    /// Mutable store access for scripted scenarios
    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_monotonic() {
        let mut store = EntityStore::new();
        let a = store.spawn_enemy_at(Vec2::new(50.0, 0.0), EnemyKind::Minor);
        store.spawn_text(Vec2::ZERO, "+1");
        let b = store.spawn_enemy_at(Vec2::new(50.0, 0.0), EnemyKind::Major);
        assert!(b > a);
        assert_eq!(store.texts[0].id, a + 1);
    }

    #[test]
    fn test_spawn_enemy_within_columns() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut store = EntityStore::new();
        for _ in 0..200 {
            store.spawn_enemy(&mut rng, &config);
        }
        assert!(store.enemies.iter().all(|e| (10.0..=90.0).contains(&e.pos.x)));
        assert!(store.enemies.iter().all(|e| e.pos.y == -15.0 && !e.dead));
        let majors = store.enemies.iter().filter(|e| e.kind == EnemyKind::Major).count();
        assert!(majors > 0 && majors < 100);
    }

    #[test]
    fn test_explosion_burst() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut store = EntityStore::new();
        store.spawn_explosion(&mut rng, Vec2::new(30.0, 40.0), ColorKey::Red, 8, 3.0);
        assert_eq!(store.particles.len(), 8);
        for p in &store.particles {
            assert_eq!(p.pos, Vec2::new(30.0, 40.0));
            assert!(p.vel.x.abs() <= 1.5 && p.vel.y.abs() <= 1.5);
            assert_eq!(p.life, 1.0);
            assert_eq!(p.color, ColorKey::Red);
        }
    }

    #[test]
    fn test_clear_keeps_id_counter() {
        let mut store = EntityStore::new();
        store.spawn_enemy_at(Vec2::ZERO, EnemyKind::Minor);
        store.append_trail_point(Vec2::ZERO);
        store.score = 12;
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.score, 0);
        assert_eq!(store.next_entity_id(), 2);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut store = EntityStore::new();
        store.spawn_enemy_at(Vec2::new(1.0, 2.0), EnemyKind::Minor);
        let mut snapshot = FrameSnapshot::default();
        snapshot.publish_from(&store);
        store.enemies[0].pos.y = 99.0;
        assert_eq!(snapshot.enemies[0].pos.y, 2.0);
    }

    #[test]
    fn test_kind_tables() {
        assert_eq!(EnemyKind::Major.points(), 5);
        assert_eq!(EnemyKind::Minor.label(), "+1");
        assert_eq!(EnemyKind::Major.color().hex(), "#ef4444");
    }

    #[test]
    fn test_new_simulation_in_menu() {
        let sim = Simulation::new(GameConfig::default(), 3).unwrap();
        assert_eq!(sim.phase(), GamePhase::Menu);
        assert_eq!(sim.health(), 3);
        assert_eq!(sim.score(), 0);
        assert_eq!(sim.seed(), 3);
        assert!(sim.store().is_empty());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = GameConfig {
            trail_decay: 0.0,
            ..Default::default()
        };
        assert_eq!(
            Simulation::new(config, 1).unwrap_err(),
            ConfigError::Invalid {
                field: "trail_decay",
                reason: "must be positive or entities never expire"
            }
        );

        let config = GameConfig {
            max_health: 0,
            ..Default::default()
        };
        assert!(Simulation::new(config, 1).is_err());
    }
}
