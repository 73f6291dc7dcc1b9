//! Per-frame simulation step
//!
//! Advances the game by exactly one host frame. Speeds and decay rates are
//! expressed per step, not per second, so difficulty follows the display's
//! refresh rate unless the host uses a fixed-rate clock.

use glam::Vec2;
use rand::Rng;

use super::collision::{below_boundary, pointer_hits};
use super::phase::GamePhase;
use super::state::{EnemyKind, GameEvent, Simulation};
use crate::config::{BreachDamage, DeadEnemyGrace};

/// Pointer state for a single step, copied from the tracker at frame start
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSample {
    /// Normalized position; `None` until the pointer is first seen
    pub pos: Option<Vec2>,
    /// Pointer/touch is pressed
    pub held: bool,
}

impl PointerSample {
    /// Pressed at a position (convenience for scripted input)
    pub fn held_at(x: f32, y: f32) -> Self {
        Self {
            pos: Some(Vec2::new(x, y)),
            held: true,
        }
    }

    /// The slash point, only while pressed
    pub fn active_point(&self) -> Option<Vec2> {
        if self.held { self.pos } else { None }
    }
}

/// What a step did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub events: Vec<GameEvent>,
    /// Phase after the step
    pub phase: GamePhase,
}

impl StepReport {
    pub fn kills(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyKilled { .. }))
            .count()
    }

    pub fn breaches(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, GameEvent::Breach { .. }))
            .count()
    }
}

impl Simulation {
    /// Start (or restart) a session. Ignored while a session is running.
    pub fn start(&mut self) -> bool {
        if !self.phase.can_start() {
            return false;
        }
        self.store.clear();
        self.health = self.config.max_health;
        self.frame = 0;
        self.shake = 0.0;
        self.shake_frames_left = 0;
        self.phase = GamePhase::Playing;
        self.snapshot.publish_from(&self.store);
        log::info!("Session started (seed {})", self.seed);
        true
    }

    /// Advance the session by one frame
    pub fn step(&mut self, input: &PointerSample) -> StepReport {
        let mut events = Vec::new();
        if self.phase != GamePhase::Playing {
            return StepReport {
                events,
                phase: self.phase,
            };
        }

        self.frame += 1;
        self.tick_shake();

        // Difficulty from the score at frame start
        let score = self.store.score;
        let speed = self.config.speed_for_score(score);
        let spawn_chance = self.config.spawn_chance_for_score(score);

        // Slash trail
        let pointer = input.active_point();
        if let Some(p) = pointer {
            self.store.append_trail_point(p);
        }

        // Spawning (roll drawn every frame to keep the RNG stream aligned)
        if self.rng.random::<f32>() < spawn_chance {
            let id = self.store.spawn_enemy(&mut self.rng, &self.config);
            let kind = self
                .store
                .enemies
                .last()
                .map(|e| e.kind)
                .unwrap_or_default();
            events.push(GameEvent::EnemySpawned { id, kind });
        }

        let breaches = self.advance_enemies(speed, &mut events);
        self.age_effects();

        if let Some(p) = pointer {
            self.resolve_hits(p, &mut events);
        }
        self.prune_dead_enemies();

        if breaches > 0 {
            self.apply_damage(breaches, &mut events);
        }

        self.snapshot.publish_from(&self.store);

        StepReport {
            events,
            phase: self.phase,
        }
    }

    /// Move enemies down, cull those past the boundary, count breaches
    fn advance_enemies(&mut self, speed: f32, events: &mut Vec<GameEvent>) -> u32 {
        let despawn_y = self.config.despawn_y;
        let mut breaches = 0;
        self.store.enemies.retain_mut(|enemy| {
            enemy.pos.y += speed;
            if enemy.dead {
                enemy.dead_frames = enemy.dead_frames.saturating_add(1);
            }
            if below_boundary(enemy.pos, despawn_y) {
                if !enemy.dead {
                    breaches += 1;
                    events.push(GameEvent::Breach { id: enemy.id });
                }
                return false;
            }
            true
        });
        breaches
    }

    /// Age particles, labels and the trail; drop anything expired
    fn age_effects(&mut self) {
        let particle_decay = self.config.particle_decay;
        for particle in &mut self.store.particles {
            particle.pos += particle.vel;
            particle.life -= particle_decay;
        }
        self.store.particles.retain(|p| p.life > 0.0);

        let text_decay = self.config.text_decay;
        let text_rise = self.config.text_rise;
        for text in &mut self.store.texts {
            text.pos.y -= text_rise;
            text.life -= text_decay;
        }
        self.store.texts.retain(|t| t.life > 0.0);

        let trail_decay = self.config.trail_decay;
        for point in &mut self.store.trail {
            point.life -= trail_decay;
        }
        self.store.trail.retain(|t| t.life > 0.0);
    }

    /// Slash every live enemy near the pointer
    fn resolve_hits(&mut self, pointer: Vec2, events: &mut Vec<GameEvent>) {
        let radius = self.config.hit_radius;

        // Collect kills first (spawning effects needs the store mutably)
        let mut kills: Vec<(u32, Vec2, EnemyKind)> = Vec::new();
        for enemy in &mut self.store.enemies {
            if enemy.dead || !pointer_hits(enemy.pos, pointer, radius) {
                continue;
            }
            enemy.dead = true;
            enemy.dead_frames = 0;
            kills.push((enemy.id, enemy.pos, enemy.kind));
        }

        if kills.is_empty() {
            return;
        }

        for (id, pos, kind) in kills {
            self.store.spawn_explosion(
                &mut self.rng,
                pos,
                kind.color(),
                self.config.burst_size,
                self.config.burst_speed,
            );
            self.store.spawn_text(pos, kind.label());
            let points = kind.points();
            self.store.score = self.store.score.saturating_add(points);
            log::debug!("Enemy {} slashed (+{}), score {}", id, points, self.store.score);
            events.push(GameEvent::EnemyKilled { id, kind, points });
        }

        if self.store.score >= self.config.win_score {
            self.finish(GamePhase::Victory, events);
        }
    }

    /// Remove slashed enemies whose grace period is over
    fn prune_dead_enemies(&mut self) {
        if let DeadEnemyGrace::Frames(grace) = self.config.dead_enemy_grace {
            self.store
                .enemies
                .retain(|e| !(e.dead && e.dead_frames >= grace));
        }
    }

    /// Shake and lose health for this frame's breaches
    fn apply_damage(&mut self, breaches: u32, events: &mut Vec<GameEvent>) {
        // An end state reached earlier this frame stands
        if self.phase != GamePhase::Playing {
            return;
        }

        self.shake = self.config.shake_intensity;
        self.shake_frames_left = self.config.shake_frames;

        let damage = match self.config.breach_damage {
            BreachDamage::PerEnemy => breaches,
            BreachDamage::PerFrame => 1,
        };
        let damage = u8::try_from(damage).unwrap_or(u8::MAX);
        self.health = self.health.saturating_sub(damage);
        log::debug!("{} breach(es), health {}", breaches, self.health);
        events.push(GameEvent::Damaged {
            health: self.health,
        });

        if self.health == 0 {
            self.finish(GamePhase::GameOver, events);
        }
    }

    /// End the session
    fn finish(&mut self, outcome: GamePhase, events: &mut Vec<GameEvent>) {
        let next = self.phase.finish(outcome);
        if next == self.phase {
            return;
        }
        self.phase = next;
        self.shake = 0.0;
        self.shake_frames_left = 0;

        let score = self.store.score;
        match next {
            GamePhase::Victory => {
                log::info!("Victory with score {} after {} frames", score, self.frame);
                events.push(GameEvent::Victory { score });
            }
            GamePhase::GameOver => {
                log::info!("Game over with score {} after {} frames", score, self.frame);
                events.push(GameEvent::GameOver { score });
            }
            _ => {}
        }
    }

    /// Count down an active shake pulse
    fn tick_shake(&mut self) {
        if self.shake_frames_left > 0 {
            self.shake_frames_left -= 1;
        }
        if self.shake_frames_left == 0 {
            self.shake = 0.0;
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::config::GameConfig;
    use proptest::prelude::*;

    fn input_strategy() -> impl Strategy<Value = PointerSample> {
        (0.0f32..100.0, 0.0f32..100.0, any::<bool>()).prop_map(|(x, y, held)| PointerSample {
            pos: Some(Vec2::new(x, y)),
            held,
        })
    }

    fn busy_config() -> GameConfig {
        GameConfig {
            spawn_chance_base: 0.3,
            start_speed: 2.0,
            max_speed: 4.0,
            ..Default::default()
        }
    }

    proptest! {
        #[test]
        fn health_and_score_stay_in_range(
            seed in any::<u64>(),
            inputs in prop::collection::vec(input_strategy(), 1..400),
        ) {
            let mut sim = Simulation::new(busy_config(), seed).unwrap();
            sim.start();
            let mut last_score = 0;
            for input in &inputs {
                let was_playing = sim.phase() == GamePhase::Playing;
                sim.step(input);
                prop_assert!(sim.health() <= 3);
                if was_playing {
                    prop_assert!(sim.score() >= last_score);
                }
                last_score = sim.score();
                if sim.health() == 0 {
                    prop_assert_eq!(sim.phase(), GamePhase::GameOver);
                }
                if sim.score() >= 100 {
                    prop_assert_ne!(sim.phase(), GamePhase::Playing);
                }
            }
        }

        #[test]
        fn no_expired_entities_after_a_step(
            seed in any::<u64>(),
            inputs in prop::collection::vec(input_strategy(), 1..200),
        ) {
            let mut sim = Simulation::new(busy_config(), seed).unwrap();
            sim.start();
            for input in &inputs {
                sim.step(input);
                let store = sim.store();
                prop_assert!(store.particles.iter().all(|p| p.life > 0.0));
                prop_assert!(store.texts.iter().all(|t| t.life > 0.0));
                prop_assert!(store.trail.iter().all(|t| t.life > 0.0));
                prop_assert!(store.enemies.iter().all(|e| e.pos.y <= 105.0));
            }
        }

        #[test]
        fn aging_twice_is_idempotent_on_expiry(
            seed in any::<u64>(),
            inputs in prop::collection::vec(input_strategy(), 1..100),
        ) {
            let mut sim = Simulation::new(busy_config(), seed).unwrap();
            sim.start();
            for input in &inputs {
                sim.step(input);
            }
            sim.age_effects();
            sim.age_effects();
            let store = sim.store();
            prop_assert!(store.particles.iter().all(|p| p.life > 0.0));
            prop_assert!(store.texts.iter().all(|t| t.life > 0.0));
            prop_assert!(store.trail.iter().all(|t| t.life > 0.0));

            // Drain everything, then further passes must be no-ops
            for _ in 0..100 {
                sim.age_effects();
            }
            prop_assert!(sim.store().particles.is_empty());
            prop_assert!(sim.store().texts.is_empty());
            prop_assert!(sim.store().trail.is_empty());
            sim.age_effects();
            prop_assert!(sim.store().particles.is_empty());
        }

        #[test]
        fn released_pointer_scores_nothing(
            seed in any::<u64>(),
            points in prop::collection::vec((0.0f32..100.0, 0.0f32..100.0), 1..200),
        ) {
            let mut sim = Simulation::new(busy_config(), seed).unwrap();
            sim.start();
            for (x, y) in points {
                sim.step(&PointerSample { pos: Some(Vec2::new(x, y)), held: false });
            }
            prop_assert_eq!(sim.score(), 0);
            prop_assert!(sim.store().trail.is_empty());
        }
    }
}
