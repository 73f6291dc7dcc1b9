//! Snapshot to draw-list projection
//!
//! Positions stay in viewport percentages; opacity and scale are derived from
//! entity life. The result is `Serialize` so a JS shell can take it as JSON.

use serde::Serialize;

use crate::sim::{EnemyKind, FrameSnapshot, GamePhase, Simulation};

/// Full-screen overlay for the current phase (at most one)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Overlay {
    Menu,
    GameOver { final_score: u32 },
    Victory { final_score: u32 },
}

impl Overlay {
    pub fn for_phase(phase: GamePhase, score: u32) -> Option<Self> {
        match phase {
            GamePhase::Menu => Some(Overlay::Menu),
            GamePhase::Playing => None,
            GamePhase::GameOver => Some(Overlay::GameOver { final_score: score }),
            GamePhase::Victory => Some(Overlay::Victory { final_score: score }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemySprite {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub kind: EnemyKind,
    /// Draw the kill explosion instead of the enemy
    pub exploding: bool,
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleSprite {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub color: &'static str,
    pub opacity: f32,
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSprite {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub opacity: f32,
    /// Labels grow as they fade
    pub scale: f32,
}

/// Everything the presentation layer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub phase: GamePhase,
    pub score: u32,
    pub health: u8,
    /// One entry per heart slot, `true` while that heart is still full
    pub hearts: Vec<bool>,
    pub shake: f32,
    pub overlay: Option<Overlay>,
    pub enemies: Vec<EnemySprite>,
    pub particles: Vec<ParticleSprite>,
    pub texts: Vec<TextSprite>,
    pub trail: Vec<(f32, f32)>,
}

/// Scale of an enemy in its kill frame(s)
const EXPLODING_SCALE: f32 = 1.5;

impl RenderFrame {
    /// Project the simulation's last published frame
    pub fn project(sim: &Simulation) -> Self {
        Self::from_parts(
            sim.snapshot(),
            sim.phase(),
            sim.score(),
            sim.health(),
            sim.config().max_health,
            sim.shake(),
        )
    }

    pub fn from_parts(
        snapshot: &FrameSnapshot,
        phase: GamePhase,
        score: u32,
        health: u8,
        max_health: u8,
        shake: f32,
    ) -> Self {
        let enemies = snapshot
            .enemies
            .iter()
            .map(|e| EnemySprite {
                id: e.id,
                x: e.pos.x,
                y: e.pos.y,
                kind: e.kind,
                exploding: e.dead,
                scale: if e.dead { EXPLODING_SCALE } else { 1.0 },
            })
            .collect();

        let particles = snapshot
            .particles
            .iter()
            .map(|p| {
                let life = unit(p.life);
                ParticleSprite {
                    id: p.id,
                    x: p.pos.x,
                    y: p.pos.y,
                    color: p.color.hex(),
                    opacity: life,
                    scale: life,
                }
            })
            .collect();

        let texts = snapshot
            .texts
            .iter()
            .map(|t| {
                let life = unit(t.life);
                TextSprite {
                    id: t.id,
                    x: t.pos.x,
                    y: t.pos.y,
                    text: t.text.clone(),
                    opacity: life,
                    scale: 1.0 + (1.0 - life),
                }
            })
            .collect();

        let trail = snapshot.trail.iter().map(|t| (t.pos.x, t.pos.y)).collect();

        Self {
            phase,
            score,
            health,
            hearts: (0..max_health).map(|i| i < health).collect(),
            shake,
            overlay: Overlay::for_phase(phase, score),
            enemies,
            particles,
            texts,
            trail,
        }
    }

    /// Trail as an SVG polyline `points` attribute (`"x%,y% x%,y% ..."`)
    pub fn trail_points_attr(&self) -> String {
        self.trail
            .iter()
            .map(|(x, y)| format!("{x}%,{y}%"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// JSON for a JS presentation layer
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn unit(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::PointerSample;
    use glam::Vec2;

    fn quiet_sim() -> Simulation {
        Simulation::new(
            GameConfig {
                spawn_chance_base: 0.0,
                spawn_chance_per_point: 0.0,
                start_speed: 1.0,
                max_speed: 1.0,
                ..Default::default()
            },
            5,
        )
        .unwrap()
    }

    #[test]
    fn test_menu_overlay() {
        let frame = RenderFrame::project(&quiet_sim());
        assert_eq!(frame.overlay, Some(Overlay::Menu));
        assert_eq!(frame.hearts, vec![true, true, true]);
    }

    #[test]
    fn test_no_overlay_while_playing() {
        let mut sim = quiet_sim();
        sim.start();
        assert_eq!(RenderFrame::project(&sim).overlay, None);
    }

    #[test]
    fn test_kill_projection() {
        let mut sim = quiet_sim();
        sim.start();
        sim.store_mut()
            .spawn_enemy_at(Vec2::new(40.0, 30.0), EnemyKind::Major);
        sim.step(&PointerSample::held_at(40.0, 31.0));

        let frame = RenderFrame::project(&sim);
        assert_eq!(frame.score, 5);
        assert_eq!(frame.enemies.len(), 1);
        assert!(frame.enemies[0].exploding);
        assert_eq!(frame.enemies[0].scale, 1.5);
        assert_eq!(frame.particles.len(), 8);
        assert!(frame.particles.iter().all(|p| p.color == "#ef4444"));
        assert!(frame.particles.iter().all(|p| p.opacity == 1.0));
        assert_eq!(frame.texts[0].text, "+5");
        assert_eq!(frame.texts[0].scale, 1.0);
        assert_eq!(frame.trail.len(), 1);
    }

    #[test]
    fn test_projection_reads_snapshot_not_live_store() {
        let mut sim = quiet_sim();
        sim.start();
        sim.step(&PointerSample::default());
        sim.store_mut()
            .spawn_enemy_at(Vec2::new(40.0, 30.0), EnemyKind::Minor);
        assert!(RenderFrame::project(&sim).enemies.is_empty());
    }

    #[test]
    fn test_hearts_and_game_over_overlay() {
        let snapshot = FrameSnapshot::default();
        let frame = RenderFrame::from_parts(&snapshot, GamePhase::GameOver, 42, 0, 3, 0.0);
        assert_eq!(frame.hearts, vec![false, false, false]);
        assert_eq!(frame.overlay, Some(Overlay::GameOver { final_score: 42 }));

        let frame = RenderFrame::from_parts(&snapshot, GamePhase::Playing, 0, 2, 3, 10.0);
        assert_eq!(frame.hearts, vec![true, true, false]);
        assert_eq!(frame.shake, 10.0);
    }

    #[test]
    fn test_fading_text_grows() {
        let mut snapshot = FrameSnapshot::default();
        snapshot.texts.push(crate::sim::FloatingText {
            id: 1,
            pos: Vec2::new(10.0, 10.0),
            text: "+1".into(),
            life: 0.25,
        });
        let frame = RenderFrame::from_parts(&snapshot, GamePhase::Playing, 1, 3, 3, 0.0);
        assert_eq!(frame.texts[0].opacity, 0.25);
        assert_eq!(frame.texts[0].scale, 1.75);
    }

    #[test]
    fn test_trail_points_attr() {
        let mut snapshot = FrameSnapshot::default();
        for (x, y) in [(10.0, 20.0), (12.5, 22.0)] {
            snapshot.trail.push(crate::sim::TrailPoint {
                pos: Vec2::new(x, y),
                life: 1.0,
            });
        }
        let frame = RenderFrame::from_parts(&snapshot, GamePhase::Playing, 0, 3, 3, 0.0);
        assert_eq!(frame.trail_points_attr(), "10%,20% 12.5%,22%");
    }

    #[test]
    fn test_json_shape() {
        let frame = RenderFrame::project(&quiet_sim());
        let json = frame.to_json().unwrap();
        assert!(json.contains(r#""phase":"Menu""#));
        assert!(json.contains(r#""overlay":{"kind":"menu"}"#));
    }
}
