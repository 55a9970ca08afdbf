use std::fmt::Debug;

use crate::config::{RenderConfig, TrackingConfig};
use crate::render::links::LinkRenderer;
use crate::render::surface::DrawSurface;
use crate::tracker::{ParticleStyle, SlotPool};

/// 1フレーム分のオーバーレイ描画: リンク → パーティクル
///
/// パーティクルは束縛の有無に関係なく全スロット分描くので、
/// 解放されたスロットも安定度に従ってフェードアウトする。
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    links: LinkRenderer,
    particle_style: ParticleStyle,
}

impl OverlayRenderer {
    pub fn new(links: LinkRenderer, particle_style: ParticleStyle) -> Self {
        Self {
            links,
            particle_style,
        }
    }

    pub fn from_config(render: &RenderConfig, tracking: &TrackingConfig) -> Self {
        Self::new(
            LinkRenderer::from_config(render, tracking),
            ParticleStyle {
                radius: render.particle_radius,
                hue: render.particle_hue,
            },
        )
    }

    pub fn links(&self) -> &LinkRenderer {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut LinkRenderer {
        &mut self.links
    }

    /// 描画したリンク数を返す
    pub fn draw<I>(&self, pool: &SlotPool<I>, t_secs: f32, surface: &mut dyn DrawSurface) -> usize
    where
        I: PartialEq + Clone + Debug,
    {
        let drawn = self.links.render(pool, t_secs, surface);
        for slot in pool.slots() {
            for particle in slot.particles() {
                particle.render(surface, &self.particle_style);
            }
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Detection, Landmark, LandmarkSet};
    use crate::render::{CommandRecorder, DrawCommand, LinkMode, LinkStyle, RandomTable};
    use crate::tracker::{update_frame, ParticlePolicy};

    #[test]
    fn test_links_before_particles_and_all_slots_drawn() {
        let set = LandmarkSet::new(["nose", "left_wrist"]).unwrap();
        let mut pool = SlotPool::new(3, set.clone(), ParticlePolicy::gated()).unwrap();
        let det = Detection::new(
            "A",
            vec![
                Landmark::new("nose", 10.0, 0.0, 1.0),
                Landmark::new("left_wrist", 0.0, 10.0, 1.0),
            ],
        );
        update_frame(&mut pool, [&det], &set);

        let style = LinkStyle {
            line_width: 2.0,
            hue_spread: 0.5,
            hue_speed: 0.0,
            pulse_speed: 0.0,
            score_threshold: 0.3,
        };
        let overlay = OverlayRenderer::new(
            LinkRenderer::new(LinkMode::ParticleLink, style, RandomTable::from_values(vec![1.0])),
            ParticleStyle { radius: 4.0, hue: 120.0 },
        );
        let mut rec = CommandRecorder::new();
        let drawn = overlay.draw(&pool, 0.0, &mut rec);

        assert_eq!(drawn, 4);
        assert_eq!(rec.lines().count(), 4);
        // 3 スロット × 2 パーティクル
        assert_eq!(rec.circles().count(), 6);
        let first_circle = rec
            .commands()
            .iter()
            .position(|c| matches!(c, DrawCommand::Circle { .. }))
            .unwrap();
        assert_eq!(first_circle, 4);
    }

    #[test]
    fn test_released_slot_keeps_fading() {
        let set = LandmarkSet::new(["nose"]).unwrap();
        let mut pool = SlotPool::new(1, set.clone(), ParticlePolicy::gated()).unwrap();
        let det = Detection::new(1u8, vec![Landmark::new("nose", 5.0, 5.0, 1.0)]);
        for _ in 0..10 {
            update_frame(&mut pool, [&det], &set);
        }
        update_frame(&mut pool, [], &set);
        assert_eq!(pool.bound_count(), 0);

        let overlay = OverlayRenderer::from_config(&RenderConfig::default(), &TrackingConfig::default());
        let mut rec = CommandRecorder::new();
        assert_eq!(overlay.draw(&pool, 1.0, &mut rec), 0);
        match rec.commands() {
            [DrawCommand::Circle { color, .. }] => assert!((color.a - 0.18).abs() < 1e-6),
            other => panic!("unexpected commands: {:?}", other),
        }
    }
}
