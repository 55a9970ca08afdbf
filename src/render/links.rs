use std::f32::consts::TAU;
use std::fmt::Debug;

use serde::Deserialize;

use crate::config::{RenderConfig, TrackingConfig};
use crate::render::random::{worst_case_links, RandomTable};
use crate::render::surface::{DrawSurface, Rgba};
use crate::tracker::{Particle, Slot, SlotPool, STABILITY_MAX};

/// エンティティ間リンクの描画方式
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    /// 異なるランドマーク同士の全組み合わせ（スコアでゲート、時間で明滅）
    AllPairs,
    /// 全パーティクルの組み合わせ（安定度で不透明度を決める）
    #[default]
    ParticleLink,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkStyle {
    pub line_width: f32,
    /// リンク1本ごとの色相ずれ（度）
    pub hue_spread: f32,
    /// 色相の時間変化（度/秒）
    pub hue_speed: f32,
    /// AllPairs の明滅速度（rad/秒）
    pub pulse_speed: f32,
    /// AllPairs のスコア閾値
    pub score_threshold: f32,
}

impl LinkStyle {
    pub fn from_config(render: &RenderConfig, tracking: &TrackingConfig) -> Self {
        Self {
            line_width: render.line_width,
            hue_spread: render.hue_spread,
            hue_speed: render.hue_speed,
            pulse_speed: render.pulse_speed,
            score_threshold: tracking.score_threshold,
        }
    }
}

/// 追跡中エンティティ同士を線で結ぶ
///
/// プールは読むだけ。カウンタは呼び出しごとに 0 から始まるので、
/// 同じ状態・同じ時刻なら同じ描画命令列になる。
#[derive(Debug, Clone)]
pub struct LinkRenderer {
    mode: LinkMode,
    style: LinkStyle,
    table: RandomTable,
}

impl LinkRenderer {
    pub fn new(mode: LinkMode, style: LinkStyle, table: RandomTable) -> Self {
        Self { mode, style, table }
    }

    /// 乱数テーブルは最悪ケースのリンク数以上の長さで生成する
    pub fn from_config(render: &RenderConfig, tracking: &TrackingConfig) -> Self {
        let worst = worst_case_links(tracking.max_entities, tracking.landmarks.len());
        let table = RandomTable::from_entropy(render.random_table_len.max(worst));
        Self::new(render.mode, LinkStyle::from_config(render, tracking), table)
    }

    pub fn mode(&self) -> LinkMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: LinkMode) {
        self.mode = mode;
    }

    pub fn style(&self) -> &LinkStyle {
        &self.style
    }

    pub fn table(&self) -> &RandomTable {
        &self.table
    }

    /// 描画した線の本数を返す
    pub fn render<I>(&self, pool: &SlotPool<I>, t_secs: f32, surface: &mut dyn DrawSurface) -> usize
    where
        I: PartialEq + Clone + Debug,
    {
        let entities = ordered_entities(pool);
        let mut counter = 0usize;
        let mut drawn = 0usize;

        for (a, b) in entity_pairs(&entities) {
            drawn += match self.mode {
                LinkMode::ParticleLink => {
                    self.render_particle_links(a, b, t_secs, &mut counter, surface)
                }
                LinkMode::AllPairs => self.render_all_pairs(a, b, t_secs, &mut counter, surface),
            };
        }
        drawn
    }

    fn render_particle_links<I>(
        &self,
        a: &Slot<I>,
        b: &Slot<I>,
        t_secs: f32,
        counter: &mut usize,
        surface: &mut dyn DrawSurface,
    ) -> usize {
        let mut drawn = 0;
        for p1 in a.particles() {
            for p2 in b.particles() {
                let k = *counter;
                *counter += 1;

                let alpha =
                    p1.stability().min(p2.stability()) / STABILITY_MAX * self.table.get(k);
                if alpha <= 0.0 {
                    continue;
                }
                self.stroke(p1, p2, k, t_secs, alpha, surface);
                drawn += 1;
            }
        }
        drawn
    }

    fn render_all_pairs<I>(
        &self,
        a: &Slot<I>,
        b: &Slot<I>,
        t_secs: f32,
        counter: &mut usize,
        surface: &mut dyn DrawSurface,
    ) -> usize {
        let (pa, pb) = (a.particles(), b.particles());
        let n = pa.len().min(pb.len());
        let threshold = self.style.score_threshold;
        let mut drawn = 0;

        for i in 0..n {
            for j in (i + 1)..n {
                let k = *counter;
                *counter += 1;

                let (p1, p2) = (&pa[i], &pb[j]);
                if p1.score() < threshold || p2.score() < threshold {
                    continue;
                }
                let r = self.table.get(k);
                let pulse = 0.5 + 0.5 * (t_secs * self.style.pulse_speed + r * TAU).sin();
                let alpha = r * pulse;
                if alpha <= 0.0 {
                    continue;
                }
                self.stroke(p1, p2, k, t_secs, alpha, surface);
                drawn += 1;
            }
        }
        drawn
    }

    fn hue(&self, k: usize, t_secs: f32) -> f32 {
        (k as f32 * self.style.hue_spread + t_secs * self.style.hue_speed).rem_euclid(360.0)
    }

    fn stroke(
        &self,
        p1: &Particle,
        p2: &Particle,
        k: usize,
        t_secs: f32,
        alpha: f32,
        surface: &mut dyn DrawSurface,
    ) {
        surface.stroke_line(
            p1.position(),
            p2.position(),
            self.style.line_width,
            Rgba::from_hue(self.hue(k, t_secs), alpha),
        );
    }
}

/// 束縛中スロットを基準パーティクルの x 昇順に並べる（同値はプール順）
fn ordered_entities<I>(pool: &SlotPool<I>) -> Vec<&Slot<I>>
where
    I: PartialEq + Clone + Debug,
{
    let mut entities: Vec<&Slot<I>> = pool.bound_slots().map(|(_, s)| s).collect();
    entities.sort_by(|a, b| a.anchor().x().total_cmp(&b.anchor().x()));
    entities
}

/// 隣接ペア。1人だけなら自己ペア
fn entity_pairs<'a, I>(entities: &[&'a Slot<I>]) -> Vec<(&'a Slot<I>, &'a Slot<I>)> {
    match entities {
        [] => Vec::new(),
        [only] => vec![(*only, *only)],
        _ => entities.windows(2).map(|w| (w[0], w[1])).collect(),
    }
}
