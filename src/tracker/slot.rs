use std::fmt::Debug;

use anyhow::{bail, Result};
use tracing::{info, trace};

use crate::config::TrackingConfig;
use crate::pose::{Detection, LandmarkSet};
use crate::tracker::particle::{Particle, ParticlePolicy};

/// 1人分の追跡枠（グループ）
#[derive(Debug, Clone)]
pub struct Slot<I> {
    bound: Option<I>,
    matched: bool,
    particles: Vec<Particle>,
}

impl<I> Slot<I> {
    fn new(len: usize) -> Self {
        Self {
            bound: None,
            matched: false,
            particles: vec![Particle::new(); len],
        }
    }

    pub fn bound(&self) -> Option<&I> {
        self.bound.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// 今フレームで検出と対応付けられたか
    pub fn is_matched(&self) -> bool {
        self.matched
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// 並び替え基準のパーティクル（インデックス 0）
    pub fn anchor(&self) -> &Particle {
        &self.particles[0]
    }
}

/// 検出の割り当て結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// 既に同じ識別子に束縛されていたスロット
    Existing(usize),
    /// 新たに束縛した空きスロット
    Bound(usize),
    /// 空きなし、このフレームでは破棄
    Dropped,
}

/// 固定数のスロット集合
///
/// スロットは起動時に確保され、追加・削除されず束縛だけが変わる。
#[derive(Debug, Clone)]
pub struct SlotPool<I> {
    slots: Vec<Slot<I>>,
    landmarks: LandmarkSet,
    policy: ParticlePolicy,
}

impl<I: PartialEq + Clone + Debug> SlotPool<I> {
    pub fn new(capacity: usize, landmarks: LandmarkSet, policy: ParticlePolicy) -> Result<Self> {
        if capacity == 0 {
            bail!("slot pool capacity must be at least 1");
        }
        let slots = (0..capacity).map(|_| Slot::new(landmarks.len())).collect();
        Ok(Self {
            slots,
            landmarks,
            policy,
        })
    }

    pub fn from_config(config: &TrackingConfig) -> Result<Self> {
        Self::new(
            config.max_entities,
            config.landmark_set()?,
            config.particle_policy(),
        )
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Slot<I>] {
        &self.slots
    }

    pub fn landmarks(&self) -> &LandmarkSet {
        &self.landmarks
    }

    /// 束縛中のスロットをプール順に列挙
    pub fn bound_slots(&self) -> impl Iterator<Item = (usize, &Slot<I>)> {
        self.slots.iter().enumerate().filter(|(_, s)| s.is_bound())
    }

    pub fn bound_count(&self) -> usize {
        self.bound_slots().count()
    }

    pub fn find_bound(&self, id: &I) -> Option<usize> {
        self.slots.iter().position(|s| s.bound.as_ref() == Some(id))
    }

    /// 最小インデックスの空きスロット（first-fit）
    pub fn first_free(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.bound.is_none())
    }

    /// 検出をスロットに割り当て、ランドマークをパーティクルへ反映する
    pub fn assign(&mut self, detection: &Detection<I>) -> Assignment {
        let (index, assignment) = match self.find_bound(&detection.id) {
            Some(index) => (index, Assignment::Existing(index)),
            None => match self.first_free() {
                Some(index) => {
                    self.slots[index].bound = Some(detection.id.clone());
                    (index, Assignment::Bound(index))
                }
                None => {
                    trace!(id = ?detection.id, "no free slot, detection dropped");
                    return Assignment::Dropped;
                }
            },
        };

        let observations = self.landmarks.extract(detection);
        let policy = self.policy;
        let slot = &mut self.slots[index];
        for (particle, observation) in slot.particles.iter_mut().zip(observations) {
            particle.update(observation, &policy);
        }
        slot.matched = true;
        assignment
    }

    /// フレーム終了処理: 減衰 → 未マッチの束縛解除 → フラグリセット
    ///
    /// 解除したスロット数を返す。
    pub fn finish_frame(&mut self) -> usize {
        let policy = self.policy;
        for slot in &mut self.slots {
            let matched = slot.matched;
            for particle in &mut slot.particles {
                particle.post_update(matched, &policy);
            }
        }

        let mut released = 0;
        for slot in &mut self.slots {
            if slot.bound.is_some() && !slot.matched {
                trace!(id = ?slot.bound, "slot released");
                slot.bound = None;
                released += 1;
            }
            slot.matched = false;
        }
        released
    }

    /// ランドマーク構成の変更に伴う再構築。全スロットの束縛を解除する
    pub fn reconfigure(&mut self, landmarks: LandmarkSet) {
        info!(
            from = self.landmarks.len(),
            to = landmarks.len(),
            "landmark set changed, rebuilding slot pool"
        );
        let len = landmarks.len();
        for slot in &mut self.slots {
            *slot = Slot::new(len);
        }
        self.landmarks = landmarks;
    }
}
