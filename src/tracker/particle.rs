use crate::pose::Landmark;
use crate::render::{DrawSurface, Rgba};

/// 安定度の上限
pub const STABILITY_MAX: f32 = 100.0;

/// 観測をパーティクル位置に反映する条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationGate {
    /// スコアが閾値未満の観測は無視
    Threshold,
    /// スコアに関係なく反映
    Always,
}

/// フレーム終了時の安定度減衰
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decay {
    /// グループが未マッチのフレームだけ減衰
    OnMiss(f32),
    /// マッチ状態に関係なく毎フレーム減衰
    EveryFrame(f32),
}

impl Decay {
    pub fn with_step(self, step: f32) -> Self {
        match self {
            Decay::OnMiss(_) => Decay::OnMiss(step),
            Decay::EveryFrame(_) => Decay::EveryFrame(step),
        }
    }
}

/// パーティクル更新パラメータ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticlePolicy {
    pub gate: ObservationGate,
    pub score_threshold: f32,
    /// EMA ブレンド係数（1フレームで観測位置へ寄る割合）
    pub smoothing_factor: f32,
    pub increment: f32,
    pub decay: Decay,
}

impl ParticlePolicy {
    pub const DEFAULT_SMOOTHING: f32 = 0.2;
    pub const DEFAULT_THRESHOLD: f32 = 0.3;

    /// 閾値ゲートあり / +2 / 未マッチ時 -2
    pub fn gated() -> Self {
        Self {
            gate: ObservationGate::Threshold,
            score_threshold: Self::DEFAULT_THRESHOLD,
            smoothing_factor: Self::DEFAULT_SMOOTHING,
            increment: 2.0,
            decay: Decay::OnMiss(2.0),
        }
    }

    /// ゲートなし / +1 / 毎フレーム -0.5
    pub fn continuous() -> Self {
        Self {
            gate: ObservationGate::Always,
            score_threshold: Self::DEFAULT_THRESHOLD,
            smoothing_factor: Self::DEFAULT_SMOOTHING,
            increment: 1.0,
            decay: Decay::EveryFrame(0.5),
        }
    }

    fn accepts(&self, observation: &Landmark) -> bool {
        match self.gate {
            ObservationGate::Threshold => observation.is_valid(self.score_threshold),
            ObservationGate::Always => true,
        }
    }
}

impl Default for ParticlePolicy {
    fn default() -> Self {
        Self::gated()
    }
}

/// パーティクル描画スタイル
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleStyle {
    pub radius: f32,
    pub hue: f32,
}

/// 1ランドマーク分の平滑化された点と安定度
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Particle {
    x: f32,
    y: f32,
    stability: f32,
    score: f32,
}

impl Particle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn stability(&self) -> f32 {
        self.stability
    }

    /// 今フレームの観測スコア（観測なしなら 0）
    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn opacity(&self) -> f32 {
        self.stability / STABILITY_MAX
    }

    pub fn update(&mut self, observation: Option<&Landmark>, policy: &ParticlePolicy) {
        self.score = observation.map_or(0.0, |o| o.score);
        let Some(obs) = observation else {
            return;
        };
        if !policy.accepts(obs) {
            return;
        }

        // EMA: 観測位置へ smoothing_factor だけ寄せる
        let dx = self.x - obs.x;
        let dy = self.y - obs.y;
        self.x -= dx * policy.smoothing_factor;
        self.y -= dy * policy.smoothing_factor;

        self.stability = (self.stability + policy.increment).min(STABILITY_MAX);
    }

    /// 全 `update` の後、フレームごとに1回だけ呼ぶ
    pub fn post_update(&mut self, group_matched: bool, policy: &ParticlePolicy) {
        let step = match policy.decay {
            Decay::OnMiss(step) if !group_matched => step,
            Decay::OnMiss(_) => 0.0,
            Decay::EveryFrame(step) => step,
        };
        self.stability = (self.stability - step).max(0.0);
        if !group_matched {
            self.score = 0.0;
        }
    }

    pub fn render(&self, surface: &mut dyn DrawSurface, style: &ParticleStyle) {
        surface.fill_circle(
            (self.x, self.y),
            style.radius,
            Rgba::from_hue(style.hue, self.opacity()),
        );
    }
}
