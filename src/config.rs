use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::pose::{KeypointIndex, LandmarkSet};
use crate::render::LinkMode;
use crate::tracker::ParticlePolicy;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// パーティクル更新のバリアント
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolicyPreset {
    /// 閾値ゲートあり、+2/フレーム、未マッチ時 -2
    #[default]
    Gated,
    /// ゲートなし、+1/フレーム、毎フレーム -0.5
    Continuous,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TrackingConfig {
    /// 追跡対象のランドマーク名（順序がパーティクル順になる）
    #[serde(default = "default_landmarks")]
    pub landmarks: Vec<String>,
    /// 同時に追跡する最大人数（スロット数）
    #[serde(default = "default_max_entities")]
    pub max_entities: usize,
    /// 信頼度閾値
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,
    /// EMA ブレンド係数
    #[serde(default = "default_smoothing_factor")]
    pub smoothing_factor: f32,
    #[serde(default)]
    pub policy: PolicyPreset,
    /// プリセットの増分を上書き
    #[serde(default)]
    pub stability_increment: Option<f32>,
    /// プリセットの減衰量を上書き
    #[serde(default)]
    pub stability_decrement: Option<f32>,
}

fn default_landmarks() -> Vec<String> {
    KeypointIndex::ALL.iter().map(|k| k.name().to_string()).collect()
}
fn default_max_entities() -> usize { 6 }
fn default_score_threshold() -> f32 { 0.3 }
fn default_smoothing_factor() -> f32 { 0.2 }

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            landmarks: default_landmarks(),
            max_entities: default_max_entities(),
            score_threshold: default_score_threshold(),
            smoothing_factor: default_smoothing_factor(),
            policy: PolicyPreset::default(),
            stability_increment: None,
            stability_decrement: None,
        }
    }
}

impl TrackingConfig {
    pub fn landmark_set(&self) -> Result<LandmarkSet> {
        LandmarkSet::new(self.landmarks.iter().cloned())
    }

    /// プリセットに上書き値を適用したポリシー
    pub fn particle_policy(&self) -> ParticlePolicy {
        let mut policy = match self.policy {
            PolicyPreset::Gated => ParticlePolicy::gated(),
            PolicyPreset::Continuous => ParticlePolicy::continuous(),
        };
        policy.smoothing_factor = self.smoothing_factor;
        policy.score_threshold = self.score_threshold;
        if let Some(inc) = self.stability_increment {
            policy.increment = inc;
        }
        if let Some(dec) = self.stability_decrement {
            policy.decay = policy.decay.with_step(dec);
        }
        policy
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default)]
    pub mode: LinkMode,
    /// パーティクル円の半径（ピクセル）
    #[serde(default = "default_particle_radius")]
    pub particle_radius: f32,
    /// パーティクルの色相（度）
    #[serde(default = "default_particle_hue")]
    pub particle_hue: f32,
    #[serde(default = "default_line_width")]
    pub line_width: f32,
    /// リンク1本ごとの色相ずれ（度）
    #[serde(default = "default_hue_spread")]
    pub hue_spread: f32,
    /// 色相の時間変化（度/秒）
    #[serde(default = "default_hue_speed")]
    pub hue_speed: f32,
    /// all_pairs モードの明滅速度（rad/秒）
    #[serde(default = "default_pulse_speed")]
    pub pulse_speed: f32,
    /// 乱数テーブルの最小長
    #[serde(default = "default_random_table_len")]
    pub random_table_len: usize,
}

fn default_particle_radius() -> f32 { 4.0 }
fn default_particle_hue() -> f32 { 120.0 }
fn default_line_width() -> f32 { 1.0 }
fn default_hue_spread() -> f32 { 0.5 }
fn default_hue_speed() -> f32 { 20.0 }
fn default_pulse_speed() -> f32 { 1.5 }
fn default_random_table_len() -> usize { 1024 }

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: LinkMode::default(),
            particle_radius: default_particle_radius(),
            particle_hue: default_particle_hue(),
            line_width: default_line_width(),
            hue_spread: default_hue_spread(),
            hue_speed: default_hue_speed(),
            pulse_speed: default_pulse_speed(),
            random_table_len: default_random_table_len(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 読み込みに失敗した場合はデフォルト設定
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("config {} not loaded ({:#}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.tracking;
        if t.max_entities == 0 {
            bail!("tracking.max_entities must be at least 1");
        }
        t.landmark_set().context("tracking.landmarks")?;
        if !(t.smoothing_factor > 0.0 && t.smoothing_factor <= 1.0) {
            bail!("tracking.smoothing_factor must be in (0, 1], got {}", t.smoothing_factor);
        }
        if t.stability_increment.is_some_and(|v| v < 0.0) {
            bail!("tracking.stability_increment must not be negative");
        }
        if t.stability_decrement.is_some_and(|v| v < 0.0) {
            bail!("tracking.stability_decrement must not be negative");
        }
        if self.render.particle_radius < 0.0 || self.render.line_width < 0.0 {
            bail!("render sizes must not be negative");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{Decay, ObservationGate};

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.tracking.max_entities, 6);
        assert_eq!(config.tracking.landmarks.len(), KeypointIndex::COUNT);
        assert_eq!(config.tracking.policy, PolicyPreset::Gated);
        assert_eq!(config.render.mode, LinkMode::ParticleLink);
    }

    #[test]
    fn test_parse_sections() {
        let config = Config::parse(
            r#"
            [tracking]
            landmarks = ["left_wrist", "right_wrist"]
            max_entities = 2
            policy = "continuous"

            [render]
            mode = "all_pairs"
            line_width = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(config.tracking.landmarks, vec!["left_wrist", "right_wrist"]);
        assert_eq!(config.tracking.max_entities, 2);
        assert_eq!(config.tracking.policy, PolicyPreset::Continuous);
        assert_eq!(config.render.mode, LinkMode::AllPairs);
        assert_eq!(config.render.line_width, 2.0);
        assert_eq!(config.render.hue_speed, 20.0);
    }

    #[test]
    fn test_presets_map_to_policies() {
        let mut t = TrackingConfig::default();
        let gated = t.particle_policy();
        assert_eq!(gated.gate, ObservationGate::Threshold);
        assert_eq!(gated.increment, 2.0);
        assert_eq!(gated.decay, Decay::OnMiss(2.0));

        t.policy = PolicyPreset::Continuous;
        let cont = t.particle_policy();
        assert_eq!(cont.gate, ObservationGate::Always);
        assert_eq!(cont.increment, 1.0);
        assert_eq!(cont.decay, Decay::EveryFrame(0.5));
    }

    #[test]
    fn test_overrides_apply() {
        let t = TrackingConfig {
            stability_increment: Some(5.0),
            stability_decrement: Some(4.0),
            score_threshold: 0.6,
            ..TrackingConfig::default()
        };
        let p = t.particle_policy();
        assert_eq!(p.increment, 5.0);
        assert_eq!(p.decay, Decay::OnMiss(4.0));
        assert_eq!(p.score_threshold, 0.6);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(Config::parse("[tracking]\nmax_entities = 0").is_err());
        assert!(Config::parse("[tracking]\nlandmarks = []").is_err());
        assert!(Config::parse("[tracking]\nlandmarks = [\"nose\", \"nose\"]").is_err());
        assert!(Config::parse("[tracking]\nsmoothing_factor = 0.0").is_err());
        assert!(Config::parse("[tracking]\nstability_decrement = -1.0").is_err());
        assert!(Config::parse("[tracking]\npolicy = \"sometimes\"").is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("does/not/exist.toml");
        assert_eq!(config.tracking.max_entities, 6);
    }
}
