use anyhow::Result;
use rand::rngs::ThreadRng;
use rand::Rng;
use std::time::Instant;
use tracing::info;

use pose_overlay::config::Config;
use pose_overlay::pose::{Detection, KeypointIndex, Landmark};
use pose_overlay::render::{Key, LinkMode, MinifbRenderer, OverlayRenderer};
use pose_overlay::tracker::{update_frame, SlotPool};

const CONFIG_PATH: &str = "config.toml";
const WIDTH: usize = 960;
const HEIGHT: usize = 540;
const BACKGROUND: u32 = 0x101018;
/// 同時に歩く人数（スロット数より多くしてドロップも確認する）
const FIGURE_COUNT: usize = 8;

/// 直立姿勢のキーポイント位置（腰中心からのピクセルオフセット）
const TEMPLATE: [(f32, f32); KeypointIndex::COUNT] = [
    (0.0, -80.0),   // nose
    (-6.0, -86.0),  // left_eye
    (6.0, -86.0),   // right_eye
    (-12.0, -82.0), // left_ear
    (12.0, -82.0),  // right_ear
    (-25.0, -55.0), // left_shoulder
    (25.0, -55.0),  // right_shoulder
    (-35.0, -25.0), // left_elbow
    (35.0, -25.0),  // right_elbow
    (-40.0, 5.0),   // left_wrist
    (40.0, 5.0),    // right_wrist
    (-15.0, 0.0),   // left_hip
    (15.0, 0.0),    // right_hip
    (-17.0, 45.0),  // left_knee
    (17.0, 45.0),   // right_knee
    (-18.0, 90.0),  // left_ankle
    (18.0, 90.0),   // right_ankle
];

/// 画面を横切って歩き、時々いなくなる合成人物
struct Figure {
    id: u32,
    x: f32,
    y: f32,
    speed: f32,
    phase: f32,
    /// 残り表示フレーム数。0 以下なら不在
    visible_for: i32,
    /// 不在の残りフレーム数
    hidden_for: i32,
}

impl Figure {
    fn spawn(id: u32, rng: &mut ThreadRng) -> Self {
        Self {
            id,
            x: rng.gen_range(60.0..WIDTH as f32 - 60.0),
            y: rng.gen_range(150.0..HEIGHT as f32 - 120.0),
            speed: rng.gen_range(-2.5..2.5),
            phase: rng.gen_range(0.0..std::f32::consts::TAU),
            visible_for: rng.gen_range(120..600),
            hidden_for: 0,
        }
    }

    /// 1フレーム進める。再登場時は新しい識別子を振る
    fn step(&mut self, next_id: &mut u32, rng: &mut ThreadRng) {
        if self.visible_for > 0 {
            self.visible_for -= 1;
            self.x += self.speed;
            self.phase += 0.12;
            if self.x < -40.0 || self.x > WIDTH as f32 + 40.0 {
                self.speed = -self.speed;
            }
            if self.visible_for == 0 {
                self.hidden_for = rng.gen_range(30..240);
            }
        } else {
            self.hidden_for -= 1;
            if self.hidden_for <= 0 {
                *next_id += 1;
                *self = Self::spawn(*next_id, rng);
            }
        }
    }

    fn detection(&self, rng: &mut ThreadRng) -> Option<Detection<u32>> {
        if self.visible_for <= 0 {
            return None;
        }
        let swing = self.phase.sin();
        let landmarks = KeypointIndex::ALL
            .iter()
            .zip(TEMPLATE.iter())
            .map(|(kp, (ox, oy))| {
                let limb = match kp {
                    KeypointIndex::LeftWrist | KeypointIndex::LeftAnkle => swing * 18.0,
                    KeypointIndex::RightWrist | KeypointIndex::RightAnkle => -swing * 18.0,
                    KeypointIndex::LeftElbow | KeypointIndex::LeftKnee => swing * 8.0,
                    KeypointIndex::RightElbow | KeypointIndex::RightKnee => -swing * 8.0,
                    _ => 0.0,
                };
                Landmark::new(
                    kp.name(),
                    self.x + ox + limb + rng.gen_range(-2.0..2.0),
                    self.y + oy + rng.gen_range(-2.0..2.0),
                    rng.gen_range(0.05..1.0),
                )
            })
            .collect();
        Some(Detection::new(self.id, landmarks))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pose_overlay=info,overlay_viewer=info".into()),
        )
        .init();

    info!("Overlay Viewer {}", env!("GIT_VERSION"));
    info!("Press M to switch link mode, ESC to exit");

    let config = Config::load_or_default(CONFIG_PATH);
    let landmarks = config.tracking.landmark_set()?;
    info!(
        "Tracking: slots={}, landmarks={}, policy={:?}, threshold={}",
        config.tracking.max_entities,
        landmarks.len(),
        config.tracking.policy,
        config.tracking.score_threshold
    );

    let mut pool: SlotPool<u32> = SlotPool::from_config(&config.tracking)?;
    let mut overlay = OverlayRenderer::from_config(&config.render, &config.tracking);
    info!(
        "Render: mode={:?}, random table={}",
        overlay.links().mode(),
        overlay.links().table().len()
    );

    let mut renderer = MinifbRenderer::new("Pose Overlay", WIDTH, HEIGHT)?;

    let mut rng = rand::thread_rng();
    let mut next_id = 0u32;
    let mut figures: Vec<Figure> = (0..FIGURE_COUNT)
        .map(|_| {
            next_id += 1;
            Figure::spawn(next_id, &mut rng)
        })
        .collect();

    let start = Instant::now();
    let mut frame_count = 0u32;
    let mut dropped = 0usize;
    let mut links = 0usize;
    let mut fps_timer = Instant::now();

    while renderer.is_open() {
        if renderer.is_key_pressed(Key::M) {
            let next = match overlay.links().mode() {
                LinkMode::ParticleLink => LinkMode::AllPairs,
                LinkMode::AllPairs => LinkMode::ParticleLink,
            };
            overlay.links_mut().set_mode(next);
            info!("Link mode: {:?}", next);
        }

        for figure in &mut figures {
            figure.step(&mut next_id, &mut rng);
        }
        let detections: Vec<Detection<u32>> =
            figures.iter().filter_map(|f| f.detection(&mut rng)).collect();

        let report = update_frame(&mut pool, &detections, &landmarks);
        dropped += report.dropped;

        renderer.clear(BACKGROUND);
        links += overlay.draw(&pool, start.elapsed().as_secs_f32(), &mut renderer);
        renderer.present()?;

        // FPS計算
        frame_count += 1;
        let elapsed = fps_timer.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            info!(
                "FPS: {:.1}, tracked: {}/{}, links/frame: {}, dropped: {}",
                frame_count as f32 / elapsed,
                pool.bound_count(),
                pool.capacity(),
                links / frame_count as usize,
                dropped
            );
            frame_count = 0;
            dropped = 0;
            links = 0;
            fps_timer = Instant::now();
        }
    }

    info!("Shutting down...");
    Ok(())
}
