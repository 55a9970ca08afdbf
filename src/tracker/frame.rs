use std::fmt::Debug;

use tracing::debug;

use crate::pose::{Detection, LandmarkSet};
use crate::tracker::slot::{Assignment, SlotPool};

/// 1フレーム分の更新結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// 既存スロットに対応付いた検出数
    pub matched: usize,
    /// 新たに束縛した検出数
    pub bound: usize,
    /// 空きがなく破棄した検出数
    pub dropped: usize,
    /// 束縛を解除したスロット数
    pub released: usize,
}

/// フレーム更新パス
///
/// 1. ランドマーク構成を検証し、変わっていればプールを再構築
/// 2. 到着順に全検出を割り当て
/// 3. 減衰・束縛解除・フラグリセット
///
/// 全 `update` が全 `post_update` より先に、`post_update` が解除より先に走る。
pub fn update_frame<'a, I, D>(
    pool: &mut SlotPool<I>,
    detections: D,
    landmarks: &LandmarkSet,
) -> FrameReport
where
    I: PartialEq + Clone + Debug + 'a,
    D: IntoIterator<Item = &'a Detection<I>>,
{
    if pool.landmarks() != landmarks {
        pool.reconfigure(landmarks.clone());
    }
    debug_assert!(pool
        .slots()
        .iter()
        .all(|s| s.particles().len() == landmarks.len()));

    let mut report = FrameReport::default();
    for detection in detections {
        match pool.assign(detection) {
            Assignment::Existing(_) => report.matched += 1,
            Assignment::Bound(index) => {
                debug!(id = ?detection.id, slot = index, "identity bound");
                report.bound += 1;
            }
            Assignment::Dropped => report.dropped += 1,
        }
    }
    report.released = pool.finish_frame();

    if report.dropped > 0 || report.released > 0 {
        debug!(
            matched = report.matched,
            bound = report.bound,
            dropped = report.dropped,
            released = report.released,
            "frame update"
        );
    }
    report
}
