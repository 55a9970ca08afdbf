use anyhow::{bail, Result};

use crate::pose::{Detection, KeypointIndex, Landmark};

/// 有効なランドマーク名の順序付きリスト
///
/// パーティクル i は常に `names[i]` に対応する。
/// 構成や順序が変わった場合はスロットプールの再構築が必要。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandmarkSet {
    names: Vec<String>,
}

impl LandmarkSet {
    /// 空・重複を拒否して作成
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Result<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            bail!("landmark set must contain at least one name");
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                bail!("duplicate landmark name in set: {}", name);
            }
        }
        Ok(Self { names })
    }

    /// COCO 17 キーポイント全て
    pub fn coco() -> Self {
        Self {
            names: KeypointIndex::ALL.iter().map(|k| k.name().to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// 検出結果からセット順にランドマークを取り出す。欠けている名前は `None`
    pub fn extract<'a, I>(&self, detection: &'a Detection<I>) -> Vec<Option<&'a Landmark>> {
        self.names.iter().map(|name| detection.get(name)).collect()
    }
}

impl Default for LandmarkSet {
    fn default() -> Self {
        Self::coco()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(LandmarkSet::new(Vec::<String>::new()).is_err());
        assert!(LandmarkSet::new(["nose", "left_eye", "nose"]).is_err());
        assert!(LandmarkSet::new(["nose", "left_eye"]).is_ok());
    }

    #[test]
    fn test_coco_order() {
        let set = LandmarkSet::coco();
        assert_eq!(set.len(), KeypointIndex::COUNT);
        assert_eq!(set.names()[0], "nose");
        assert_eq!(set.names()[16], "right_ankle");
    }

    #[test]
    fn test_extract_follows_set_order() {
        let set = LandmarkSet::new(["right_wrist", "nose", "left_knee"]).unwrap();
        let det = Detection::new(
            1u8,
            vec![
                Landmark::new("nose", 1.0, 1.0, 0.9),
                Landmark::new("left_eye", 2.0, 2.0, 0.9),
                Landmark::new("right_wrist", 3.0, 3.0, 0.9),
            ],
        );
        let picked = set.extract(&det);
        assert_eq!(picked.len(), 3);
        assert_eq!(picked[0].map(|l| l.x), Some(3.0));
        assert_eq!(picked[1].map(|l| l.x), Some(1.0));
        assert!(picked[2].is_none());
    }

    #[test]
    fn test_order_matters_for_equality() {
        let a = LandmarkSet::new(["nose", "left_eye"]).unwrap();
        let b = LandmarkSet::new(["left_eye", "nose"]).unwrap();
        assert_ne!(a, b);
    }
}
