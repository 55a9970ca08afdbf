use rand::Rng;

/// 起動時に一度だけ生成する擬似乱数列
///
/// リンクカウンタで引き、長さを超えたら先頭へ折り返す。
#[derive(Debug, Clone, PartialEq)]
pub struct RandomTable {
    values: Vec<f32>,
}

impl RandomTable {
    /// `[0, 1)` の値を `len` 個（最低1個）生成
    pub fn generate<R: Rng>(len: usize, rng: &mut R) -> Self {
        let values = (0..len.max(1)).map(|_| rng.gen::<f32>()).collect();
        Self { values }
    }

    pub fn from_entropy(len: usize) -> Self {
        Self::generate(len, &mut rand::thread_rng())
    }

    /// テスト・再現用に値を直接与える。空なら 1.0 の1要素
    pub fn from_values(values: Vec<f32>) -> Self {
        if values.is_empty() {
            return Self { values: vec![1.0] };
        }
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, counter: usize) -> f32 {
        self.values[counter % self.values.len()]
    }
}

/// 1回の描画で発生しうるリンク数の上限
///
/// 隣接ペア数は最大 `max_entities - 1`（1人のときは自己ペア1つ）。
pub fn worst_case_links(max_entities: usize, landmarks: usize) -> usize {
    let pairs = max_entities.saturating_sub(1).max(1);
    pairs * landmarks * landmarks
}
