mod elementwise;
mod mat_mul;
mod reduce;

use serde::{Deserialize, Serialize};

/// 归约/广播所沿的轴：`Rows`沿行方向（对每列求，结果为`[1, n]`），
/// `Cols`沿列方向（对每行求，结果为`[m, 1]`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Rows,
    Cols,
}

impl Axis {
    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Rows => 0,
            Self::Cols => 1,
        }
    }
}
