/*
 * @Author       : 老董
 * @Date         : 2023-08-17 17:29:37
 * @Description  : 张量（矩阵）：计算图中所有数值的载体
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-11
 */

use ndarray::{Array2, ArrayView2};
use rand::Rng;
use rand::distributions::Standard;
use serde::{Deserialize, Serialize};

use crate::errors::TensorError;

mod ops;
mod print;
mod property;

pub use ops::Axis;


/// 定义张量的结构体。本库只涉及2阶张量（矩阵）：
/// 行代表样本，列代表特征；标量以形状`[1, 1]`表示，行向量为`[1, n]`，列向量为`[n, 1]`。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tensor {
    data: Array2<f32>,
}

impl Tensor {
    /// 创建一个张量，`shape`必须是`[行, 列]`，且`data`的长度必须和`shape`中所有元素的乘积相等。
    ///
    /// # Panics
    /// 若形状不合法，会panic；需要错误处理时请使用`try_new`
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        Self::try_new(data, shape).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(data: &[f32], shape: &[usize]) -> Result<Self, TensorError> {
        let [rows, cols] = Self::matrix_shape(shape)?;
        if rows * cols != data.len() {
            return Err(TensorError::DataLengthMismatch {
                len: data.len(),
                shape: shape.to_vec(),
            });
        }
        let data = Array2::from_shape_vec((rows, cols), data.to_vec()).map_err(|_| {
            TensorError::DataLengthMismatch {
                len: data.len(),
                shape: shape.to_vec(),
            }
        })?;
        Ok(Self { data })
    }

    pub fn from_array(data: Array2<f32>) -> Self {
        Self { data }
    }

    /// 由若干行构建矩阵（测试和小规模数据时较方便）
    pub fn from_rows(rows: &[&[f32]]) -> Result<Self, TensorError> {
        let cols = rows.first().map(|r| r.len()).ok_or(TensorError::EmptyList)?;
        let data: Vec<f32> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Self::try_new(&data, &[rows.len(), cols])
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self::filled(0.0, shape)
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self::filled(1.0, shape)
    }

    pub fn scalar(value: f32) -> Self {
        Self::filled(value, &[1, 1])
    }

    /// # Panics
    /// 若`shape`不是2阶的，会panic
    pub fn filled(value: f32, shape: &[usize]) -> Self {
        let [rows, cols] = Self::matrix_shape(shape).unwrap_or_else(|e| panic!("{e}"));
        Self {
            data: Array2::from_elem((rows, cols), value),
        }
    }

    /// 创建一个服从正态分布的随机张量（Box-Muller变换）
    pub fn normal_with_rng<R: Rng + ?Sized>(
        mean: f32,
        std_dev: f32,
        shape: &[usize],
        rng: &mut R,
    ) -> Self {
        let [rows, cols] = Self::matrix_shape(shape).unwrap_or_else(|e| panic!("{e}"));
        let data_len = rows * cols;
        let mut data = Vec::with_capacity(data_len);

        while data.len() < data_len {
            // 避开 ln(0)
            let u1: f32 = 1.0 - rng.sample::<f32, _>(Standard);
            let u2: f32 = rng.sample(Standard);
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = mean + std_dev * r * theta.cos();
            let z1 = mean + std_dev * r * theta.sin();

            if z0.is_finite() {
                data.push(z0);
            }
            if data.len() < data_len && z1.is_finite() {
                data.push(z1);
            }
        }

        Self::new(&data, &[rows, cols])
    }

    /// 创建一个0/1掩码张量，每个元素以概率`keep`取1
    pub fn bernoulli_with_rng<R: Rng + ?Sized>(keep: f32, shape: &[usize], rng: &mut R) -> Self {
        let [rows, cols] = Self::matrix_shape(shape).unwrap_or_else(|e| panic!("{e}"));
        let data = Array2::from_shape_simple_fn((rows, cols), || {
            if rng.sample::<f32, _>(Standard) < keep {
                1.0
            } else {
                0.0
            }
        });
        Self { data }
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// 按行优先顺序拷贝出所有元素
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }
}

// 私有方法
impl Tensor {
    fn matrix_shape(shape: &[usize]) -> Result<[usize; 2], TensorError> {
        match shape {
            [rows, cols] => Ok([*rows, *cols]),
            _ => Err(TensorError::NotMatrix(shape.to_vec())),
        }
    }
}
