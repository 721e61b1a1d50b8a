/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 逐元素运算（含numpy风格的2阶广播）
 */

use ndarray::Zip;

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;

impl Tensor {
    /// 对每个元素应用`f`
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Tensor {
        Tensor::from_array(self.data.mapv(f))
    }

    /// 计算两个形状广播后的形状：每一维要么相等，要么其中之一为1
    pub fn broadcast_shape(
        a: &[usize],
        b: &[usize],
        operator: Operator,
    ) -> Result<[usize; 2], TensorError> {
        let mismatch = || TensorError::OperatorError {
            operator,
            tensor1_shape: a.to_vec(),
            tensor2_shape: b.to_vec(),
        };
        if a.len() != 2 || b.len() != 2 {
            return Err(mismatch());
        }
        let mut shape = [0; 2];
        for i in 0..2 {
            shape[i] = match (a[i], b[i]) {
                (x, y) if x == y => x,
                (1, y) => y,
                (x, 1) => x,
                _ => return Err(mismatch()),
            };
        }
        Ok(shape)
    }

    /// 带广播的逐元素二元运算
    pub fn zip_with(
        &self,
        other: &Tensor,
        operator: Operator,
        f: impl Fn(f32, f32) -> f32,
    ) -> Result<Tensor, TensorError> {
        let shape = Self::broadcast_shape(self.shape(), other.shape(), operator)?;
        let mismatch = || TensorError::OperatorError {
            operator,
            tensor1_shape: self.shape().to_vec(),
            tensor2_shape: other.shape().to_vec(),
        };
        let a = self.data.broadcast(shape).ok_or_else(mismatch)?;
        let b = other.data.broadcast(shape).ok_or_else(mismatch)?;
        let data = Zip::from(&a).and(&b).map_collect(|&x, &y| f(x, y));
        Ok(Tensor::from_array(data))
    }

    pub fn add(&self, other: &Tensor) -> Result<Tensor, TensorError> {
        self.zip_with(other, Operator::Add, |a, b| a + b)
    }

    pub fn sub(&self, other: &Tensor) -> Result<Tensor, TensorError> {
        self.zip_with(other, Operator::Sub, |a, b| a - b)
    }

    pub fn mul(&self, other: &Tensor) -> Result<Tensor, TensorError> {
        self.zip_with(other, Operator::Mul, |a, b| a * b)
    }

    pub fn div(&self, other: &Tensor) -> Result<Tensor, TensorError> {
        self.zip_with(other, Operator::Div, |a, b| a / b)
    }

    /// 逐元素相等比较：相等为1，否则为0
    pub fn eq_mask(&self, other: &Tensor) -> Result<Tensor, TensorError> {
        self.zip_with(other, Operator::Compare, |a, b| if a == b { 1.0 } else { 0.0 })
    }

    /// 广播到指定形状
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Tensor, TensorError> {
        let mismatch = || TensorError::OperatorError {
            operator: Operator::BroadcastTo,
            tensor1_shape: self.shape().to_vec(),
            tensor2_shape: shape.to_vec(),
        };
        let target = Self::broadcast_shape(self.shape(), shape, Operator::BroadcastTo)?;
        if target != [shape[0], shape[1]] {
            return Err(mismatch());
        }
        let view = self.data.broadcast(target).ok_or_else(mismatch)?;
        Ok(Tensor::from_array(view.to_owned()))
    }
}
