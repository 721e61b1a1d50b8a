use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;

impl Tensor {
    /// 实现矩阵乘法。需要保证前一个张量的列数（col）等于后一个张量的行数（row）。
    pub fn mat_mul(&self, other: &Tensor) -> Result<Tensor, TensorError> {
        if self.cols() != other.rows() {
            return Err(TensorError::OperatorError {
                operator: Operator::MatMul,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: other.shape().to_vec(),
            });
        }
        Ok(Tensor::from_array(self.data.dot(&other.data)))
    }

    pub fn transpose(&self) -> Tensor {
        Tensor::from_array(self.data.t().to_owned())
    }
}
