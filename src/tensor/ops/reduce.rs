use crate::errors::{Operator, TensorError};
use crate::tensor::{Axis, Tensor};

impl Tensor {
    /// 所有元素求和，返回标量张量
    pub fn sum(&self) -> Tensor {
        Tensor::scalar(self.data.sum())
    }

    /// 所有元素求均值，返回标量张量（空张量的均值为NaN）
    pub fn mean(&self) -> Tensor {
        Tensor::scalar(self.data.sum() / self.size() as f32)
    }

    /// 沿某轴求和并保留该维（长度变为1）
    pub fn sum_axis(&self, axis: Axis) -> Tensor {
        let summed = self.data.sum_axis(ndarray::Axis(axis.index()));
        let data = summed.insert_axis(ndarray::Axis(axis.index()));
        Tensor::from_array(data)
    }

    pub fn mean_axis(&self, axis: Axis) -> Tensor {
        let n = self.shape()[axis.index()] as f32;
        self.sum_axis(axis).map(|x| x / n)
    }

    /// 广播的逆运算：把被广播出来的维度求和压回`shape`
    pub fn sum_to(&self, shape: &[usize]) -> Result<Tensor, TensorError> {
        let mismatch = || TensorError::OperatorError {
            operator: Operator::SumTo,
            tensor1_shape: self.shape().to_vec(),
            tensor2_shape: shape.to_vec(),
        };
        if shape.len() != 2 {
            return Err(mismatch());
        }
        let mut result = self.clone();
        for axis in [Axis::Rows, Axis::Cols] {
            let i = axis.index();
            if shape[i] == 1 && result.shape()[i] != 1 {
                result = result.sum_axis(axis);
            }
        }
        if result.shape() != shape {
            return Err(mismatch());
        }
        Ok(result)
    }

    /// 每行最大元素所在的列号，结果形状为`[m, 1]`
    pub fn argmax_rows(&self) -> Tensor {
        let data: Vec<f32> = self
            .data
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (i, &v) in row.iter().enumerate() {
                    if v > row[best] {
                        best = i;
                    }
                }
                best as f32
            })
            .collect();
        Tensor::new(&data, &[self.rows(), 1])
    }

    /// 逐行softmax：每行减去行最大值后取指数，再除以行和
    pub fn softmax_rows(&self) -> Tensor {
        let mut data = self.data.clone();
        for mut row in data.rows_mut() {
            let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
            row.mapv_inplace(|v| (v - max).exp());
            let sum = row.sum();
            row.mapv_inplace(|v| v / sum);
        }
        Tensor::from_array(data)
    }
}
