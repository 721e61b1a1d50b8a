/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : Graph 模块的错误类型
 */

use thiserror::Error;

use crate::errors::TensorError;
use crate::nn::NodeId;

/// Graph 操作错误类型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("节点{0:?}不存在")]
    NodeNotFound(NodeId),
    #[error("非法操作：{0}")]
    InvalidOperation(String),
    #[error("形状不匹配：预期{expected:?}，实际{got:?}（{message}）")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },
    #[error("输入节点`{0}`未提供值")]
    MissingInput(String),
    #[error("节点名称`{0}`重复")]
    DuplicateNodeName(String),
    #[error("计算失败：{0}")]
    ComputationError(String),
}

impl GraphError {
    /// 把张量运算错误包装成带节点上下文的图错误
    pub(crate) fn from_tensor(node_name: &str, err: TensorError) -> Self {
        match &err {
            TensorError::OperatorError {
                tensor1_shape,
                tensor2_shape,
                ..
            } => Self::ShapeMismatch {
                message: format!("节点`{node_name}`：{err}"),
                expected: tensor1_shape.clone(),
                got: tensor2_shape.clone(),
            },
            _ => Self::ComputationError(format!("节点`{node_name}`：{err}")),
        }
    }
}
