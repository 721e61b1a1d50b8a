/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 计算图节点：节点ID、算子种类与节点本体
 */

use crate::tensor::{Axis, Tensor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// 节点的算子。除`Parameter`外，节点本身不保存数值：
/// 数值只在编译后函数的一次调用中存在。
#[derive(Debug, Clone)]
pub(crate) enum Op {
    // 叶子
    Input,
    Parameter,
    Constant(Tensor),

    // 二元逐元素（支持广播）
    Add(NodeId, NodeId),
    Sub(NodeId, NodeId),
    Mul(NodeId, NodeId),
    Div(NodeId, NodeId),

    // 矩阵
    MatMul(NodeId, NodeId),
    Transpose(NodeId),

    // 一元逐元素
    Neg(NodeId),
    Abs(NodeId),
    Sign(NodeId),
    Step(NodeId),
    Sqr(NodeId),
    Exp(NodeId),
    Log(NodeId),
    Sigmoid(NodeId),
    Tanh(NodeId),
    Relu(NodeId),
    Softplus(NodeId),
    /// 逐行softmax
    Softmax(NodeId),

    // 归约 / 形状
    Sum(NodeId),
    Mean(NodeId),
    SumAxis(NodeId, Axis),
    MeanAxis(NodeId, Axis),
    /// 把第一个节点求和压缩到第二个节点的形状（广播的逆运算）
    SumTo(NodeId, NodeId),
    /// 把第一个节点广播到第二个节点的形状
    BroadcastTo(NodeId, NodeId),
    /// 元素个数（`None`）或某轴长度，结果为标量
    Count(NodeId, Option<Axis>),

    // 分类辅助，不可导
    ArgmaxRows(NodeId),
    Equal(NodeId, NodeId),

    // 随机：每次调用重新采样，不可导
    GaussianNoise { like: NodeId, std: f32 },
    BernoulliMask { like: NodeId, keep: f32 },
}

impl Op {
    /// 求值时依赖的父节点（按顺序）
    pub(crate) fn parents(&self) -> Vec<NodeId> {
        match self {
            Self::Input | Self::Parameter | Self::Constant(_) => vec![],
            Self::Add(a, b)
            | Self::Sub(a, b)
            | Self::Mul(a, b)
            | Self::Div(a, b)
            | Self::MatMul(a, b)
            | Self::SumTo(a, b)
            | Self::BroadcastTo(a, b)
            | Self::Equal(a, b) => vec![*a, *b],
            Self::Transpose(a)
            | Self::Neg(a)
            | Self::Abs(a)
            | Self::Sign(a)
            | Self::Step(a)
            | Self::Sqr(a)
            | Self::Exp(a)
            | Self::Log(a)
            | Self::Sigmoid(a)
            | Self::Tanh(a)
            | Self::Relu(a)
            | Self::Softplus(a)
            | Self::Softmax(a)
            | Self::Sum(a)
            | Self::Mean(a)
            | Self::SumAxis(a, _)
            | Self::MeanAxis(a, _)
            | Self::Count(a, _)
            | Self::ArgmaxRows(a) => vec![*a],
            Self::GaussianNoise { like, .. } | Self::BernoulliMask { like, .. } => vec![*like],
        }
    }

    /// 算子类型名，用于自动生成节点名
    pub(crate) const fn kind_name(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Parameter => "parameter",
            Self::Constant(_) => "constant",
            Self::Add(..) => "add",
            Self::Sub(..) => "sub",
            Self::Mul(..) => "mul",
            Self::Div(..) => "div",
            Self::MatMul(..) => "mat_mul",
            Self::Transpose(_) => "transpose",
            Self::Neg(_) => "neg",
            Self::Abs(_) => "abs",
            Self::Sign(_) => "sign",
            Self::Step(_) => "step",
            Self::Sqr(_) => "sqr",
            Self::Exp(_) => "exp",
            Self::Log(_) => "log",
            Self::Sigmoid(_) => "sigmoid",
            Self::Tanh(_) => "tanh",
            Self::Relu(_) => "relu",
            Self::Softplus(_) => "softplus",
            Self::Softmax(_) => "softmax",
            Self::Sum(_) => "sum",
            Self::Mean(_) => "mean",
            Self::SumAxis(..) => "sum_axis",
            Self::MeanAxis(..) => "mean_axis",
            Self::SumTo(..) => "sum_to",
            Self::BroadcastTo(..) => "broadcast_to",
            Self::Count(..) => "count",
            Self::ArgmaxRows(_) => "argmax",
            Self::Equal(..) => "equal",
            Self::GaussianNoise { .. } => "gaussian_noise",
            Self::BernoulliMask { .. } => "bernoulli_mask",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) op: Op,
    /// 仅`Parameter`节点持有数值
    pub(crate) value: Option<Tensor>,
}
