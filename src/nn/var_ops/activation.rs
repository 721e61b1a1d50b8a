/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @Description  : Var 激活函数扩展 trait
 *
 * 提供逐元素非线性函数的链式调用支持，用户需 import 此 trait 后才能使用。
 */

use crate::nn::Var;
use crate::nn::graph::Op;

/// 激活函数扩展 trait
///
/// # 使用示例
/// ```ignore
/// use only_net::nn::{Var, VarActivationOps};
///
/// let h = x.relu().sigmoid();
/// let probs = logits.softmax();
/// ```
pub trait VarActivationOps {
    /// `ReLU` 激活：max(0, x)
    fn relu(&self) -> Var;

    /// Sigmoid 激活：1 / (1 + exp(-x))
    fn sigmoid(&self) -> Var;

    fn tanh(&self) -> Var;

    /// `SoftPlus` 激活：log(1 + exp(x))
    fn softplus(&self) -> Var;

    /// 逐行 Softmax：`exp(x_i) / Σ exp(x_j)`
    ///
    /// 输入形状 [batch, `num_classes`]，输出形状相同，每行和为1。
    fn softmax(&self) -> Var;

    fn abs(&self) -> Var;

    /// Step 函数（阶跃函数）：1 if x > 0 else 0
    fn step(&self) -> Var;

    /// Sign 函数（符号函数）：1 if x > 0, 0 if x == 0, -1 if x < 0
    fn sign(&self) -> Var;

    /// 逐元素平方
    fn sqr(&self) -> Var;

    fn exp(&self) -> Var;

    /// 自然对数
    fn log(&self) -> Var;
}

impl VarActivationOps for Var {
    fn relu(&self) -> Var {
        self.derive(Op::Relu(self.node_id()))
    }

    fn sigmoid(&self) -> Var {
        self.derive(Op::Sigmoid(self.node_id()))
    }

    fn tanh(&self) -> Var {
        self.derive(Op::Tanh(self.node_id()))
    }

    fn softplus(&self) -> Var {
        self.derive(Op::Softplus(self.node_id()))
    }

    fn softmax(&self) -> Var {
        self.derive(Op::Softmax(self.node_id()))
    }

    fn abs(&self) -> Var {
        self.derive(Op::Abs(self.node_id()))
    }

    fn step(&self) -> Var {
        self.derive(Op::Step(self.node_id()))
    }

    fn sign(&self) -> Var {
        self.derive(Op::Sign(self.node_id()))
    }

    fn sqr(&self) -> Var {
        self.derive(Op::Sqr(self.node_id()))
    }

    fn exp(&self) -> Var {
        self.derive(Op::Exp(self.node_id()))
    }

    fn log(&self) -> Var {
        self.derive(Op::Log(self.node_id()))
    }
}
