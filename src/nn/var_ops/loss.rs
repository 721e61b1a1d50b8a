/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @Description  : Var 误差函数扩展 trait
 *
 * 提供误差函数的链式调用支持，用户需 import 此 trait 后才能使用。
 */

use super::{VarActivationOps, VarReduceOps};
use crate::nn::Var;
use crate::nn::graph::Op;
use crate::tensor::Axis;

/// 误差函数扩展 trait（`self`为网络输出）
///
/// - `mse(target, weights)`: 均方误差，用于自编码器与回归
/// - `cross_entropy(target, weights)`: 交叉熵（`self`须已是概率，例如softmax输出），用于分类
/// - `accuracy(target)`: 分类正确率（不可导，仅作监控）
///
/// # 使用示例
/// ```ignore
/// use only_net::nn::{Var, VarLossOps};
///
/// let err = output.mse(&x, None);
/// let err = output.mse(&x, Some(&weights));
/// ```
pub trait VarLossOps {
    /// 均方误差
    ///
    /// - 无权重：`mean((y - t)²)`
    /// - 有权重：`sum(w * (y - t)²) / sum(w)`
    fn mse(&self, target: &Var, weights: Option<&Var>) -> Var;

    /// 交叉熵，`target`为one-hot编码
    ///
    /// - 无权重：`-sum(t * log y) / 样本数`
    /// - 有权重：`-sum(w * t * log y) / sum(w)`
    fn cross_entropy(&self, target: &Var, weights: Option<&Var>) -> Var;

    /// 逐行arg-max与`target`一致的样本比例
    fn accuracy(&self, target: &Var) -> Var;
}

impl VarLossOps for Var {
    fn mse(&self, target: &Var, weights: Option<&Var>) -> Var {
        let err = self - target;
        let sq = &err * &err;
        match weights {
            Some(w) => (w * &sq).sum() / w.sum(),
            None => sq.mean(),
        }
    }

    fn cross_entropy(&self, target: &Var, weights: Option<&Var>) -> Var {
        let nll = -(target * &self.log());
        match weights {
            Some(w) => (w * &nll).sum() / w.sum(),
            None => nll.sum() / nll.count(Some(Axis::Rows)),
        }
    }

    fn accuracy(&self, target: &Var) -> Var {
        self.assert_same_graph(target);
        let predicted = self.derive(Op::ArgmaxRows(self.node_id()));
        let expected = target.derive(Op::ArgmaxRows(target.node_id()));
        predicted
            .derive(Op::Equal(predicted.node_id(), expected.node_id()))
            .mean()
    }
}
