/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : Var 归约与广播扩展 trait
 */

use crate::nn::Var;
use crate::nn::graph::Op;
use crate::tensor::Axis;

/// 归约与广播扩展 trait。所有归约结果都保持2阶（标量为`[1, 1]`）
pub trait VarReduceOps {
    /// 所有元素之和（标量）
    fn sum(&self) -> Var;

    /// 所有元素的均值（标量）
    fn mean(&self) -> Var;

    /// 沿`axis`求和并保留该维
    fn sum_axis(&self, axis: Axis) -> Var;

    /// 沿`axis`求均值并保留该维；`mean_axis(Axis::Rows)`即逐列（逐特征）对样本求均值
    fn mean_axis(&self, axis: Axis) -> Var;

    /// 求和压缩到`like`的形状
    fn sum_to(&self, like: &Var) -> Var;

    /// 广播到`like`的形状
    fn broadcast_to(&self, like: &Var) -> Var;

    /// 元素个数（`axis`为`None`）或某轴的长度，结果为标量
    fn count(&self, axis: Option<Axis>) -> Var;
}

impl VarReduceOps for Var {
    fn sum(&self) -> Var {
        self.derive(Op::Sum(self.node_id()))
    }

    fn mean(&self) -> Var {
        self.derive(Op::Mean(self.node_id()))
    }

    fn sum_axis(&self, axis: Axis) -> Var {
        self.derive(Op::SumAxis(self.node_id(), axis))
    }

    fn mean_axis(&self, axis: Axis) -> Var {
        self.derive(Op::MeanAxis(self.node_id(), axis))
    }

    fn sum_to(&self, like: &Var) -> Var {
        self.assert_same_graph(like);
        self.derive(Op::SumTo(self.node_id(), like.node_id()))
    }

    fn broadcast_to(&self, like: &Var) -> Var {
        self.assert_same_graph(like);
        self.derive(Op::BroadcastTo(self.node_id(), like.node_id()))
    }

    fn count(&self, axis: Option<Axis>) -> Var {
        self.derive(Op::Count(self.node_id(), axis))
    }
}
