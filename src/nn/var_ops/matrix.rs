/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @Description  : Var 矩阵运算扩展 trait
 */

use crate::nn::Var;
use crate::nn::graph::Op;

/// 矩阵运算扩展 trait
///
/// 形状不匹配不会在构图时报错，而是在求值时以`GraphError::ShapeMismatch`返回。
pub trait VarMatrixOps {
    /// 矩阵乘法
    ///
    /// # 形状要求
    /// - self: [m, k]
    /// - other: [k, n]
    /// - 输出: [m, n]
    fn matmul(&self, other: &Var) -> Var;

    fn transpose(&self) -> Var;
}

impl VarMatrixOps for Var {
    fn matmul(&self, other: &Var) -> Var {
        self.assert_same_graph(other);
        self.derive(Op::MatMul(self.node_id(), other.node_id()))
    }

    fn transpose(&self) -> Var {
        self.derive(Op::Transpose(self.node_id()))
    }
}
