/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @Description  : Var 扩展 trait 模块
 *
 * 按功能领域组织 Var 的扩展方法，用户按需 import。
 *
 * # 模块结构
 * - `activation`: 逐元素非线性（relu, sigmoid, tanh, softplus, softmax, abs, sqr, exp, log...）
 * - `loss`: 误差函数（mse, cross_entropy, accuracy）
 * - `matrix`: 矩阵运算（matmul, transpose）
 * - `random`: 随机扰动（高斯噪声、dropout）
 * - `reduce`: 归约与广播（sum, mean, sum_axis, mean_axis, sum_to, broadcast_to）
 *
 * # 使用示例
 * ```ignore
 * use only_net::nn::{Var, VarActivationOps, VarMatrixOps, VarReduceOps};
 *
 * let h = x.matmul(&w).sigmoid();
 * let penalty = h.sqr().mean_axis(Axis::Rows).sum();
 * ```
 */

mod activation;
mod loss;
mod matrix;
mod random;
mod reduce;

pub use activation::VarActivationOps;
pub use loss::VarLossOps;
pub use matrix::VarMatrixOps;
pub use random::VarRandomOps;
pub use reduce::VarReduceOps;
