/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : Var 随机扰动扩展 trait（训练期正则化用）
 */

use crate::nn::Var;
use crate::nn::graph::Op;

/// 随机扰动扩展 trait
///
/// 噪声与掩码在编译函数的每次调用时由图的随机数生成器重新采样，对求导而言视作常量。
pub trait VarRandomOps {
    /// 叠加零均值、标准差为`std`的高斯噪声；`std <= 0`时原样返回
    fn add_noise(&self, std: f32) -> Var;

    /// 以概率`p`把元素置零（不做`1/(1-p)`的缩放）；`p <= 0`时原样返回
    fn dropout(&self, p: f32) -> Var;
}

impl VarRandomOps for Var {
    fn add_noise(&self, std: f32) -> Var {
        if std <= 0.0 {
            return self.clone();
        }
        let noise = self.derive(Op::GaussianNoise {
            like: self.node_id(),
            std,
        });
        self + &noise
    }

    fn dropout(&self, p: f32) -> Var {
        if p <= 0.0 {
            return self.clone();
        }
        let mask = self.derive(Op::BernoulliMask {
            like: self.node_id(),
            keep: 1.0 - p,
        });
        self * &mask
    }
}
