/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 符号反向求导
 *
 * 与逐节点累加jacobi的数值反向传播不同，这里的梯度本身也是图中的表达式节点：
 * 求得的梯度可以继续参与运算（例如收缩正则项需要对隐层输出关于输入的梯度再求平方和），
 * 也可以再次求导。
 */

use std::collections::{HashMap, HashSet};

use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::graph::GraphError;
use crate::nn::graph::node::Op;
use crate::tensor::{Axis, Tensor};

impl GraphInner {
    /// 求`cost`关于`wrt`中每个节点的梯度表达式。
    ///
    /// `cost`非标量时按其所有元素之和求导；
    /// 与`cost`无关的节点，梯度为与其同形的全零表达式。
    pub fn grad(&mut self, cost: NodeId, wrt: &[NodeId]) -> Result<Vec<NodeId>, GraphError> {
        for &id in wrt {
            self.get_node(id)?;
        }
        let order = self.schedule(&[cost])?;

        // 只沿着能到达`wrt`的路径反传
        let targets: HashSet<NodeId> = wrt.iter().copied().collect();
        let mut relevant: HashSet<NodeId> = HashSet::new();
        for &id in &order {
            let reaches = targets.contains(&id)
                || self
                    .get_node(id)?
                    .op
                    .parents()
                    .iter()
                    .any(|p| relevant.contains(p));
            if reaches {
                relevant.insert(id);
            }
        }

        let mut adjoints: HashMap<NodeId, NodeId> = HashMap::new();
        if relevant.contains(&cost) {
            let one = self.new_constant_node(&Tensor::scalar(1.0));
            let seed = self.add_node(Op::BroadcastTo(one, cost), None);
            adjoints.insert(cost, seed);
        }

        for &id in order.iter().rev() {
            if !relevant.contains(&id) {
                continue;
            }
            let Some(&g) = adjoints.get(&id) else {
                continue;
            };
            for (parent, contribution) in self.backprop(id, g, &relevant)? {
                let total = match adjoints.get(&parent) {
                    Some(&acc) => self.add_node(Op::Add(acc, contribution), None),
                    None => contribution,
                };
                adjoints.insert(parent, total);
            }
        }

        let mut grads = Vec::with_capacity(wrt.len());
        for &w in wrt {
            let g = match adjoints.get(&w) {
                Some(&g) => g,
                None => {
                    let zero = self.new_constant_node(&Tensor::scalar(0.0));
                    self.add_node(Op::BroadcastTo(zero, w), None)
                }
            };
            grads.push(g);
        }
        Ok(grads)
    }

    /// 节点`id`的上游梯度为`g`时，对各（相关）父节点的梯度贡献
    fn backprop(
        &mut self,
        id: NodeId,
        g: NodeId,
        relevant: &HashSet<NodeId>,
    ) -> Result<Vec<(NodeId, NodeId)>, GraphError> {
        let op = self.get_node(id)?.op.clone();
        let z = id;
        let mut out = Vec::new();
        let wants = |n: &NodeId| relevant.contains(n);

        match op {
            Op::Input | Op::Parameter | Op::Constant(_) => {}

            Op::Add(a, b) => {
                if wants(&a) {
                    out.push((a, self.add_node(Op::SumTo(g, a), None)));
                }
                if wants(&b) {
                    out.push((b, self.add_node(Op::SumTo(g, b), None)));
                }
            }
            Op::Sub(a, b) => {
                if wants(&a) {
                    out.push((a, self.add_node(Op::SumTo(g, a), None)));
                }
                if wants(&b) {
                    let neg = self.add_node(Op::Neg(g), None);
                    out.push((b, self.add_node(Op::SumTo(neg, b), None)));
                }
            }
            Op::Mul(a, b) => {
                if wants(&a) {
                    let gb = self.add_node(Op::Mul(g, b), None);
                    out.push((a, self.add_node(Op::SumTo(gb, a), None)));
                }
                if wants(&b) {
                    let ga = self.add_node(Op::Mul(g, a), None);
                    out.push((b, self.add_node(Op::SumTo(ga, b), None)));
                }
            }
            Op::Div(a, b) => {
                if wants(&a) {
                    let gb = self.add_node(Op::Div(g, b), None);
                    out.push((a, self.add_node(Op::SumTo(gb, a), None)));
                }
                if wants(&b) {
                    // d(a/b)/db = -z/b
                    let gz = self.add_node(Op::Mul(g, z), None);
                    let gzb = self.add_node(Op::Div(gz, b), None);
                    let neg = self.add_node(Op::Neg(gzb), None);
                    out.push((b, self.add_node(Op::SumTo(neg, b), None)));
                }
            }

            Op::MatMul(a, b) => {
                if wants(&a) {
                    let bt = self.add_node(Op::Transpose(b), None);
                    out.push((a, self.add_node(Op::MatMul(g, bt), None)));
                }
                if wants(&b) {
                    let at = self.add_node(Op::Transpose(a), None);
                    out.push((b, self.add_node(Op::MatMul(at, g), None)));
                }
            }
            Op::Transpose(a) => out.push((a, self.add_node(Op::Transpose(g), None))),

            Op::Neg(a) => out.push((a, self.add_node(Op::Neg(g), None))),
            Op::Abs(a) => {
                let sign = self.add_node(Op::Sign(a), None);
                out.push((a, self.add_node(Op::Mul(g, sign), None)));
            }
            Op::Sqr(a) => {
                let two = self.new_constant_node(&Tensor::scalar(2.0));
                let two_a = self.add_node(Op::Mul(two, a), None);
                out.push((a, self.add_node(Op::Mul(g, two_a), None)));
            }
            Op::Exp(a) => out.push((a, self.add_node(Op::Mul(g, z), None))),
            Op::Log(a) => out.push((a, self.add_node(Op::Div(g, a), None))),
            Op::Sigmoid(a) => {
                let one = self.new_constant_node(&Tensor::scalar(1.0));
                let one_minus = self.add_node(Op::Sub(one, z), None);
                let local = self.add_node(Op::Mul(z, one_minus), None);
                out.push((a, self.add_node(Op::Mul(g, local), None)));
            }
            Op::Tanh(a) => {
                let one = self.new_constant_node(&Tensor::scalar(1.0));
                let z2 = self.add_node(Op::Sqr(z), None);
                let local = self.add_node(Op::Sub(one, z2), None);
                out.push((a, self.add_node(Op::Mul(g, local), None)));
            }
            Op::Relu(a) => {
                let step = self.add_node(Op::Step(a), None);
                out.push((a, self.add_node(Op::Mul(g, step), None)));
            }
            Op::Softplus(a) => {
                let sig = self.add_node(Op::Sigmoid(a), None);
                out.push((a, self.add_node(Op::Mul(g, sig), None)));
            }
            Op::Softmax(a) => {
                // z * (g - Σ_j g_j z_j)
                let gz = self.add_node(Op::Mul(g, z), None);
                let dot = self.add_node(Op::SumAxis(gz, Axis::Cols), None);
                let centered = self.add_node(Op::Sub(g, dot), None);
                out.push((a, self.add_node(Op::Mul(z, centered), None)));
            }

            Op::Sum(a) | Op::SumAxis(a, _) | Op::SumTo(a, _) => {
                if wants(&a) {
                    out.push((a, self.add_node(Op::BroadcastTo(g, a), None)));
                }
            }
            Op::Mean(a) | Op::MeanAxis(a, _) => {
                let axis = match op {
                    Op::MeanAxis(_, axis) => Some(axis),
                    _ => None,
                };
                let n = self.add_node(Op::Count(a, axis), None);
                let scaled = self.add_node(Op::Div(g, n), None);
                out.push((a, self.add_node(Op::BroadcastTo(scaled, a), None)));
            }
            Op::BroadcastTo(a, _) => {
                if wants(&a) {
                    out.push((a, self.add_node(Op::SumTo(g, a), None)));
                }
            }

            // 分段常数或随机采样：梯度恒为零，不再向上传播
            Op::Sign(_)
            | Op::Step(_)
            | Op::Count(..)
            | Op::ArgmaxRows(_)
            | Op::Equal(..)
            | Op::GaussianNoise { .. }
            | Op::BernoulliMask { .. } => {}
        }
        out.retain(|(parent, _)| wants(parent));
        Ok(out)
    }
}
