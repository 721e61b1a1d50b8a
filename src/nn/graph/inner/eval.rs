/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 拓扑排序与数值求值
 */

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;

use super::GraphInner;
use crate::errors::TensorError;
use crate::nn::NodeId;
use crate::nn::graph::GraphError;
use crate::nn::graph::node::{Node, Op};
use crate::tensor::Tensor;

impl GraphInner {
    /// 求出计算`targets`所需的全部节点，父节点总排在子节点之前
    pub fn schedule(&self, targets: &[NodeId]) -> Result<Vec<NodeId>, GraphError> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        // (节点, 父节点是否已入栈)
        let mut stack: Vec<(NodeId, bool)> = targets.iter().rev().map(|&id| (id, false)).collect();

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                if visited.insert(id) {
                    order.push(id);
                }
                continue;
            }
            if visited.contains(&id) {
                continue;
            }
            let node = self.get_node(id)?;
            stack.push((id, true));
            for parent in node.op.parents().into_iter().rev() {
                if !visited.contains(&parent) {
                    stack.push((parent, false));
                }
            }
        }
        Ok(order)
    }

    /// 按`schedule`顺序计算各节点的值。`feeds`须覆盖其中所有输入节点
    pub fn run(
        &mut self,
        schedule: &[NodeId],
        feeds: &HashMap<NodeId, Tensor>,
    ) -> Result<HashMap<NodeId, Tensor>, GraphError> {
        let mut values: HashMap<NodeId, Tensor> = HashMap::with_capacity(schedule.len());
        for &id in schedule {
            let node = self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))?;
            let value = match node.op {
                Op::Input => feeds
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| GraphError::MissingInput(node.name.clone()))?,
                _ => compute(node, &values, &mut self.rng)?,
            };
            values.insert(id, value);
        }
        Ok(values)
    }

    /// 一次性求出`targets`的值（不经编译，适合调试与测试）
    pub fn evaluate(
        &mut self,
        targets: &[NodeId],
        feeds: &HashMap<NodeId, Tensor>,
    ) -> Result<Vec<Tensor>, GraphError> {
        let schedule = self.schedule(targets)?;
        let values = self.run(&schedule, feeds)?;
        targets
            .iter()
            .map(|id| values.get(id).cloned().ok_or(GraphError::NodeNotFound(*id)))
            .collect()
    }
}

fn compute(
    node: &Node,
    values: &HashMap<NodeId, Tensor>,
    rng: &mut StdRng,
) -> Result<Tensor, GraphError> {
    let get = |id: &NodeId| values.get(id).ok_or(GraphError::NodeNotFound(*id));
    let wrap = |e: TensorError| GraphError::from_tensor(&node.name, e);

    let value = match &node.op {
        Op::Input => return Err(GraphError::MissingInput(node.name.clone())),
        Op::Parameter => node.value.clone().ok_or_else(|| {
            GraphError::ComputationError(format!("参数`{}`尚未初始化", node.name))
        })?,
        Op::Constant(t) => t.clone(),

        Op::Add(a, b) => get(a)?.add(get(b)?).map_err(wrap)?,
        Op::Sub(a, b) => get(a)?.sub(get(b)?).map_err(wrap)?,
        Op::Mul(a, b) => get(a)?.mul(get(b)?).map_err(wrap)?,
        Op::Div(a, b) => get(a)?.div(get(b)?).map_err(wrap)?,

        Op::MatMul(a, b) => get(a)?.mat_mul(get(b)?).map_err(wrap)?,
        Op::Transpose(a) => get(a)?.transpose(),

        Op::Neg(a) => get(a)?.map(|x| -x),
        Op::Abs(a) => get(a)?.map(f32::abs),
        Op::Sign(a) => get(a)?.map(|x| {
            if x > 0.0 {
                1.0
            } else if x < 0.0 {
                -1.0
            } else {
                0.0
            }
        }),
        Op::Step(a) => get(a)?.map(|x| if x > 0.0 { 1.0 } else { 0.0 }),
        Op::Sqr(a) => get(a)?.map(|x| x * x),
        Op::Exp(a) => get(a)?.map(f32::exp),
        Op::Log(a) => get(a)?.map(f32::ln),
        Op::Sigmoid(a) => get(a)?.map(|x| 1.0 / (1.0 + (-x).exp())),
        Op::Tanh(a) => get(a)?.map(f32::tanh),
        Op::Relu(a) => get(a)?.map(|x| x.max(0.0)),
        // ln(1 + e^x) = max(x, 0) + ln(1 + e^-|x|)，避免大x溢出
        Op::Softplus(a) => get(a)?.map(|x| x.max(0.0) + (-x.abs()).exp().ln_1p()),
        Op::Softmax(a) => get(a)?.softmax_rows(),

        Op::Sum(a) => get(a)?.sum(),
        Op::Mean(a) => get(a)?.mean(),
        Op::SumAxis(a, axis) => get(a)?.sum_axis(*axis),
        Op::MeanAxis(a, axis) => get(a)?.mean_axis(*axis),
        Op::SumTo(a, like) => get(a)?.sum_to(get(like)?.shape()).map_err(wrap)?,
        Op::BroadcastTo(a, like) => get(a)?.broadcast_to(get(like)?.shape()).map_err(wrap)?,
        Op::Count(a, axis) => {
            let t = get(a)?;
            let n = match axis {
                None => t.size(),
                Some(axis) => t.shape()[axis.index()],
            };
            Tensor::scalar(n as f32)
        }

        Op::ArgmaxRows(a) => get(a)?.argmax_rows(),
        Op::Equal(a, b) => get(a)?.eq_mask(get(b)?).map_err(wrap)?,

        Op::GaussianNoise { like, std } => {
            Tensor::normal_with_rng(0.0, *std, get(like)?.shape(), rng)
        }
        Op::BernoulliMask { like, keep } => {
            Tensor::bernoulli_with_rng(*keep, get(like)?.shape(), rng)
        }
    };
    Ok(value)
}
