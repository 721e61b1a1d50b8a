/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : GraphInner - 计算图的底层实现
 *
 * 按职责拆分为：
 * - core：节点的增删查、参数读写
 * - eval：拓扑排序与数值求值
 * - grad：符号反向求导（生成新的表达式节点）
 */

mod core;
mod eval;
mod grad;

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::node::Node;

/// 图的完整定义（核心实现）
///
/// 节点只描述“怎么算”，除参数外不缓存任何数值；
/// 同一张图上可以编译出任意多个函数。
pub struct GraphInner {
    name: String,
    nodes: HashMap<super::NodeId, Node>,
    next_id: u64,
    /// 噪声、dropout掩码与参数初始化共用的随机数生成器
    rng: StdRng,
}

impl Default for GraphInner {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphInner {
    pub fn new() -> Self {
        Self::with_name("default_graph")
    }

    pub fn with_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: HashMap::new(),
            next_id: 0,
            rng: StdRng::from_entropy(),
        }
    }

    /// 创建带种子的图：噪声、dropout与参数初始化均可复现
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}
