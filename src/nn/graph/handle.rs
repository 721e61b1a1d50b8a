/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : Graph 句柄（用户级 API）
 */

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{Function, GraphError, GraphInner};
use crate::nn::NodeId;
use crate::nn::var::{Init, Var};
use crate::tensor::Tensor;

/// Graph - 符号表达式图句柄
///
/// # 设计原则
/// - 是 `Rc<RefCell<GraphInner>>` 的薄封装
/// - Clone 语义：多个 Graph 引用同一个 GraphInner
/// - 创建的 Var 自动持有图引用
#[derive(Clone, Default)]
pub struct Graph {
    inner: Rc<RefCell<GraphInner>>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let g = self.inner.borrow();
        f.debug_struct("Graph")
            .field("name", &g.name())
            .field("nodes", &g.nodes_count())
            .finish()
    }
}

impl Graph {
    // ==================== 创建 ====================

    pub fn new() -> Self {
        Self::from_inner(GraphInner::new())
    }

    /// 创建带种子的图（用于确定性训练）
    pub fn new_with_seed(seed: u64) -> Self {
        Self::from_inner(GraphInner::new_with_seed(seed))
    }

    pub fn from_inner(inner: GraphInner) -> Self {
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    pub(crate) const fn from_rc(inner: Rc<RefCell<GraphInner>>) -> Self {
        Self { inner }
    }

    /// 获取内部 GraphInner 的不可变引用
    pub fn inner(&self) -> std::cell::Ref<'_, GraphInner> {
        self.inner.borrow()
    }

    /// 获取内部 GraphInner 的可变引用
    pub fn inner_mut(&self) -> std::cell::RefMut<'_, GraphInner> {
        self.inner.borrow_mut()
    }

    /// 两个句柄是否指向同一张图
    pub fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// 将 NodeId 包装成 Var
    pub fn wrap_node_id(&self, node_id: NodeId) -> Var {
        Var::new(node_id, Rc::clone(&self.inner))
    }

    // ==================== 创建变量 ====================

    /// 创建符号输入（调用编译函数时才提供数值）
    pub fn input(&self, name: &str) -> Var {
        let id = self.inner.borrow_mut().new_input_node(name);
        self.wrap_node_id(id)
    }

    /// 创建参数节点并设置初值
    pub fn parameter(&self, name: &str, value: &Tensor) -> Result<Var, GraphError> {
        let id = self.inner.borrow_mut().new_parameter_node(name, value)?;
        Ok(self.wrap_node_id(id))
    }

    /// 创建参数节点，初值按`init`策略用图自身的随机数生成器生成
    pub fn parameter_with_init(
        &self,
        name: &str,
        shape: &[usize],
        init: &Init,
    ) -> Result<Var, GraphError> {
        let value = {
            let mut g = self.inner.borrow_mut();
            init.generate_with_rng(shape, g.rng_mut())
        };
        self.parameter(name, &value)
    }

    pub fn constant(&self, value: &Tensor) -> Var {
        let id = self.inner.borrow_mut().new_constant_node(value);
        self.wrap_node_id(id)
    }

    pub fn scalar(&self, value: f32) -> Var {
        self.constant(&Tensor::scalar(value))
    }

    // ==================== 求导、编译与求值 ====================

    /// 符号求导：返回`cost`关于`wrt`中每个变量的梯度表达式
    pub fn grad(&self, cost: &Var, wrt: &[Var]) -> Result<Vec<Var>, GraphError> {
        self.check_owned(std::iter::once(cost).chain(wrt))?;
        let ids: Vec<NodeId> = wrt.iter().map(Var::node_id).collect();
        let grads = self.inner.borrow_mut().grad(cost.node_id(), &ids)?;
        Ok(grads.into_iter().map(|id| self.wrap_node_id(id)).collect())
    }

    /// 编译函数。`updates`中的每一项为`(参数, 新值表达式)`
    pub fn function(
        &self,
        inputs: &[Var],
        outputs: &[Var],
        updates: &[(Var, Var)],
    ) -> Result<Function, GraphError> {
        self.check_owned(
            inputs
                .iter()
                .chain(outputs)
                .chain(updates.iter().flat_map(|(p, e)| [p, e])),
        )?;
        Function::compile(
            Rc::clone(&self.inner),
            inputs.iter().map(Var::node_id).collect(),
            outputs.iter().map(Var::node_id).collect(),
            updates
                .iter()
                .map(|(p, e)| (p.node_id(), e.node_id()))
                .collect(),
        )
    }

    /// 不经编译直接求值（调试、测试用）
    pub fn evaluate(
        &self,
        outputs: &[Var],
        feeds: &[(&Var, &Tensor)],
    ) -> Result<Vec<Tensor>, GraphError> {
        self.check_owned(outputs.iter().chain(feeds.iter().map(|(v, _)| *v)))?;
        let feeds: HashMap<NodeId, Tensor> = feeds
            .iter()
            .map(|(v, t)| (v.node_id(), (*t).clone()))
            .collect();
        let ids: Vec<NodeId> = outputs.iter().map(Var::node_id).collect();
        self.inner.borrow_mut().evaluate(&ids, &feeds)
    }

    pub fn nodes_count(&self) -> usize {
        self.inner.borrow().nodes_count()
    }

    fn check_owned<'a>(&self, vars: impl IntoIterator<Item = &'a Var>) -> Result<(), GraphError> {
        for var in vars {
            if !self.same(&var.get_graph()) {
                return Err(GraphError::InvalidOperation(
                    "不能使用来自不同 Graph 的 Var".to_string(),
                ));
            }
        }
        Ok(())
    }
}
