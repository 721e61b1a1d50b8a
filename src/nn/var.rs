/*
 * @Author       : 老董
 * @Date         : 2026-01-08
 * @Description  : Var - 符号变量句柄，支持算子重载和链式调用
 */

use super::graph::{GraphInner, Op};
use super::{GraphError, NodeId};
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::rc::Rc;

// ==================== Init 枚举 ====================

/// 参数初始化策略
#[derive(Debug, Clone)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    /// 全零
    Zeros,
    /// 正态分布
    Normal { mean: f32, std: f32 },
    /// Xavier/Glorot 初始化（适用于 Sigmoid/Tanh）
    Xavier,
}

impl Init {
    /// 生成初始化后的 Tensor（使用指定的 RNG）
    pub fn generate_with_rng(&self, shape: &[usize], rng: &mut StdRng) -> Tensor {
        match self {
            Self::Constant(v) => Tensor::filled(*v, shape),
            Self::Zeros => Tensor::zeros(shape),
            Self::Normal { mean, std } => Tensor::normal_with_rng(*mean, *std, shape, rng),
            Self::Xavier => {
                let (fan_in, fan_out) = (shape[0], shape.get(1).copied().unwrap_or(1));
                let std = (2.0 / (fan_in + fan_out) as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
        }
    }
}

// ==================== Var 结构 ====================

/// 符号变量句柄 - 携带图引用，支持算子重载和链式调用
///
/// Var 只代表“一个表达式”，本身没有数值（参数除外）；
/// 数值要通过`Graph::function`编译出的函数或`Graph::evaluate`求得。
///
/// # 使用示例
/// ```ignore
/// let graph = Graph::new();
/// let x = graph.input("x");
/// let w = graph.parameter("w", &Tensor::ones(&[3, 2]))?;
/// let y = x.matmul(&w).sigmoid();
/// let f = graph.function(&[x], &[y], &[])?;
/// ```
#[derive(Clone)]
pub struct Var {
    id: NodeId,
    graph: Rc<RefCell<GraphInner>>,
}

impl std::fmt::Debug for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Var")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}

impl Var {
    pub(crate) const fn new(id: NodeId, graph: Rc<RefCell<GraphInner>>) -> Self {
        Self { id, graph }
    }

    pub const fn node_id(&self) -> NodeId {
        self.id
    }

    /// 检查两个 Var 是否来自同一个 Graph
    pub fn same_graph(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.graph, &other.graph)
    }

    /// 获取 Var 所属的 Graph handle
    pub fn get_graph(&self) -> super::graph::Graph {
        super::graph::Graph::from_rc(Rc::clone(&self.graph))
    }

    pub fn name(&self) -> String {
        self.graph
            .borrow()
            .get_node_name(self.id)
            .map(str::to_string)
            .unwrap_or_default()
    }

    pub fn is_parameter(&self) -> bool {
        self.graph
            .borrow()
            .is_parameter_node(self.id)
            .unwrap_or(false)
    }

    /// 断言两个 Var 来自同一个 Graph，否则 panic（供算子重载使用）
    pub(crate) fn assert_same_graph(&self, other: &Self) {
        assert!(
            self.same_graph(other),
            "不能对来自不同 Graph 的 Var 进行操作"
        );
    }

    /// 在同一张图上追加一个以本变量（及其他变量）为输入的新节点
    pub(crate) fn derive(&self, op: Op) -> Self {
        let id = self.graph.borrow_mut().add_node(op, None);
        Self::new(id, Rc::clone(&self.graph))
    }

    // ==================== 值访问和设置（仅参数） ====================

    /// 获取参数的当前值（克隆的 Tensor）
    pub fn value(&self) -> Result<Tensor, GraphError> {
        Ok(self.graph.borrow().get_parameter_value(self.id)?.clone())
    }

    /// 覆写参数值
    pub fn set_value(&self, value: &Tensor) -> Result<(), GraphError> {
        self.graph.borrow_mut().set_parameter_value(self.id, value)
    }

    // ==================== 安全版本（返回 Result）====================

    fn try_binary(
        &self,
        other: &Self,
        op: fn(NodeId, NodeId) -> Op,
        op_name: &str,
    ) -> Result<Self, GraphError> {
        if !self.same_graph(other) {
            return Err(GraphError::InvalidOperation(format!(
                "不能对来自不同 Graph 的 Var 进行{op_name}"
            )));
        }
        Ok(self.derive(op(self.id, other.id)))
    }

    pub fn try_add(&self, other: &Self) -> Result<Self, GraphError> {
        self.try_binary(other, Op::Add, "加法")
    }

    pub fn try_sub(&self, other: &Self) -> Result<Self, GraphError> {
        self.try_binary(other, Op::Sub, "减法")
    }

    /// 逐元素乘法（支持广播）
    pub fn try_mul(&self, other: &Self) -> Result<Self, GraphError> {
        self.try_binary(other, Op::Mul, "乘法")
    }

    pub fn try_div(&self, other: &Self) -> Result<Self, GraphError> {
        self.try_binary(other, Op::Div, "除法")
    }

    /// 乘以一个常数
    pub fn scale(&self, factor: f32) -> Self {
        let c = self.graph.borrow_mut().new_constant_node(&Tensor::scalar(factor));
        self.derive(Op::Mul(self.id, c))
    }
}

// ==================== 算子重载 ====================

macro_rules! impl_var_binary_op {
    ($trait:ident, $method:ident, $try_method:ident, $msg:literal) => {
        impl $trait for &Var {
            type Output = Var;

            fn $method(self, other: &Var) -> Var {
                self.assert_same_graph(other);
                self.$try_method(other).expect($msg)
            }
        }

        impl $trait for Var {
            type Output = Self;

            fn $method(self, other: Self) -> Self {
                (&self).$method(&other)
            }
        }

        impl $trait<Var> for &Var {
            type Output = Var;

            fn $method(self, other: Var) -> Var {
                self.$method(&other)
            }
        }

        impl $trait<&Self> for Var {
            type Output = Self;

            fn $method(self, other: &Self) -> Self {
                (&self).$method(other)
            }
        }
    };
}

impl_var_binary_op!(Add, add, try_add, "Var 加法失败");
impl_var_binary_op!(Sub, sub, try_sub, "Var 减法失败");
impl_var_binary_op!(Mul, mul, try_mul, "Var 乘法失败");
impl_var_binary_op!(Div, div, try_div, "Var 除法失败");

impl Neg for &Var {
    type Output = Var;

    fn neg(self) -> Var {
        self.derive(Op::Neg(self.id))
    }
}

impl Neg for Var {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}
