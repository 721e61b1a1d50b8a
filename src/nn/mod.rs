/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-11
 * @Description  : 负责神经网络（neural network）的构建
 */

mod graph;
pub mod layer;
pub mod network;
mod var;
mod var_ops;

pub use graph::{Function, Graph, GraphError, GraphInner, NodeId};
pub use layer::{Layer, LayerConfig, LayerOutput, LayerRef, LayerRegistry, ParamRef};
pub use network::{
    GraphOptions, Hint, LayerSpec, LoadMode, Loss, LossOptions, Network, NetworkError,
    NetworkKind, NetworkOptions,
};
pub use var::{Init, Var};
pub use var_ops::{VarActivationOps, VarLossOps, VarMatrixOps, VarRandomOps, VarReduceOps};

#[cfg(test)]
mod tests;
