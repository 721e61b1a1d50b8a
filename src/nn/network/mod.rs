/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : Network 模块：由层描述拼装前馈网络，并提供缓存、损失与持久化
 *
 * 数据流：层描述 -> 拓扑构建（builder） -> 层列表
 *        -> 构图缓存（按构图选项） -> (各层输出, 监控项, 更新规则)
 *        -> 函数缓存 -> 编译好的前向函数
 *        另一路 -> 损失（误差 + 正则项）
 */

mod builder;
mod cache;
mod error;
mod io;
mod kind;
#[allow(clippy::module_inception)]
mod network;
mod options;
mod regularizer;
mod spec;

pub use cache::GraphOutputs;
pub use error::NetworkError;
pub use io::{LoadMode, load, load_with_registry};
pub use kind::NetworkKind;
pub use network::{Loss, Network};
pub use options::{GraphOptions, LossOptions, NetworkOptions};
pub use regularizer::Regularizer;
pub use spec::{Hint, LayerRequest, LayerSpec, NormalizeContext, Resolved, normalize};
