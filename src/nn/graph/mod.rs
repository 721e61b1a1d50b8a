/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : Graph 模块：符号表达式图的核心实现
 *
 * 公开 API：
 * - `Graph`: 用户级句柄
 * - `GraphInner`: 底层实现
 * - `Function`: 由图编译出的可调用函数（输入 -> 输出，调用后应用参数更新）
 * - `GraphError`: 错误类型
 */

mod error;
mod function;
mod handle;
mod inner;
mod node;

pub use error::GraphError;
pub use function::Function;
pub use handle::Graph;
pub use inner::GraphInner;
pub use node::NodeId;
pub(crate) use node::Op;
