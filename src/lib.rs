//! # Only Net
//!
//! 由声明式的层描述拼装前馈神经网络：输入层 -> 若干隐层 -> 输出（解码）层。
//! 网络被构建成符号表达式图，可按不同的噪声、dropout选项生成并缓存多张图与编译后的前向函数，
//! 并提供误差、正则项、监控项的组合以及参数的保存与加载。
//!

pub mod errors;
pub mod nn;
pub mod tensor;
pub mod utils;
