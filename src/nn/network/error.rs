/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 网络层面（拓扑解析、构建、查找、求值、持久化）的错误类型
 */

use thiserror::Error;

use crate::nn::GraphError;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("找不到层`{0}`")]
    LayerNotFound(String),
    #[error("层`{layer}`中找不到参数`{param}`")]
    ParamNotFound { layer: String, param: String },
    #[error("未注册的层类型`{0}`")]
    UnknownForm(String),
    #[error("未知的激活函数`{0}`")]
    UnknownActivation(String),
    #[error("层描述不合法：{0}")]
    InvalidSpec(String),
    #[error("层`{0}`缺少`size`")]
    MissingSize(String),
    #[error("存档中缺少参数：{0}")]
    MissingParams(String),
    #[error("未知的网络类型`{0}`")]
    UnknownKind(String),
    #[error("网络没有任何层")]
    EmptyNetwork,
    #[error("监控项`{0}`不是标量")]
    NonScalarMonitor(String),
    #[error("选项`{name}`必须是有限值，实际为{value}")]
    InvalidOption { name: &'static str, value: f32 },
    #[error("读写文件失败：{0}")]
    Io(#[from] std::io::Error),
    #[error("（反）序列化失败：{0}")]
    Serialization(String),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for NetworkError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
