/*
 * @Author       : 老董
 * @Date         : 2025-12-22
 * @Description  : Layer 模块 - 网络中带名称、尺寸与可学习参数的一级变换
 *
 * 每个层只负责把若干输入表达式变换成一个输出表达式，
 * 层与层之间的连线、噪声和dropout的取值都由网络决定。
 */

mod activation;
mod feedforward;
mod input;
mod registry;

use serde_json::{Map, Value};

use crate::nn::{Graph, NetworkError, Var};

pub use activation::Activation;
pub use feedforward::Feedforward;
pub use input::Input;
pub use registry::{LayerFactory, LayerRegistry};

/// 层对一组输入求值的结果
#[derive(Debug, Clone)]
pub struct LayerOutput {
    pub output: Var,
    /// 供训练时观察的具名表达式
    pub monitors: Vec<(String, Var)>,
    /// (参数, 新值表达式)，每次调用编译后的函数时都会执行
    pub updates: Vec<(Var, Var)>,
}

impl LayerOutput {
    pub fn new(output: Var) -> Self {
        Self {
            output,
            monitors: vec![],
            updates: vec![],
        }
    }
}

/// 按位置或名称引用一个层
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerRef {
    /// 0 表示输入层
    Index(usize),
    Name(String),
}

/// 按位置或名称引用层内的一个参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamRef {
    Index(usize),
    /// 完整名称（如`hid1.w`）或省略层名的短名称（如`w`）
    Name(String),
}

macro_rules! impl_ref_from {
    ($ty:ident) => {
        impl From<usize> for $ty {
            fn from(index: usize) -> Self {
                Self::Index(index)
            }
        }

        impl From<&str> for $ty {
            fn from(name: &str) -> Self {
                Self::Name(name.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(name: String) -> Self {
                Self::Name(name)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    Self::Index(i) => write!(f, "{i}"),
                    Self::Name(name) => f.write_str(name),
                }
            }
        }
    };
}

impl_ref_from!(LayerRef);
impl_ref_from!(ParamRef);

/// 层的构造参数（经层描述解析后得到的规范形式）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerConfig {
    pub name: String,
    pub size: Option<usize>,
    pub activation: String,
    /// 按顺序排列的`(上游输出名, 上游尺寸)`，例如`("hid1.out", 8)`
    pub inputs: Vec<(String, usize)>,
    /// 其余未被识别的构造参数，原样交给具体的层
    pub extra: Map<String, Value>,
}

impl LayerConfig {
    pub(crate) fn require_size(&self) -> Result<usize, NetworkError> {
        match self.size {
            Some(size) if size > 0 => Ok(size),
            Some(_) => Err(NetworkError::InvalidSpec(format!(
                "层`{}`的size必须为正整数",
                self.name
            ))),
            None => Err(NetworkError::MissingSize(self.name.clone())),
        }
    }
}

/// 层 trait
///
/// 层在构造后不可变，只有其参数的数值会被训练或`load_params`改写。
pub trait Layer: std::fmt::Debug {
    fn name(&self) -> &str;

    /// 输出维度
    fn size(&self) -> usize;

    /// 注册名（小写），如`feedforward`
    fn form(&self) -> &str;

    /// 按顺序排列的`(上游输出名, 上游尺寸)`
    fn inputs(&self) -> &[(String, usize)];

    fn activation(&self) -> &Activation;

    /// 可学习参数（顺序即持久化时的顺序）
    fn params(&self) -> Vec<Var>;

    /// 层的额外构造参数，序列化时原样写回
    fn extra(&self) -> &Map<String, Value>;

    /// 用`inputs`（与`self.inputs()`一一对应）构建本层输出。
    /// 噪声和dropout作用在本层的输出上。
    fn output(&self, inputs: &[Var], noise: f32, dropout: f32)
    -> Result<LayerOutput, NetworkError>;

    /// 输出在网络中的名称
    fn output_name(&self) -> String {
        format!("{}.out", self.name())
    }

    /// 参数中标量的总个数
    fn num_params(&self) -> usize {
        self.params()
            .iter()
            .map(|p| p.value().map(|v| v.size()).unwrap_or(0))
            .sum()
    }

    fn find(&self, param: &ParamRef) -> Result<Var, NetworkError> {
        let params = self.params();
        let found = match param {
            ParamRef::Index(i) => params.get(*i).cloned(),
            ParamRef::Name(key) => {
                let full = format!("{}.{key}", self.name());
                params
                    .into_iter()
                    .find(|p| p.name() == *key || p.name() == full)
            }
        };
        found.ok_or_else(|| NetworkError::ParamNotFound {
            layer: self.name().to_string(),
            param: param.to_string(),
        })
    }

    /// 参数所在的图（无参数的层返回`None`）
    fn graph(&self) -> Option<Graph> {
        self.params().first().map(Var::get_graph)
    }

    /// 能重新构造出本层的描述（映射形式）
    fn to_spec(&self) -> Map<String, Value> {
        let mut spec = self.extra().clone();
        spec.insert("form".into(), self.form().into());
        spec.insert("name".into(), self.name().into());
        spec.insert("size".into(), self.size().into());
        spec.insert("activation".into(), self.activation().name().into());
        let inputs: Map<String, Value> = self
            .inputs()
            .iter()
            .map(|(name, size)| (name.clone(), Value::from(*size)))
            .collect();
        spec.insert("inputs".into(), Value::Object(inputs));
        spec
    }
}
