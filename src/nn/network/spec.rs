/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 层描述（LayerSpec）及其规范化
 *
 * 同一个层可以有多种写法：
 * - 整数：`8`，只给出尺寸
 * - 提示元组：`["tanh", 8]`、`[Hint::Form("ff"), 8, "relu"]`，顺序任意
 * - 映射：`{"form": "feedforward", "size": 8, "activation": "relu"}`
 * - 已构造好的层对象
 * 规范化把它们统一成`LayerRequest { form, config }`。
 */

use std::rc::Rc;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::nn::NetworkError;
use crate::nn::layer::{Layer, LayerConfig, LayerRegistry};

pub(crate) const DEFAULT_FORM: &str = "feedforward";

/// 提示元组中的一个元素
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HintRepr", into = "HintRepr")]
pub enum Hint {
    Size(usize),
    /// 明确的层类型
    Form(String),
    /// 若是已注册的层类型名则作层类型，否则作激活函数名
    Text(String),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum HintRepr {
    Size(usize),
    Text(String),
    Form { form: String },
}

impl From<HintRepr> for Hint {
    fn from(repr: HintRepr) -> Self {
        match repr {
            HintRepr::Size(n) => Self::Size(n),
            HintRepr::Text(s) => Self::Text(s),
            HintRepr::Form { form } => Self::Form(form),
        }
    }
}

impl From<Hint> for HintRepr {
    fn from(hint: Hint) -> Self {
        match hint {
            Hint::Size(n) => Self::Size(n),
            Hint::Text(s) => Self::Text(s),
            Hint::Form(form) => Self::Form { form },
        }
    }
}

impl From<usize> for Hint {
    fn from(size: usize) -> Self {
        Self::Size(size)
    }
}

impl From<&str> for Hint {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// 单个层的描述
#[derive(Debug, Clone)]
pub enum LayerSpec {
    Size(usize),
    Hints(Vec<Hint>),
    Mapping(Map<String, Value>),
    /// 已构造好的层，原样加入网络（其参数须与网络在同一张图上）
    Prebuilt(Rc<dyn Layer>),
}

impl LayerSpec {
    pub fn hints<H: Into<Hint>>(hints: impl IntoIterator<Item = H>) -> Self {
        Self::Hints(hints.into_iter().map(Into::into).collect())
    }

    /// 从JSON对象构造映射形式的描述
    pub fn mapping(value: Value) -> Result<Self, NetworkError> {
        match value {
            Value::Object(map) => Ok(Self::Mapping(map)),
            other => Err(NetworkError::InvalidSpec(format!(
                "映射形式的层描述必须是对象，实际为`{other}`"
            ))),
        }
    }

    /// 描述中能直接读出的尺寸
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Size(n) => Some(*n),
            Self::Hints(hints) => hints.iter().rev().find_map(|h| match h {
                Hint::Size(n) => Some(*n),
                _ => None,
            }),
            Self::Mapping(map) => map
                .get("size")
                .and_then(Value::as_u64)
                .and_then(|n| usize::try_from(n).ok()),
            Self::Prebuilt(layer) => Some(layer.size()),
        }
    }
}

impl From<usize> for LayerSpec {
    fn from(size: usize) -> Self {
        Self::Size(size)
    }
}

impl From<Vec<Hint>> for LayerSpec {
    fn from(hints: Vec<Hint>) -> Self {
        Self::Hints(hints)
    }
}

impl From<Map<String, Value>> for LayerSpec {
    fn from(map: Map<String, Value>) -> Self {
        Self::Mapping(map)
    }
}

impl From<Rc<dyn Layer>> for LayerSpec {
    fn from(layer: Rc<dyn Layer>) -> Self {
        Self::Prebuilt(layer)
    }
}

impl PartialEq for LayerSpec {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Size(a), Self::Size(b)) => a == b,
            (Self::Hints(a), Self::Hints(b)) => a == b,
            (Self::Mapping(a), Self::Mapping(b)) => a == b,
            (Self::Prebuilt(a), Self::Prebuilt(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// 已构造的层按其映射形式序列化，反序列化后即成为`Mapping`
impl Serialize for LayerSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Size(n) => serializer.serialize_u64(*n as u64),
            Self::Hints(hints) => hints.serialize(serializer),
            Self::Mapping(map) => map.serialize(serializer),
            Self::Prebuilt(layer) => layer.to_spec().serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LayerSpecRepr {
    Size(usize),
    Hints(Vec<Hint>),
    Mapping(Map<String, Value>),
}

impl<'de> Deserialize<'de> for LayerSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match LayerSpecRepr::deserialize(deserializer)? {
            LayerSpecRepr::Size(n) => Self::Size(n),
            LayerSpecRepr::Hints(hints) => Self::Hints(hints),
            LayerSpecRepr::Mapping(map) => Self::Mapping(map),
        })
    }
}

// ========== 规范化 ==========

/// 规范化后的构造请求：交给注册表按`form`构造
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRequest {
    pub form: String,
    pub config: LayerConfig,
}

#[derive(Debug, Clone)]
pub enum Resolved {
    Prebuilt(Rc<dyn Layer>),
    Request(LayerRequest),
}

/// 规范化时需要的上下文
pub struct NormalizeContext<'a> {
    /// 默认输入来自的上一层
    pub previous: &'a dyn Layer,
    /// 当前已有的层数，用于生成默认名称
    pub count: usize,
    pub hidden_activation: &'a str,
    pub registry: &'a LayerRegistry,
}

/// 把一个隐层描述规范化为构造请求
pub fn normalize(spec: &LayerSpec, ctx: &NormalizeContext<'_>) -> Result<Resolved, NetworkError> {
    let mut form = DEFAULT_FORM.to_string();
    let mut config = LayerConfig {
        name: format!("hid{}", ctx.count),
        size: None,
        activation: ctx.hidden_activation.to_string(),
        inputs: vec![(ctx.previous.output_name(), ctx.previous.size())],
        extra: Map::new(),
    };

    match spec {
        LayerSpec::Prebuilt(layer) => return Ok(Resolved::Prebuilt(Rc::clone(layer))),
        LayerSpec::Size(n) => config.size = Some(*n),
        LayerSpec::Hints(hints) => {
            let (mut has_form, mut has_size, mut has_activation) = (false, false, false);
            for hint in hints {
                match hint {
                    Hint::Size(n) => {
                        warn_if_conflict(&mut has_size, "size", ctx.count);
                        config.size = Some(*n);
                    }
                    Hint::Form(f) => {
                        warn_if_conflict(&mut has_form, "form", ctx.count);
                        form.clone_from(f);
                    }
                    Hint::Text(s) if ctx.registry.contains(s) => {
                        warn_if_conflict(&mut has_form, "form", ctx.count);
                        form.clone_from(s);
                    }
                    Hint::Text(s) => {
                        warn_if_conflict(&mut has_activation, "activation", ctx.count);
                        config.activation.clone_from(s);
                    }
                }
            }
            config.name = format!("{form}{}", ctx.count);
        }
        LayerSpec::Mapping(map) => {
            if let Some(value) = map.get("form") {
                let f = value.as_str().ok_or_else(|| {
                    NetworkError::InvalidSpec(format!("`form`必须是字符串，实际为`{value}`"))
                })?;
                form = f.to_lowercase();
                config.name = format!("{form}{}", ctx.count);
            }
            for (key, value) in map {
                apply_override(&mut config, key, value)?;
            }
        }
    }

    if form.eq_ignore_ascii_case("bidirectional") {
        let worker = config
            .extra
            .get("worker")
            .and_then(Value::as_str)
            .unwrap_or("rnn");
        config.name = format!("bd{worker}{}", ctx.count);
    }

    Ok(Resolved::Request(LayerRequest { form, config }))
}

fn warn_if_conflict(seen: &mut bool, what: &str, count: usize) {
    if *seen {
        log::warn!("第{count}层的提示元组中出现多个{what}，以最后一个为准");
    }
    *seen = true;
}

/// 映射中的一项覆盖默认构造参数
pub(crate) fn apply_override(
    config: &mut LayerConfig,
    key: &str,
    value: &Value,
) -> Result<(), NetworkError> {
    let ill_typed = |expected: &str| {
        NetworkError::InvalidSpec(format!("`{key}`应为{expected}，实际为`{value}`"))
    };
    match key {
        "form" => {}
        "name" => config.name = value.as_str().ok_or_else(|| ill_typed("字符串"))?.to_string(),
        "size" => {
            let n = value
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| ill_typed("非负整数"))?;
            config.size = Some(n);
        }
        "activation" => {
            config.activation = value.as_str().ok_or_else(|| ill_typed("字符串"))?.to_string();
        }
        "inputs" => {
            let map = value.as_object().ok_or_else(|| ill_typed("`{名称: 尺寸}`对象"))?;
            config.inputs = map
                .iter()
                .map(|(name, size)| {
                    size.as_u64()
                        .and_then(|n| usize::try_from(n).ok())
                        .map(|n| (name.clone(), n))
                        .ok_or_else(|| ill_typed("`{名称: 尺寸}`对象"))
                })
                .collect::<Result<_, _>>()?;
        }
        _ => {
            config.extra.insert(key.to_string(), value.clone());
        }
    }
    Ok(())
}
