/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 网络构造选项、构图选项与损失选项
 */

use serde::{Deserialize, Serialize};

use super::LayerSpec;
use crate::nn::NetworkError;

pub(crate) const DEFAULT_HIDDEN_ACTIVATION: &str = "logistic";

/// 网络构造选项。全部可缺省，缺省值见各访问方法；
/// 保存网络时原样写入存档，是重建网络的唯一依据。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkOptions {
    /// 层描述：首个为输入层，末个为输出层，其余为隐层
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<LayerSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_activation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_activation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted: Option<bool>,
    /// 输出层从最后几层的输出解码
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_from: Option<usize>,
    /// 噪声、dropout与参数初始化的随机种子
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl NetworkOptions {
    pub fn new(layers: Vec<LayerSpec>) -> Self {
        Self {
            layers: Some(layers),
            ..Self::default()
        }
    }

    pub fn with_hidden_activation(mut self, activation: &str) -> Self {
        self.hidden_activation = Some(activation.to_string());
        self
    }

    pub fn with_output_activation(mut self, activation: &str) -> Self {
        self.output_activation = Some(activation.to_string());
        self
    }

    pub const fn with_weighted(mut self, weighted: bool) -> Self {
        self.weighted = Some(weighted);
        self
    }

    pub const fn with_decode_from(mut self, decode_from: usize) -> Self {
        self.decode_from = Some(decode_from);
        self
    }

    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 合并选项：`overrides`中给出的项覆盖本选项的同名项
    pub fn merge(&self, overrides: &Self) -> Self {
        Self {
            layers: overrides.layers.clone().or_else(|| self.layers.clone()),
            hidden_activation: overrides
                .hidden_activation
                .clone()
                .or_else(|| self.hidden_activation.clone()),
            output_activation: overrides
                .output_activation
                .clone()
                .or_else(|| self.output_activation.clone()),
            weighted: overrides.weighted.or(self.weighted),
            decode_from: overrides.decode_from.or(self.decode_from),
            seed: overrides.seed.or(self.seed),
        }
    }

    pub fn hidden_activation(&self) -> &str {
        self.hidden_activation
            .as_deref()
            .unwrap_or(DEFAULT_HIDDEN_ACTIVATION)
    }

    pub fn is_weighted(&self) -> bool {
        self.weighted.unwrap_or(false)
    }

    pub fn decode_from(&self) -> usize {
        self.decode_from.unwrap_or(1)
    }
}

/// 构图选项：只影响`build_graph`生成的表达式，同一网络可按不同选项构出多张图
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    /// 输入上高斯噪声的标准差
    pub input_noise: f32,
    /// 隐层（及输出层）输出上高斯噪声的标准差
    pub hidden_noise: f32,
    /// 输入被置零的比例
    pub input_dropouts: f32,
    pub hidden_dropouts: f32,
}

/// 损失选项：构图选项加上各正则项的权重（权重 > 0 才生效）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LossOptions {
    #[serde(flatten)]
    pub graph: GraphOptions,
    /// 参数绝对值之和
    pub weight_l1: f32,
    /// 参数平方和
    pub weight_l2: f32,
    /// 隐层激活的（样本均值后）绝对值之和
    pub hidden_l1: f32,
    pub hidden_l2: f32,
    /// 隐层激活关于输入的雅可比矩阵的Frobenius范数平方
    pub contractive: f32,
}

/// 缓存键以JSON计算，而JSON中NaN与无穷大都写作`null`，因此数值选项必须是有限值
fn require_finite(fields: &[(&'static str, f32)]) -> Result<(), NetworkError> {
    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some(&(name, value)) => Err(NetworkError::InvalidOption { name, value }),
        None => Ok(()),
    }
}

impl GraphOptions {
    pub fn validate(&self) -> Result<(), NetworkError> {
        require_finite(&[
            ("input_noise", self.input_noise),
            ("hidden_noise", self.hidden_noise),
            ("input_dropouts", self.input_dropouts),
            ("hidden_dropouts", self.hidden_dropouts),
        ])
    }
}

impl LossOptions {
    pub fn validate(&self) -> Result<(), NetworkError> {
        self.graph.validate()?;
        require_finite(&[
            ("weight_l1", self.weight_l1),
            ("weight_l2", self.weight_l2),
            ("hidden_l1", self.hidden_l1),
            ("hidden_l2", self.hidden_l2),
            ("contractive", self.contractive),
        ])
    }
}

impl From<GraphOptions> for LossOptions {
    fn from(graph: GraphOptions) -> Self {
        Self {
            graph,
            ..Self::default()
        }
    }
}
