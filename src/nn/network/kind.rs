/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 网络类型：决定额外的输入变量、误差函数与额外监控项
 */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::nn::NetworkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NetworkKind {
    /// 重构输入：目标就是输入`x`
    #[default]
    Autoencoder,
    /// 额外输入`targets`，误差为均方误差
    Regressor,
    /// 额外输入one-hot的`targets`，误差为交叉熵，并监控正确率`acc`
    Classifier,
}

impl NetworkKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Autoencoder => "Autoencoder",
            Self::Regressor => "Regressor",
            Self::Classifier => "Classifier",
        }
    }

    pub const fn has_targets(self) -> bool {
        !matches!(self, Self::Autoencoder)
    }

    pub const fn default_output_activation(self) -> &'static str {
        match self {
            Self::Classifier => "softmax",
            Self::Autoencoder | Self::Regressor => "linear",
        }
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkKind {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Autoencoder" => Ok(Self::Autoencoder),
            "Regressor" => Ok(Self::Regressor),
            "Classifier" => Ok(Self::Classifier),
            other => Err(NetworkError::UnknownKind(other.to_string())),
        }
    }
}
