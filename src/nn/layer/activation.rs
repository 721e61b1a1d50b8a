/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 按名称解析的激活函数
 *
 * 名称不区分大小写，可用`+`串联，例如`"tanh+relu"`表示先tanh再relu。
 */

use crate::nn::{NetworkError, Var, VarActivationOps};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Linear,
    Logistic,
    Tanh,
    Relu,
    Softplus,
    Softmax,
    Abs,
}

impl Kind {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "linear" | "" => Some(Self::Linear),
            "logistic" | "sigmoid" => Some(Self::Logistic),
            "tanh" => Some(Self::Tanh),
            "relu" => Some(Self::Relu),
            "softplus" => Some(Self::Softplus),
            "softmax" => Some(Self::Softmax),
            "abs" => Some(Self::Abs),
            _ => None,
        }
    }

    fn apply(self, x: &Var) -> Var {
        match self {
            Self::Linear => x.clone(),
            Self::Logistic => x.sigmoid(),
            Self::Tanh => x.tanh(),
            Self::Relu => x.relu(),
            Self::Softplus => x.softplus(),
            Self::Softmax => x.softmax(),
            Self::Abs => x.abs(),
        }
    }
}

/// 激活函数（保留原始名称，用于序列化回层描述）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    name: String,
    chain: Vec<Kind>,
}

impl Activation {
    pub fn parse(name: &str) -> Result<Self, NetworkError> {
        let lowered = name.trim().to_lowercase();
        let chain = lowered
            .split('+')
            .map(|part| {
                Kind::parse(part.trim())
                    .ok_or_else(|| NetworkError::UnknownActivation(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.to_string(),
            chain,
        })
    }

    pub fn linear() -> Self {
        Self {
            name: "linear".to_string(),
            chain: vec![Kind::Linear],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, x: &Var) -> Var {
        self.chain.iter().fold(x.clone(), |acc, kind| kind.apply(&acc))
    }
}
