/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 正则项：按固定顺序逐项构建，权重 > 0 才计入损失
 */

use super::LossOptions;
use crate::nn::{GraphError, Var, VarActivationOps, VarReduceOps};
use crate::tensor::Axis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regularizer {
    WeightL1,
    WeightL2,
    HiddenL1,
    HiddenL2,
    Contractive,
}

impl Regularizer {
    /// 计入损失的顺序
    pub const ALL: [Self; 5] = [
        Self::WeightL1,
        Self::WeightL2,
        Self::HiddenL1,
        Self::HiddenL2,
        Self::Contractive,
    ];

    pub const fn option_name(self) -> &'static str {
        match self {
            Self::WeightL1 => "weight_l1",
            Self::WeightL2 => "weight_l2",
            Self::HiddenL1 => "hidden_l1",
            Self::HiddenL2 => "hidden_l2",
            Self::Contractive => "contractive",
        }
    }

    pub const fn weight(self, options: &LossOptions) -> f32 {
        match self {
            Self::WeightL1 => options.weight_l1,
            Self::WeightL2 => options.weight_l2,
            Self::HiddenL1 => options.hidden_l1,
            Self::HiddenL2 => options.hidden_l2,
            Self::Contractive => options.contractive,
        }
    }

    /// 未乘权重的正则项；没有可求和的对象时返回`None`
    pub fn term(self, params: &[Var], hiddens: &[Var], x: &Var) -> Result<Option<Var>, GraphError> {
        let parts: Vec<Var> = match self {
            Self::WeightL1 => params.iter().map(|w| w.abs().sum()).collect(),
            Self::WeightL2 => params.iter().map(|w| w.sqr().sum()).collect(),
            Self::HiddenL1 => hiddens
                .iter()
                .map(|h| h.abs().mean_axis(Axis::Rows).sum())
                .collect(),
            Self::HiddenL2 => hiddens
                .iter()
                .map(|h| h.sqr().mean_axis(Axis::Rows).sum())
                .collect(),
            Self::Contractive => {
                let graph = x.get_graph();
                let mut parts = Vec::with_capacity(hiddens.len());
                for h in hiddens {
                    let activity = h.mean_axis(Axis::Rows).sum();
                    let jacobian = graph.grad(&activity, std::slice::from_ref(x))?;
                    parts.extend(jacobian.iter().map(|j| j.sqr().sum()));
                }
                parts
            }
        };
        Ok(parts.into_iter().reduce(|acc, p| &acc + &p))
    }
}
