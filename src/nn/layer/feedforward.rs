/*
 * @Author       : 老董
 * @Date         : 2026-01-17
 * @Description  : Feedforward (全连接) 层，可同时接收多个上游输出
 */

use serde_json::{Map, Value};

use super::{Activation, Layer, LayerConfig, LayerOutput};
use crate::nn::{Graph, Init, NetworkError, Var, VarMatrixOps, VarRandomOps};

/// 全连接层：`output = act(Σ_i x_i @ W_i + b)`
///
/// # 输入/输出形状
/// - 第`i`个输入：[batch_size, `inputs[i].1`]
/// - 输出：[batch_size, size]
///
/// # 参数命名
/// - 单输入：`{name}.w`、`{name}.b`
/// - 多输入：每个输入一个权重`{name}.w_{上游层名}`，共享一个偏置`{name}.b`
#[derive(Debug)]
pub struct Feedforward {
    name: String,
    size: usize,
    inputs: Vec<(String, usize)>,
    activation: Activation,
    weights: Vec<Var>,
    bias: Var,
    extra: Map<String, Value>,
}

impl Feedforward {
    pub fn new(graph: &Graph, config: LayerConfig) -> Result<Self, NetworkError> {
        let size = config.require_size()?;
        if config.inputs.is_empty() {
            return Err(NetworkError::InvalidSpec(format!(
                "全连接层`{}`至少需要一个输入",
                config.name
            )));
        }
        let activation = Activation::parse(&config.activation)?;

        // 权重初始化的标准差可通过`std`覆盖
        let fan_in: usize = config.inputs.iter().map(|(_, n)| n).sum();
        let std = match config.extra.get("std") {
            None => 1.0 / ((fan_in + size) as f32).sqrt(),
            Some(v) => v.as_f64().ok_or_else(|| {
                NetworkError::InvalidSpec(format!("层`{}`的std必须是数值", config.name))
            })? as f32,
        };

        let single = config.inputs.len() == 1;
        let mut weights = Vec::with_capacity(config.inputs.len());
        for (input, nin) in &config.inputs {
            let param_name = if single {
                format!("{}.w", config.name)
            } else {
                let source = input.strip_suffix(".out").unwrap_or(input);
                format!("{}.w_{source}", config.name)
            };
            weights.push(graph.parameter_with_init(
                &param_name,
                &[*nin, size],
                &Init::Normal { mean: 0.0, std },
            )?);
        }
        let bias = graph.parameter_with_init(&format!("{}.b", config.name), &[1, size], &Init::Zeros)?;

        Ok(Self {
            name: config.name,
            size,
            inputs: config.inputs,
            activation,
            weights,
            bias,
            extra: config.extra,
        })
    }
}

impl Layer for Feedforward {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> usize {
        self.size
    }

    fn form(&self) -> &str {
        "feedforward"
    }

    fn inputs(&self) -> &[(String, usize)] {
        &self.inputs
    }

    fn activation(&self) -> &Activation {
        &self.activation
    }

    fn params(&self) -> Vec<Var> {
        let mut params = self.weights.clone();
        params.push(self.bias.clone());
        params
    }

    fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    fn output(
        &self,
        inputs: &[Var],
        noise: f32,
        dropout: f32,
    ) -> Result<LayerOutput, NetworkError> {
        if inputs.len() != self.weights.len() {
            return Err(NetworkError::InvalidSpec(format!(
                "层`{}`需要{}个输入，实际为{}个",
                self.name,
                self.weights.len(),
                inputs.len()
            )));
        }
        let pre = inputs
            .iter()
            .zip(&self.weights)
            .fold(self.bias.clone(), |acc, (x, w)| &acc + &x.matmul(w));
        let output = self.activation.apply(&pre).add_noise(noise).dropout(dropout);
        Ok(LayerOutput::new(output))
    }
}
