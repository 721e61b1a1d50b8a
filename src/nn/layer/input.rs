/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 输入层：把原始输入原样传出（可叠加输入噪声和dropout）
 */

use serde_json::{Map, Value};

use super::{Activation, Layer, LayerConfig, LayerOutput};
use crate::nn::{NetworkError, Var, VarRandomOps};

#[derive(Debug)]
pub struct Input {
    name: String,
    size: usize,
    activation: Activation,
    extra: Map<String, Value>,
}

impl Input {
    pub fn new(config: LayerConfig) -> Result<Self, NetworkError> {
        let size = config.require_size()?;
        Ok(Self {
            name: config.name,
            size,
            activation: Activation::linear(),
            extra: config.extra,
        })
    }
}

impl Layer for Input {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> usize {
        self.size
    }

    fn form(&self) -> &str {
        "input"
    }

    fn inputs(&self) -> &[(String, usize)] {
        &[]
    }

    fn activation(&self) -> &Activation {
        &self.activation
    }

    fn params(&self) -> Vec<Var> {
        vec![]
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
        let [x] = inputs else {
            return Err(NetworkError::InvalidSpec(format!(
                "输入层`{}`只接受1个输入，实际为{}个",
                self.name,
                inputs.len()
            )));
        };
        Ok(LayerOutput::new(x.add_noise(noise).dropout(dropout)))
    }
}
