/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 拓扑构建：按层描述依次构造输入层、隐层与输出层
 */

use std::rc::Rc;

use serde_json::Map;

use super::spec::{DEFAULT_FORM, NormalizeContext, Resolved, normalize};
use super::{LayerSpec, NetworkOptions};
use crate::nn::layer::{Layer, LayerConfig, LayerRegistry};
use crate::nn::{Graph, NetworkError};

/// 输入层与输出层的固定名称
pub(crate) const INPUT_NAME: &str = "in";
pub(crate) const OUTPUT_NAME: &str = "out";

/// 构造网络的全部层。未给出`layers`时返回空列表。
///
/// - 首个描述为输入层（`input`类型，名为`in`）
/// - 中间的描述逐个规范化，默认接在前一层之后
/// - 最后追加输出层（`feedforward`类型，名为`out`），
///   其尺寸取自最后一个描述，输入为最后`decode_from`层的输出
pub(crate) fn build_layers(
    graph: &Graph,
    registry: &LayerRegistry,
    options: &NetworkOptions,
    output_activation: &str,
) -> Result<Vec<Rc<dyn Layer>>, NetworkError> {
    let Some(specs) = options.layers.as_deref() else {
        return Ok(vec![]);
    };
    let [first, encoders @ .., last] = specs else {
        return Err(NetworkError::InvalidSpec(format!(
            "`layers`至少需要输入层和输出层两项，实际为{}项",
            specs.len()
        )));
    };

    let mut layers: Vec<Rc<dyn Layer>> = Vec::with_capacity(specs.len());
    layers.push(build_input(graph, registry, first)?);

    for spec in encoders {
        let previous = layers.last().map(Rc::clone).ok_or_else(|| {
            NetworkError::InvalidSpec("隐层之前必须已有输入层".to_string())
        })?;
        let ctx = NormalizeContext {
            previous: previous.as_ref(),
            count: layers.len(),
            hidden_activation: options.hidden_activation(),
            registry,
        };
        let layer = match normalize(spec, &ctx)? {
            Resolved::Prebuilt(layer) => {
                check_graph(graph, layer.as_ref())?;
                layer
            }
            Resolved::Request(request) => {
                registry.build(graph, &request.form, request.config)?
            }
        };
        log::debug!(
            "构建第{}层：{}（{}，尺寸{}）",
            layers.len(),
            layer.name(),
            layer.form(),
            layer.size()
        );
        layers.push(layer);
    }

    let decoder = build_decoder(graph, registry, &layers, last, options, output_activation)?;
    layers.push(decoder);
    Ok(layers)
}

fn build_input(
    graph: &Graph,
    registry: &LayerRegistry,
    spec: &LayerSpec,
) -> Result<Rc<dyn Layer>, NetworkError> {
    if let LayerSpec::Prebuilt(layer) = spec {
        check_graph(graph, layer.as_ref())?;
        return Ok(Rc::clone(layer));
    }
    let size = spec
        .size()
        .ok_or_else(|| NetworkError::MissingSize(INPUT_NAME.to_string()))?;
    let config = LayerConfig {
        name: INPUT_NAME.to_string(),
        size: Some(size),
        activation: "linear".to_string(),
        inputs: vec![],
        extra: Map::new(),
    };
    registry.build(graph, "input", config)
}

fn build_decoder(
    graph: &Graph,
    registry: &LayerRegistry,
    layers: &[Rc<dyn Layer>],
    last: &LayerSpec,
    options: &NetworkOptions,
    output_activation: &str,
) -> Result<Rc<dyn Layer>, NetworkError> {
    let size = last
        .size()
        .ok_or_else(|| NetworkError::MissingSize(OUTPUT_NAME.to_string()))?;
    let back = options.decode_from().max(1);
    let sources = &layers[layers.len().saturating_sub(back)..];
    let config = LayerConfig {
        name: OUTPUT_NAME.to_string(),
        size: Some(size),
        activation: output_activation.to_string(),
        inputs: sources
            .iter()
            .map(|l| (l.output_name(), l.size()))
            .collect(),
        extra: Map::new(),
    };
    registry.build(graph, DEFAULT_FORM, config)
}

/// 已构造的层必须和网络共用同一张图
fn check_graph(graph: &Graph, layer: &dyn Layer) -> Result<(), NetworkError> {
    match layer.graph() {
        Some(own) if !own.same(graph) => Err(NetworkError::InvalidSpec(format!(
            "层`{}`的参数不在本网络的计算图上",
            layer.name()
        ))),
        _ => Ok(()),
    }
}
