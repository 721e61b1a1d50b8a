/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 输入层、全连接层与激活函数
 */

use approx::assert_abs_diff_eq;
use serde_json::{Map, Value, json};

use crate::assert_err;
use crate::nn::layer::{Activation, Feedforward, Input};
use crate::nn::{Graph, Layer, LayerConfig, NetworkError, ParamRef};
use crate::tensor::Tensor;

fn config(name: &str, size: Option<usize>, inputs: &[(&str, usize)]) -> LayerConfig {
    LayerConfig {
        name: name.to_string(),
        size,
        activation: "logistic".to_string(),
        inputs: inputs.iter().map(|(n, s)| ((*n).to_string(), *s)).collect(),
        extra: Map::new(),
    }
}

// ==================== 激活函数 ====================

/// 测试激活函数名不区分大小写、可用`+`串联
#[test]
fn test_activation_parse() {
    assert_eq!(Activation::parse("ReLU").unwrap().name(), "ReLU");
    assert!(Activation::parse("sigmoid").is_ok());
    assert!(Activation::parse("tanh+relu").is_ok());
    assert!(Activation::parse("").is_ok());
    assert_err!(Activation::parse("swish"), NetworkError::UnknownActivation(_));
    assert_err!(Activation::parse("tanh+swish"), NetworkError::UnknownActivation(_));
}

/// 测试串联激活按从左到右的顺序作用
#[test]
fn test_activation_chain_order() {
    let graph = Graph::new_with_seed(42);
    let x = graph.constant(&Tensor::new(&[-2., 0., 3.], &[1, 3]));
    let relu_then_abs = Activation::parse("relu+abs").unwrap().apply(&x);
    let abs_then_relu = Activation::parse("abs+relu").unwrap().apply(&x);
    let out = graph.evaluate(&[relu_then_abs, abs_then_relu], &[]).unwrap();
    assert_eq!(out[0], Tensor::new(&[0., 0., 3.], &[1, 3]));
    assert_eq!(out[1], Tensor::new(&[2., 0., 3.], &[1, 3]));
}

// ==================== 输入层 ====================

/// 测试输入层原样输出且没有参数
#[test]
fn test_input_layer_passthrough() {
    let graph = Graph::new_with_seed(42);
    let layer = Input::new(config("in", Some(3), &[])).unwrap();
    assert_eq!(layer.form(), "input");
    assert_eq!(layer.output_name(), "in.out");
    assert!(layer.params().is_empty());
    assert!(layer.graph().is_none());

    let x = graph.input("x");
    let out = layer.output(std::slice::from_ref(&x), 0.0, 0.0).unwrap();
    let data = Tensor::new(&[1., 2., 3.], &[1, 3]);
    let value = graph.evaluate(&[out.output], &[(&x, &data)]).unwrap();
    assert_eq!(value[0], data);

    assert_err!(Input::new(config("in", None, &[])), NetworkError::MissingSize("in"));
}

// ==================== 全连接层 ====================

/// 测试单输入全连接层的参数命名、形状与查找
#[test]
fn test_feedforward_single_input() {
    let graph = Graph::new_with_seed(42);
    let layer = Feedforward::new(&graph, config("hid1", Some(3), &[("in.out", 2)])).unwrap();

    let names: Vec<String> = layer.params().iter().map(|p| p.name()).collect();
    assert_eq!(names, ["hid1.w", "hid1.b"]);
    assert_eq!(layer.params()[0].value().unwrap().shape(), &[2, 3]);
    assert_eq!(layer.params()[1].value().unwrap(), Tensor::zeros(&[1, 3]));
    assert_eq!(layer.num_params(), 9);

    assert_eq!(layer.find(&ParamRef::from("w")).unwrap().name(), "hid1.w");
    assert_eq!(layer.find(&ParamRef::from("hid1.b")).unwrap().name(), "hid1.b");
    assert_eq!(layer.find(&ParamRef::from(1usize)).unwrap().name(), "hid1.b");
    assert_err!(
        layer.find(&ParamRef::from("v")),
        NetworkError::ParamNotFound { layer, param } if layer == "hid1" && param == "v"
    );
    assert_err!(layer.find(&ParamRef::from(2usize)), NetworkError::ParamNotFound { .. });
}

/// 测试多输入全连接层：每个输入一个权重，共享偏置
#[test]
fn test_feedforward_multiple_inputs() {
    let graph = Graph::new_with_seed(42);
    let layer = Feedforward::new(
        &graph,
        config("out", Some(2), &[("hid1.out", 3), ("hid2.out", 4)]),
    )
    .unwrap();

    let names: Vec<String> = layer.params().iter().map(|p| p.name()).collect();
    assert_eq!(names, ["out.w_hid1", "out.w_hid2", "out.b"]);
    assert_eq!(layer.num_params(), 3 * 2 + 4 * 2 + 2);

    let a = graph.constant(&Tensor::ones(&[5, 3]));
    let b = graph.constant(&Tensor::ones(&[5, 4]));
    let out = layer.output(&[a.clone(), b], 0.0, 0.0).unwrap();
    let value = graph.evaluate(&[out.output], &[]).unwrap();
    assert_eq!(value[0].shape(), &[5, 2]);

    assert_err!(layer.output(&[a], 0.0, 0.0), NetworkError::InvalidSpec(_));
}

/// 测试线性全连接层的输出为`x @ W + b`
#[test]
fn test_feedforward_linear_output() {
    let graph = Graph::new_with_seed(42);
    let mut cfg = config("hid1", Some(2), &[("in.out", 2)]);
    cfg.activation = "linear".to_string();
    let layer = Feedforward::new(&graph, cfg).unwrap();
    layer.params()[0]
        .set_value(&Tensor::new(&[1., 2., 3., 4.], &[2, 2]))
        .unwrap();
    layer.params()[1].set_value(&Tensor::new(&[0.5, -0.5], &[1, 2])).unwrap();

    let x = graph.constant(&Tensor::new(&[1., 1.], &[1, 2]));
    let out = layer.output(&[x], 0.0, 0.0).unwrap();
    let value = graph.evaluate(&[out.output], &[]).unwrap();
    assert_abs_diff_eq!(value[0], Tensor::new(&[4.5, 5.5], &[1, 2]), epsilon = 1e-6);
}

/// 测试构造参数校验与`std`覆盖
#[test]
fn test_feedforward_config_checks() {
    let graph = Graph::new_with_seed(42);
    assert_err!(
        Feedforward::new(&graph, config("hid1", None, &[("in.out", 2)])),
        NetworkError::MissingSize("hid1")
    );
    assert_err!(
        Feedforward::new(&graph, config("hid2", Some(0), &[("in.out", 2)])),
        NetworkError::InvalidSpec(_)
    );
    assert_err!(
        Feedforward::new(&graph, config("hid3", Some(2), &[])),
        NetworkError::InvalidSpec(_)
    );
    let mut bad = config("hid4", Some(2), &[("in.out", 2)]);
    bad.activation = "swish".to_string();
    assert_err!(Feedforward::new(&graph, bad), NetworkError::UnknownActivation(_));

    let mut zero_std = config("hid5", Some(2), &[("in.out", 2)]);
    zero_std.extra.insert("std".to_string(), json!(0.0));
    let layer = Feedforward::new(&graph, zero_std).unwrap();
    assert_eq!(layer.params()[0].value().unwrap(), Tensor::zeros(&[2, 2]));
}

/// 测试层描述能原样写回（含额外参数）
#[test]
fn test_feedforward_to_spec() {
    let graph = Graph::new_with_seed(42);
    let mut cfg = config("out", Some(2), &[("hid1.out", 3), ("hid2.out", 4)]);
    cfg.extra.insert("dim".to_string(), json!(7));
    let layer = Feedforward::new(&graph, cfg).unwrap();

    let spec = Value::Object(layer.to_spec());
    assert_eq!(
        spec,
        json!({
            "form": "feedforward",
            "name": "out",
            "size": 2,
            "activation": "logistic",
            "inputs": {"hid1.out": 3, "hid2.out": 4},
            "dim": 7,
        })
    );
    let keys: Vec<&String> = spec["inputs"].as_object().unwrap().keys().collect();
    assert_eq!(keys, ["hid1.out", "hid2.out"]);
}
