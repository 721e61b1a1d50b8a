/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 层类型注册表
 */

use std::rc::Rc;

use serde_json::Map;

use crate::assert_err;
use crate::nn::layer::Feedforward;
use crate::nn::{Graph, Layer, LayerConfig, LayerRegistry, NetworkError};

fn hidden(name: &str) -> LayerConfig {
    LayerConfig {
        name: name.to_string(),
        size: Some(3),
        activation: "tanh".to_string(),
        inputs: vec![("in.out".to_string(), 2)],
        extra: Map::new(),
    }
}

/// 测试默认注册的层类型，且名称不区分大小写
#[test]
fn test_default_forms() {
    let registry = LayerRegistry::default();
    assert_eq!(registry.forms(), ["feedforward", "ff", "input"]);
    assert!(registry.contains("FeedForward"));
    assert!(registry.contains("FF"));
    assert!(!registry.contains("bidirectional"));

    let graph = Graph::new_with_seed(42);
    let layer = registry.build(&graph, "FEEDFORWARD", hidden("hid1")).unwrap();
    assert_eq!(layer.form(), "feedforward");
    assert_eq!(layer.size(), 3);
}

/// 测试未注册的层类型
#[test]
fn test_unknown_form() {
    let registry = LayerRegistry::default();
    let graph = Graph::new_with_seed(42);
    assert_err!(
        registry.build(&graph, "bidirectional", hidden("bd1")),
        NetworkError::UnknownForm("bidirectional")
    );
}

/// 测试注册自定义层类型
#[test]
fn test_register_custom_form() {
    let mut registry = LayerRegistry::new();
    registry.register("Dense", |graph, config| {
        Ok(Rc::new(Feedforward::new(graph, config)?) as Rc<dyn Layer>)
    });
    assert!(registry.contains("dense"));

    let graph = Graph::new_with_seed(42);
    let layer = registry.build(&graph, "dense", hidden("dense1")).unwrap();
    assert_eq!(layer.name(), "dense1");
    assert!(layer.graph().unwrap().same(&graph));
}
