/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 构图缓存与函数缓存
 */

use std::rc::Rc;

use serde_json::{Map, Value};

use crate::assert_err;
use crate::nn::layer::Activation;
use crate::nn::{
    Graph, GraphOptions, Hint, Layer, LayerConfig, LayerOutput, LayerRegistry, LayerSpec,
    LossOptions, Network, NetworkError, NetworkKind, NetworkOptions, Var,
};
use crate::tensor::Tensor;

fn network() -> Network {
    let layers = [4, 3, 4].into_iter().map(LayerSpec::Size).collect();
    Network::autoencoder(NetworkOptions::new(layers).with_seed(11)).unwrap()
}

/// 测试同样的构图选项只构图一次
#[test]
fn test_build_graph_is_cached() {
    let net = network();
    let options = GraphOptions::default();
    let first = net.build_graph(&options).unwrap();
    let nodes = net.graph().nodes_count();
    let second = net.build_graph(&options).unwrap();

    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(net.graph().nodes_count(), nodes);
    assert_eq!(net.graph_cache_len(), 1);
    assert_eq!(first.outputs.len(), 3);
}

/// 测试不同的构图选项各占一个缓存项
#[test]
fn test_distinct_options_distinct_entries() {
    let net = network();
    let noisy = GraphOptions {
        input_noise: 0.1,
        ..GraphOptions::default()
    };
    let noisier = GraphOptions {
        input_noise: 0.2,
        ..GraphOptions::default()
    };
    let a = net.build_graph(&noisy).unwrap();
    let b = net.build_graph(&noisier).unwrap();
    assert!(!Rc::ptr_eq(&a, &b));
    assert_eq!(net.graph_cache_len(), 2);
    net.build_graph(&noisy).unwrap();
    assert_eq!(net.graph_cache_len(), 2);
}

/// 测试前向函数按构图选项缓存
#[test]
fn test_feed_forward_function_cache() {
    let net = network();
    let x = Tensor::new(&[0.1, 0.2, 0.3, 0.4], &[1, 4]);
    let clean = GraphOptions::default();
    let noisy = GraphOptions {
        input_noise: 0.5,
        ..GraphOptions::default()
    };

    let first = net.feed_forward(&x, &clean).unwrap();
    let again = net.feed_forward(&x, &clean).unwrap();
    assert_eq!(first, again);
    assert_eq!(net.function_cache_len(), 1);
    assert_eq!(first.len(), 3);
    assert_eq!(first[0], x);
    assert_eq!(first[1].shape(), &[1, 3]);
    assert_eq!(first[2].shape(), &[1, 4]);

    let perturbed = net.feed_forward(&x, &noisy).unwrap();
    assert_ne!(perturbed[0], x);
    assert_eq!(net.function_cache_len(), 2);
    assert_eq!(net.graph_cache_len(), 2);

    assert_eq!(net.predict(&x).unwrap(), first[2]);
}

// ==================== 层产生的监控项与更新规则 ====================

/// 原样传出输入，并在每次前向时把自身的计数参数加1
#[derive(Debug)]
struct Counter {
    name: String,
    size: usize,
    inputs: Vec<(String, usize)>,
    activation: Activation,
    extra: Map<String, Value>,
    count: Var,
    /// 为真时监控输出本身（非标量），否则监控计数
    watch_output: bool,
}

impl Counter {
    fn build(
        graph: &Graph,
        config: LayerConfig,
        watch_output: bool,
    ) -> Result<Rc<dyn Layer>, NetworkError> {
        let size = config.require_size()?;
        let count = graph.parameter(&format!("{}.count", config.name), &Tensor::zeros(&[1, 1]))?;
        Ok(Rc::new(Self {
            name: config.name,
            size,
            inputs: config.inputs,
            activation: Activation::linear(),
            extra: config.extra,
            count,
            watch_output,
        }))
    }
}

impl Layer for Counter {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> usize {
        self.size
    }

    fn form(&self) -> &str {
        if self.watch_output { "watcher" } else { "counter" }
    }

    fn inputs(&self) -> &[(String, usize)] {
        &self.inputs
    }

    fn activation(&self) -> &Activation {
        &self.activation
    }

    fn params(&self) -> Vec<Var> {
        vec![self.count.clone()]
    }

    fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    fn output(
        &self,
        inputs: &[Var],
        _noise: f32,
        _dropout: f32,
    ) -> Result<LayerOutput, NetworkError> {
        let [x] = inputs else {
            return Err(NetworkError::InvalidSpec(format!("`{}`只接受1个输入", self.name)));
        };
        let monitor = if self.watch_output {
            (self.output_name(), x.clone())
        } else {
            (format!("{}.count", self.name), self.count.clone())
        };
        let next = &self.count + &self.count.get_graph().scalar(1.0);
        Ok(LayerOutput {
            output: x.clone(),
            monitors: vec![monitor],
            updates: vec![(self.count.clone(), next)],
        })
    }
}

fn counting_network(form: &str) -> Network {
    let mut registry = LayerRegistry::default();
    registry.register("counter", |graph, config| Counter::build(graph, config, false));
    registry.register("watcher", |graph, config| Counter::build(graph, config, true));
    let hidden = || LayerSpec::hints([Hint::from(form), Hint::Size(2)]);
    let layers = vec![LayerSpec::Size(2), hidden(), hidden(), LayerSpec::Size(2)];
    let options = NetworkOptions::new(layers).with_seed(5);
    Network::with_registry(NetworkKind::Autoencoder, options, registry).unwrap()
}

fn monitor_names(monitors: &[(String, Var)]) -> Vec<&str> {
    monitors.iter().map(|(name, _)| name.as_str()).collect()
}

/// 测试各层的监控项与更新规则按层顺序汇总，且每次前向都执行更新
#[test]
fn test_layer_monitors_and_updates() {
    let net = counting_network("counter");
    let layer_names: Vec<&str> = net.layers().iter().map(|l| l.name()).collect();
    assert_eq!(layer_names, ["in", "counter1", "counter2", "out"]);

    let built = net.build_graph(&GraphOptions::default()).unwrap();
    assert_eq!(monitor_names(&built.monitors), ["counter1.count", "counter2.count"]);
    assert_eq!(built.updates.len(), 2);

    let x = Tensor::new(&[0.1, 0.2], &[1, 2]);
    for _ in 0..2 {
        net.feed_forward(&x, &GraphOptions::default()).unwrap();
    }
    assert_eq!(net.function_cache_len(), 1);
    for layer in ["counter1", "counter2"] {
        let count = net.find(layer, "count").unwrap();
        assert_eq!(count.value().unwrap(), Tensor::new(&[2.0], &[1, 1]));
    }

    // 构图产生的监控项排在`err`之后
    let loss = net.loss(&LossOptions::default()).unwrap();
    assert_eq!(
        monitor_names(&loss.monitors),
        ["err", "counter1.count", "counter2.count"]
    );
    assert_eq!(loss.updates.len(), 2);

    // 求值时同样执行更新，返回的是更新前的计数
    let values = net.evaluate(&[&x], &LossOptions::default()).unwrap();
    let names: Vec<&str> = values.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["loss", "err", "counter1.count", "counter2.count"]);
    assert_eq!(values[2].1, 2.0);
    let count = net.find("counter2", 0usize).unwrap();
    assert_eq!(count.value().unwrap(), Tensor::new(&[3.0], &[1, 1]));
}

/// 测试非标量的监控项在求值时报错
#[test]
fn test_non_scalar_monitor() {
    let net = counting_network("watcher");
    let x = Tensor::new(&[0.1, 0.2], &[1, 2]);
    assert_err!(
        net.evaluate(&[&x], &LossOptions::default()),
        NetworkError::NonScalarMonitor("watcher1.out")
    );
}

// ==================== 非有限值选项 ====================

/// 测试NaN与无穷大的选项被拒绝，且不占用缓存
#[test]
fn test_non_finite_options_rejected() {
    let net = network();
    let x = Tensor::new(&[0.1, 0.2, 0.3, 0.4], &[1, 4]);
    let nan = GraphOptions {
        input_noise: f32::NAN,
        ..GraphOptions::default()
    };
    let infinite = GraphOptions {
        input_noise: f32::INFINITY,
        ..GraphOptions::default()
    };
    assert_err!(
        net.build_graph(&nan),
        NetworkError::InvalidOption { name: "input_noise", .. }
    );
    assert_err!(
        net.feed_forward(&x, &infinite),
        NetworkError::InvalidOption { name: "input_noise", .. }
    );
    let dropouts = GraphOptions {
        hidden_dropouts: f32::NEG_INFINITY,
        ..GraphOptions::default()
    };
    assert_err!(
        net.build_graph(&dropouts),
        NetworkError::InvalidOption { name: "hidden_dropouts", .. }
    );

    let loss = LossOptions {
        weight_l2: f32::NAN,
        ..LossOptions::default()
    };
    assert_err!(
        net.evaluate(&[&x], &loss),
        NetworkError::InvalidOption { name: "weight_l2", .. }
    );
    assert_err!(
        net.loss(&LossOptions::from(infinite)),
        NetworkError::InvalidOption { name: "input_noise", .. }
    );

    assert_eq!(net.graph_cache_len(), 0);
    assert_eq!(net.function_cache_len(), 0);
}
