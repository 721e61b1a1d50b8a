/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : Network - 前馈网络的用户级入口
 *
 * 持有输入变量、层列表与两级缓存：
 * - 构图缓存：构图选项 + 层列表 -> 各层输出、监控项与更新规则
 * - 函数缓存：同一个键 -> 编译好的前向函数
 */

use std::rc::Rc;

use super::builder::build_layers;
use super::cache::{Cache, GraphOutputs, graph_key};
use super::regularizer::Regularizer;
use super::{GraphOptions, LossOptions, NetworkKind, NetworkOptions};
use crate::nn::layer::{Layer, LayerRef, LayerRegistry, ParamRef};
use crate::nn::{Function, Graph, NetworkError, Var, VarLossOps};
use crate::tensor::Tensor;

/// `loss`的结果：标量损失、监控项（首项为`err`）与更新规则
#[derive(Debug, Clone)]
pub struct Loss {
    pub loss: Var,
    pub monitors: Vec<(String, Var)>,
    pub updates: Vec<(Var, Var)>,
}

/// 编译好的“损失 + 监控项”求值函数
struct Evaluator {
    function: Function,
    names: Vec<String>,
}

pub struct Network {
    kind: NetworkKind,
    options: NetworkOptions,
    graph: Graph,
    registry: LayerRegistry,
    x: Var,
    targets: Option<Var>,
    weights: Option<Var>,
    layers: Vec<Rc<dyn Layer>>,
    graphs: Cache<GraphOutputs>,
    functions: Cache<Function>,
    evaluators: Cache<Evaluator>,
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("kind", &self.kind)
            .field(
                "layers",
                &self
                    .layers
                    .iter()
                    .map(|l| format!("{}({})", l.name(), l.size()))
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl Network {
    // ==================== 创建 ====================

    pub fn new(kind: NetworkKind, options: NetworkOptions) -> Result<Self, NetworkError> {
        Self::with_registry(kind, options, LayerRegistry::default())
    }

    pub fn autoencoder(options: NetworkOptions) -> Result<Self, NetworkError> {
        Self::new(NetworkKind::Autoencoder, options)
    }

    pub fn regressor(options: NetworkOptions) -> Result<Self, NetworkError> {
        Self::new(NetworkKind::Regressor, options)
    }

    pub fn classifier(options: NetworkOptions) -> Result<Self, NetworkError> {
        Self::new(NetworkKind::Classifier, options)
    }

    /// 使用自定义层注册表创建网络
    pub fn with_registry(
        kind: NetworkKind,
        options: NetworkOptions,
        registry: LayerRegistry,
    ) -> Result<Self, NetworkError> {
        let graph = options.seed.map_or_else(Graph::new, Graph::new_with_seed);
        Self::with_graph(kind, options, registry, graph)
    }

    /// 在已有的图上创建网络（`layers`中含已构造的层时，它们必须建在这张图上）
    pub fn with_graph(
        kind: NetworkKind,
        options: NetworkOptions,
        registry: LayerRegistry,
        graph: Graph,
    ) -> Result<Self, NetworkError> {
        let x = graph.input("x");
        let targets = kind.has_targets().then(|| graph.input("targets"));
        let weights = options.is_weighted().then(|| graph.input("weights"));

        let output_activation = options
            .output_activation
            .clone()
            .unwrap_or_else(|| kind.default_output_activation().to_string());
        let layers = build_layers(&graph, &registry, &options, &output_activation)?;
        log::debug!("{kind}：共构建{}层", layers.len());

        Ok(Self {
            kind,
            options,
            graph,
            registry,
            x,
            targets,
            weights,
            layers,
            graphs: Cache::default(),
            functions: Cache::default(),
            evaluators: Cache::default(),
        })
    }

    // ==================== 属性 ====================

    pub const fn kind(&self) -> NetworkKind {
        self.kind
    }

    /// 构造时的原始选项（重建网络的依据）
    pub const fn options(&self) -> &NetworkOptions {
        &self.options
    }

    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    pub const fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    pub fn layers(&self) -> &[Rc<dyn Layer>] {
        &self.layers
    }

    pub const fn x(&self) -> &Var {
        &self.x
    }

    pub const fn is_weighted(&self) -> bool {
        self.weights.is_some()
    }

    /// 网络的全部输入变量：`x`，然后是`targets`（若有），最后是`weights`（若有）
    pub fn inputs(&self) -> Vec<Var> {
        std::iter::once(&self.x)
            .chain(&self.targets)
            .chain(&self.weights)
            .cloned()
            .collect()
    }

    /// 误差的目标：自编码器为`x`本身
    fn target(&self) -> &Var {
        self.targets.as_ref().unwrap_or(&self.x)
    }

    // ==================== 参数 ====================

    /// 所有层的参数（按层顺序拼接）
    pub fn params(&self) -> Vec<Var> {
        self.layers.iter().flat_map(|l| l.params()).collect()
    }

    /// 所有层的参数标量总数
    pub fn num_params(&self) -> usize {
        self.layers.iter().map(|l| l.num_params()).sum()
    }

    /// 按层（位置或名称）与参数（位置或名称）查找参数
    pub fn find(
        &self,
        layer: impl Into<LayerRef>,
        param: impl Into<ParamRef>,
    ) -> Result<Var, NetworkError> {
        let layer = layer.into();
        let found = match &layer {
            LayerRef::Index(i) => self.layers.get(*i),
            LayerRef::Name(name) => self.layers.iter().find(|l| l.name() == name.as_str()),
        };
        found
            .ok_or_else(|| NetworkError::LayerNotFound(layer.to_string()))?
            .find(&param.into())
    }

    // ==================== 构图与前向 ====================

    /// 按`options`把各层连成计算图（同样的选项与层列表只构建一次）
    pub fn build_graph(&self, options: &GraphOptions) -> Result<Rc<GraphOutputs>, NetworkError> {
        options.validate()?;
        let key = graph_key(options, &self.layers)?;
        self.graphs.get_or_try_insert_with(&key, || {
            log::debug!("构图缓存未命中：{key}");
            self.connect(options)
        })
    }

    fn connect(&self, options: &GraphOptions) -> Result<GraphOutputs, NetworkError> {
        let back = self.options.decode_from().max(1);
        let last = self.layers.len().saturating_sub(1);
        let mut outputs: Vec<Var> = Vec::with_capacity(self.layers.len());
        let mut monitors = vec![];
        let mut updates = vec![];

        for (i, layer) in self.layers.iter().enumerate() {
            let (inputs, noise, dropout) = if i == 0 {
                (
                    vec![self.x.clone()],
                    options.input_noise,
                    options.input_dropouts,
                )
            } else if i == last {
                (
                    outputs[outputs.len().saturating_sub(back)..].to_vec(),
                    options.hidden_noise,
                    options.hidden_dropouts,
                )
            } else {
                (
                    vec![outputs[i - 1].clone()],
                    options.hidden_noise,
                    options.hidden_dropouts,
                )
            };
            let out = layer.output(&inputs, noise, dropout)?;
            outputs.push(out.output);
            monitors.extend(out.monitors);
            updates.extend(out.updates);
        }

        Ok(GraphOutputs {
            outputs,
            monitors,
            updates,
        })
    }

    /// 计算各层在输入`x`上的输出（最后一个是网络输出），并执行构图产生的更新规则
    pub fn feed_forward(
        &self,
        x: &Tensor,
        options: &GraphOptions,
    ) -> Result<Vec<Tensor>, NetworkError> {
        options.validate()?;
        let key = graph_key(options, &self.layers)?;
        let function = self.functions.get_or_try_insert_with(&key, || {
            log::debug!("函数缓存未命中：{key}");
            let built = self.build_graph(options)?;
            let function = self.graph.function(
                std::slice::from_ref(&self.x),
                &built.outputs,
                &built.updates,
            )?;
            Ok::<_, NetworkError>(function)
        })?;
        Ok(function.call(&[x])?)
    }

    /// 网络输出
    pub fn predict(&self, x: &Tensor) -> Result<Tensor, NetworkError> {
        self.feed_forward(x, &GraphOptions::default())?
            .pop()
            .ok_or(NetworkError::EmptyNetwork)
    }

    pub fn graph_cache_len(&self) -> usize {
        self.graphs.len()
    }

    pub fn function_cache_len(&self) -> usize {
        self.functions.len()
    }

    // ==================== 误差与损失 ====================

    /// 网络输出`output`相对目标的误差
    ///
    /// - 自编码器与回归：`mean((y - t)²)`，加权时为`sum(w * (y - t)²) / sum(w)`
    /// - 分类：交叉熵
    pub fn error(&self, output: &Var) -> Var {
        let weights = self.weights.as_ref();
        match self.kind {
            NetworkKind::Classifier => output.cross_entropy(self.target(), weights),
            NetworkKind::Autoencoder | NetworkKind::Regressor => {
                output.mse(self.target(), weights)
            }
        }
    }

    /// 网络类型附带的额外监控项
    pub fn extra_monitors(&self, outputs: &[Var]) -> Vec<(String, Var)> {
        match (self.kind, outputs.last()) {
            (NetworkKind::Classifier, Some(output)) => {
                vec![("acc".to_string(), output.accuracy(self.target()))]
            }
            _ => vec![],
        }
    }

    /// 损失 = 误差 + 权重大于0的各正则项
    pub fn loss(&self, options: &LossOptions) -> Result<Loss, NetworkError> {
        options.validate()?;
        let built = self.build_graph(&options.graph)?;
        let output = built
            .outputs
            .last()
            .ok_or(NetworkError::EmptyNetwork)?;
        let err = self.error(output);

        let mut monitors = vec![("err".to_string(), err.clone())];
        monitors.extend(built.monitors.iter().cloned());
        monitors.extend(self.extra_monitors(&built.outputs));

        let hiddens = match built.outputs.as_slice() {
            [_, hiddens @ .., _] => hiddens,
            _ => &[],
        };
        let params = self.params();
        let mut loss = err;
        for regularizer in Regularizer::ALL {
            let weight = regularizer.weight(options);
            if weight <= 0.0 {
                continue;
            }
            if let Some(term) = regularizer.term(&params, hiddens, &self.x)? {
                log::debug!("计入正则项{}，权重{weight}", regularizer.option_name());
                loss = &loss + &term.scale(weight);
            }
        }

        Ok(Loss {
            loss,
            monitors,
            updates: built.updates.clone(),
        })
    }

    /// 在一批数据上求损失与各监控项的值，返回`[("loss", ..), ("err", ..), ...]`。
    ///
    /// `inputs`与`self.inputs()`一一对应。
    pub fn evaluate(
        &self,
        inputs: &[&Tensor],
        options: &LossOptions,
    ) -> Result<Vec<(String, f32)>, NetworkError> {
        options.validate()?;
        let key = graph_key(options, &self.layers)?;
        let evaluator = self.evaluators.get_or_try_insert_with(&key, || {
            let loss = self.loss(options)?;
            let (names, mut outputs): (Vec<String>, Vec<Var>) =
                loss.monitors.iter().cloned().unzip();
            outputs.insert(0, loss.loss.clone());
            let function = self.graph.function(&self.inputs(), &outputs, &loss.updates)?;
            let names = std::iter::once("loss".to_string()).chain(names).collect();
            Ok::<_, NetworkError>(Evaluator { function, names })
        })?;

        let values = evaluator.function.call(inputs)?;
        evaluator
            .names
            .iter()
            .zip(values)
            .map(|(name, value)| {
                let number = value
                    .number()
                    .ok_or_else(|| NetworkError::NonScalarMonitor(name.clone()))?;
                Ok((name.clone(), number))
            })
            .collect()
    }
}
