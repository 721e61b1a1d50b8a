/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 层类型注册表：按名称（不区分大小写）构造层
 */

use std::collections::HashMap;
use std::rc::Rc;

use super::{Feedforward, Input, Layer, LayerConfig};
use crate::nn::{Graph, NetworkError};

/// 层的构造函数
pub type LayerFactory = fn(&Graph, LayerConfig) -> Result<Rc<dyn Layer>, NetworkError>;

/// 层类型注册表
///
/// 默认已注册`input`与`feedforward`（别名`ff`），
/// 其他层类型可通过`register`加入，之后即可在层描述里按名称引用。
#[derive(Clone)]
pub struct LayerRegistry {
    factories: HashMap<String, LayerFactory>,
}

impl std::fmt::Debug for LayerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerRegistry")
            .field("forms", &self.forms())
            .finish()
    }
}

impl Default for LayerRegistry {
    fn default() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("input", |_, config| Ok(Rc::new(Input::new(config)?)));
        registry.register("feedforward", |graph, config| {
            Ok(Rc::new(Feedforward::new(graph, config)?))
        });
        registry.register("ff", |graph, config| {
            Ok(Rc::new(Feedforward::new(graph, config)?))
        });
        registry
    }
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册（或覆盖）一个层类型
    pub fn register(&mut self, form: &str, factory: LayerFactory) {
        self.factories.insert(form.to_lowercase(), factory);
    }

    pub fn contains(&self, form: &str) -> bool {
        self.factories.contains_key(&form.to_lowercase())
    }

    /// 已注册的层类型（排序后）
    pub fn forms(&self) -> Vec<&str> {
        let mut forms: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        forms.sort_unstable();
        forms
    }

    pub fn build(
        &self,
        graph: &Graph,
        form: &str,
        config: LayerConfig,
    ) -> Result<Rc<dyn Layer>, NetworkError> {
        let factory = self
            .factories
            .get(&form.to_lowercase())
            .ok_or_else(|| NetworkError::UnknownForm(form.to_string()))?;
        factory(graph, config)
    }
}
