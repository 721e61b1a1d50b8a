/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 计算图与编译函数的缓存
 *
 * 键为SHA-256摘要（十六进制），输入依次是：
 * 1. 选项的规范JSON（字段顺序固定）
 * 2. 每个层的`(类型, 名称, 尺寸)`
 * 同一个键对应的值一旦写入就不再改变。
 */

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::nn::layer::Layer;
use crate::nn::{NetworkError, Var};

/// 一次构图的结果
#[derive(Debug, Clone)]
pub struct GraphOutputs {
    /// 各层输出（按层顺序，最后一个是网络输出）
    pub outputs: Vec<Var>,
    pub monitors: Vec<(String, Var)>,
    pub updates: Vec<(Var, Var)>,
}

/// 由选项与当前层列表计算缓存键
pub(crate) fn graph_key<O: Serialize>(
    options: &O,
    layers: &[Rc<dyn Layer>],
) -> Result<String, NetworkError> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_string(options)?.as_bytes());
    for layer in layers {
        hasher.update(format!("\n{}\t{}\t{}", layer.form(), layer.name(), layer.size()).as_bytes());
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// 只增不改的缓存
pub(crate) struct Cache<T> {
    entries: RefCell<HashMap<String, Rc<T>>>,
}

impl<T> Default for Cache<T> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }
}

impl<T> Cache<T> {
    /// 命中则返回已有的值；否则调用`build`构造、存入并返回
    pub(crate) fn get_or_try_insert_with<E>(
        &self,
        key: &str,
        build: impl FnOnce() -> Result<T, E>,
    ) -> Result<Rc<T>, E> {
        if let Some(hit) = self.entries.borrow().get(key) {
            return Ok(Rc::clone(hit));
        }
        // `build`可能访问其他缓存，期间不持有借用
        let value = Rc::new(build()?);
        let mut entries = self.entries.borrow_mut();
        let entry = entries.entry(key.to_string()).or_insert(value);
        Ok(Rc::clone(entry))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}
