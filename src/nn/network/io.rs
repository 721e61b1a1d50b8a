/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 网络的保存与加载
 *
 * 存档内容（bincode）：网络类型、构造选项（JSON字符串）、每层参数值（键为`{层名}-values`）。
 * 路径以`.gz`结尾时透明地进行gzip压缩/解压。
 */

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};

use super::{Network, NetworkKind, NetworkOptions};
use crate::nn::NetworkError;
use crate::nn::layer::LayerRegistry;
use crate::tensor::Tensor;

/// 加载参数时如何处理存档中缺失的层
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// 跳过存档中没有的层（仅记录警告）
    #[default]
    Lenient,
    /// 存档中缺少某层或参数个数不符时报错
    Strict,
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedNetwork {
    klass: String,
    /// `NetworkOptions`的JSON
    options: String,
    values: Vec<(String, Vec<Tensor>)>,
}

impl SavedNetwork {
    fn values_of(&self, layer: &str) -> Option<&[Tensor]> {
        let key = values_key(layer);
        self.values
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_slice())
    }
}

fn values_key(layer: &str) -> String {
    format!("{layer}-values")
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

fn write_record(path: &Path, record: &SavedNetwork) -> Result<(), NetworkError> {
    let bytes = bincode::serialize(record)?;
    let file = File::create(path)?;
    if is_gzip(path) {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        encoder.write_all(&bytes)?;
        encoder.finish()?.flush()?;
    } else {
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes)?;
        writer.flush()?;
    }
    Ok(())
}

fn read_record(path: &Path) -> Result<SavedNetwork, NetworkError> {
    let file = File::open(path)?;
    let mut reader: Box<dyn Read> = if is_gzip(path) {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(bincode::deserialize(&bytes)?)
}

impl Network {
    /// 保存网络类型、构造选项与全部参数值
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), NetworkError> {
        let path = path.as_ref();
        let values = self
            .layers()
            .iter()
            .map(|layer| {
                let values = layer
                    .params()
                    .iter()
                    .map(|p| p.value())
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((values_key(layer.name()), values))
            })
            .collect::<Result<Vec<_>, NetworkError>>()?;
        let record = SavedNetwork {
            klass: self.kind().to_string(),
            options: serde_json::to_string(self.options())?,
            values,
        };
        write_record(path, &record)?;
        log::info!("{}：已保存模型参数", path.display());
        Ok(())
    }

    /// 从存档加载参数值（宽松模式）
    pub fn load_params(&self, path: impl AsRef<Path>) -> Result<(), NetworkError> {
        self.load_params_with(path, LoadMode::Lenient)
    }

    /// 从存档加载参数值：对当前每一层，按参数顺序把存档中同名层的值写入
    pub fn load_params_with(
        &self,
        path: impl AsRef<Path>,
        mode: LoadMode,
    ) -> Result<(), NetworkError> {
        let path = path.as_ref();
        let saved = read_record(path)?;
        for layer in self.layers() {
            let params = layer.params();
            let Some(values) = saved.values_of(layer.name()) else {
                if mode == LoadMode::Strict {
                    return Err(NetworkError::MissingParams(values_key(layer.name())));
                }
                if !params.is_empty() {
                    log::warn!("{}：存档中没有层`{}`，跳过", path.display(), layer.name());
                }
                continue;
            };
            if mode == LoadMode::Strict && values.len() != params.len() {
                return Err(NetworkError::MissingParams(format!(
                    "层`{}`有{}个参数，存档中为{}个",
                    layer.name(),
                    params.len(),
                    values.len()
                )));
            }
            for (param, value) in params.iter().zip(values) {
                param.set_value(value)?;
            }
        }
        log::info!("{}：已加载模型参数", path.display());
        Ok(())
    }
}

/// 从存档重建整个网络：以存档中的选项为基础、`overrides`中给出的项优先，再加载参数
pub fn load(path: impl AsRef<Path>, overrides: &NetworkOptions) -> Result<Network, NetworkError> {
    load_with_registry(path, overrides, LayerRegistry::default())
}

/// 同`load`，用于含自定义层类型的网络
pub fn load_with_registry(
    path: impl AsRef<Path>,
    overrides: &NetworkOptions,
    registry: LayerRegistry,
) -> Result<Network, NetworkError> {
    let path = path.as_ref();
    let saved = read_record(path)?;
    let kind: NetworkKind = saved.klass.parse()?;
    let options: NetworkOptions = serde_json::from_str(&saved.options)?;
    let network = Network::with_registry(kind, options.merge(overrides), registry)?;
    network.load_params(path)?;
    Ok(network)
}
