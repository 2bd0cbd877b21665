//! 属性文件解析与属性文件属性源

use config_abstractions::PropertySource;
use infrastructure_common::{ConfigError, ConfigResult, PropertyValue};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

const BYTE_ORDER_MARK: char = '\u{feff}';
const WHITESPACE: &[char] = &[' ', '\t', '\r'];
const COMMENT_PREFIXES: &[char] = &[';', '#'];
const KEY_VALUE_SEPARATORS: &[char] = &['=', ':'];
const LINE_CONTINUATION: char = '\\';

/// 解析属性文件内容，按出现顺序返回键值对
///
/// 规则：
/// - 第一行开头的 UTF-8 BOM 会被忽略
/// - 去掉首尾空白后以 `;` 或 `#` 开头的行是注释
/// - 以 `\` 结尾的行与下一行拼接，拼接片段各自去掉首尾空白
/// - 空行结束尚未完成的续行
/// - 在第一个 `=` 或 `:` 处切分，键或值为空的行被忽略
pub fn parse_properties(content: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    let mut pending = String::new();

    for (index, raw_line) in content.split('\n').enumerate() {
        let raw_line = if index == 0 {
            raw_line.strip_prefix(BYTE_ORDER_MARK).unwrap_or(raw_line)
        } else {
            raw_line
        };
        let line = trim(raw_line);

        if line.starts_with(COMMENT_PREFIXES) {
            continue;
        }

        if line.is_empty() {
            if !pending.is_empty() {
                complete_line(&mut pending, &mut entries);
            }
            continue;
        }

        if let Some(fragment) = line.strip_suffix(LINE_CONTINUATION) {
            pending.push_str(trim(fragment));
            continue;
        }

        pending.push_str(line);
        complete_line(&mut pending, &mut entries);
    }

    if !pending.is_empty() {
        complete_line(&mut pending, &mut entries);
    }

    entries
}

fn trim(text: &str) -> &str {
    text.trim_matches(WHITESPACE)
}

fn complete_line(pending: &mut String, entries: &mut Vec<(String, String)>) {
    let line = std::mem::take(pending);
    let Some((key, value)) = line.split_once(KEY_VALUE_SEPARATORS) else {
        return;
    };

    let (key, value) = (trim(key), trim(value));
    if !key.is_empty() && !value.is_empty() {
        entries.push((key.to_string(), value.to_string()));
    }
}

/// 属性文件属性源
///
/// 构造时一次性读入并解析文件，之后内容不再变化（静态）。
/// 文件不可读时属性源没有任何值，注册时会被直接丢弃。
#[derive(Debug, Clone)]
pub struct PropertyFilePropertySource {
    path: String,
    properties: HashMap<String, String>,
}

impl PropertyFilePropertySource {
    /// 打开并解析属性文件
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let properties = match Self::read(path) {
            Ok(content) => {
                let properties: HashMap<_, _> = parse_properties(&content).into_iter().collect();
                debug!("加载属性文件: {} ({} 项)", path.display(), properties.len());
                properties
            }
            Err(e) => {
                debug!("属性文件不可用，视为无值: {}", e);
                HashMap::new()
            }
        };

        Self {
            path: path.display().to_string(),
            properties,
        }
    }

    /// 从内存中的文本创建属性源，`name` 仅用于日志
    pub fn parse(name: impl Into<String>, content: &str) -> Self {
        Self {
            path: name.into(),
            properties: parse_properties(content).into_iter().collect(),
        }
    }

    /// 文件路径
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 已加载的属性数量
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    fn read(path: &Path) -> ConfigResult<String> {
        std::fs::read(path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .map_err(|source| ConfigError::FileReadError {
                path: path.display().to_string(),
                source,
            })
    }
}

impl From<&str> for PropertyFilePropertySource {
    fn from(path: &str) -> Self {
        Self::open(path)
    }
}

impl PropertySource for PropertyFilePropertySource {
    fn name(&self) -> &str {
        &self.path
    }

    fn get_property(&self, property_name: &str) -> PropertyValue {
        self.properties
            .get(property_name)
            .map(|value| PropertyValue::from(value.as_str()))
            .unwrap_or_default()
    }

    fn has_values(&self) -> bool {
        !self.properties.is_empty()
    }

    fn is_static(&self) -> bool {
        true
    }
}
