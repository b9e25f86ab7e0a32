//! 属性源实现

use crate::source::{flatten_into, PropertySource};
use di_common::{ConfigError, ConfigResult};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

fn read_file(path: &Path) -> ConfigResult<String> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

/// TOML 文件属性源
#[derive(Debug, Clone)]
pub struct TomlPropertySource {
    file_path: PathBuf,
    priority: i32,
}

impl TomlPropertySource {
    /// 创建新的 TOML 属性源
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            file_path: path.as_ref().to_path_buf(),
            priority: 100, // TOML 文件默认高优先级
        }
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// 将 TOML 值转换为 JSON 值
    fn toml_to_json(value: &toml::Value) -> Value {
        match value {
            toml::Value::String(s) => Value::String(s.clone()),
            toml::Value::Integer(i) => Value::Number(serde_json::Number::from(*i)),
            toml::Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            toml::Value::Boolean(b) => Value::Bool(*b),
            toml::Value::Array(arr) => Value::Array(arr.iter().map(Self::toml_to_json).collect()),
            toml::Value::Table(table) => Value::Object(
                table
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::toml_to_json(v)))
                    .collect(),
            ),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        }
    }
}

impl PropertySource for TomlPropertySource {
    fn name(&self) -> &str {
        "TomlPropertySource"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn load(&self) -> ConfigResult<HashMap<String, Value>> {
        debug!("加载 TOML 属性文件: {}", self.file_path.display());
        let content = read_file(&self.file_path)?;
        let table: toml::Table = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: self.file_path.display().to_string(),
            source: Box::new(e),
        })?;

        let mut properties = HashMap::new();
        flatten_into(
            "",
            &Self::toml_to_json(&toml::Value::Table(table)),
            &mut properties,
        );
        Ok(properties)
    }
}

/// JSON 文件属性源
#[derive(Debug, Clone)]
pub struct JsonPropertySource {
    file_path: PathBuf,
    priority: i32,
}

impl JsonPropertySource {
    /// 创建新的 JSON 属性源
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            file_path: path.as_ref().to_path_buf(),
            priority: 90, // JSON 文件中等优先级
        }
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

impl PropertySource for JsonPropertySource {
    fn name(&self) -> &str {
        "JsonPropertySource"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn load(&self) -> ConfigResult<HashMap<String, Value>> {
        debug!("加载 JSON 属性文件: {}", self.file_path.display());
        let content = read_file(&self.file_path)?;
        let value: Value = serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: self.file_path.display().to_string(),
            source: Box::new(e),
        })?;

        if !value.is_object() {
            return Err(ConfigError::InvalidValue {
                key: self.file_path.display().to_string(),
                message: "顶层必须是对象".to_string(),
            });
        }

        let mut properties = HashMap::new();
        flatten_into("", &value, &mut properties);
        Ok(properties)
    }
}

/// 环境变量属性源
///
/// `APP_SERVER_PORT=8080`（前缀 `APP`）映射为属性 `server.port`，值保留为字符串，
/// 读取时按目标类型转换。
#[derive(Debug, Clone)]
pub struct EnvironmentPropertySource {
    prefix: String,
    separator: String,
    priority: i32,
}

impl EnvironmentPropertySource {
    /// 创建新的环境变量属性源
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: "_".to_string(),
            priority: 200, // 环境变量最高优先级
        }
    }

    /// 设置分隔符
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// 将环境变量键转换为属性键
    fn env_key_to_property_key(&self, env_key: &str) -> Option<String> {
        let key = env_key
            .strip_prefix(&self.prefix)?
            .trim_start_matches(self.separator.as_str());
        if key.is_empty() {
            return None;
        }
        Some(key.replace(self.separator.as_str(), ".").to_lowercase())
    }
}

impl PropertySource for EnvironmentPropertySource {
    fn name(&self) -> &str {
        "EnvironmentPropertySource"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn load(&self) -> ConfigResult<HashMap<String, Value>> {
        debug!("加载环境变量，前缀: {}", self.prefix);
        let properties: HashMap<String, Value> = std::env::vars()
            .filter_map(|(key, value)| {
                self.env_key_to_property_key(&key)
                    .map(|property| (property, Value::String(value)))
            })
            .collect();
        debug!("加载了 {} 个环境变量", properties.len());
        Ok(properties)
    }
}

/// 内存属性源
#[derive(Debug, Clone)]
pub struct MapPropertySource {
    values: HashMap<String, Value>,
    priority: i32,
}

impl MapPropertySource {
    pub fn new(values: HashMap<String, Value>) -> Self {
        Self {
            values,
            priority: 50,
        }
    }

    /// 添加属性
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Default for MapPropertySource {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        "MapPropertySource"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn load(&self) -> ConfigResult<HashMap<String, Value>> {
        Ok(self.values.clone())
    }
}
