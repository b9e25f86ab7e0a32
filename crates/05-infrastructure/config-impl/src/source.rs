//! 属性源抽象接口

use di_common::ConfigResult;
use serde_json::Value;
use std::collections::HashMap;

/// 属性源 trait
///
/// 定义从不同数据源读取属性的统一接口。嵌套结构展开为以 `.` 分隔的键。
pub trait PropertySource: Send + Sync {
    /// 获取属性源名称
    fn name(&self) -> &str;

    /// 获取属性源优先级，优先级高的属性源后加载并覆盖同名属性
    fn priority(&self) -> i32 {
        0
    }

    /// 读取全部属性
    fn load(&self) -> ConfigResult<HashMap<String, Value>>;
}

/// 按优先级依次加载属性源并合并结果
pub fn load_all(sources: &[Box<dyn PropertySource>]) -> ConfigResult<HashMap<String, Value>> {
    let mut ordered: Vec<&dyn PropertySource> = sources.iter().map(AsRef::as_ref).collect();
    ordered.sort_by_key(|source| source.priority());

    let mut merged = HashMap::new();
    for source in ordered {
        let values = source.load()?;
        tracing::debug!("属性源 {} 提供了 {} 个属性", source.name(), values.len());
        merged.extend(values);
    }
    Ok(merged)
}

/// 将嵌套的 JSON 对象展开为点分隔键
///
/// 每个对象节点本身也以其路径保存，便于整体反序列化为结构体。
pub fn flatten_into(prefix: &str, value: &Value, out: &mut HashMap<String, Value>) {
    if let Value::Object(map) = value {
        for (key, nested) in map {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            flatten_into(&full_key, nested, out);
            out.insert(full_key, nested.clone());
        }
    }
}
