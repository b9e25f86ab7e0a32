//! 元数据定义
//!
//! 提供定义身份标识所需的类型信息

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 类型信息
///
/// 相等性与哈希只比较 [`TypeId`]，名称仅用于日志和错误信息。
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    /// 类型ID
    pub id: TypeId,
    /// 完整类型名称（包含模块路径）
    pub name: &'static str,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        match base.rfind("::") {
            Some(idx) => &self.name[idx + 2..],
            None => self.name,
        }
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// 定义的身份标识：类型 + 可选名称
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DefinitionKey {
    /// 声明的类型
    pub type_info: TypeInfo,
    /// 可选限定名称
    pub name: Option<String>,
}

impl DefinitionKey {
    /// 创建新的定义标识
    pub fn new(type_info: TypeInfo, name: Option<String>) -> Self {
        Self { type_info, name }
    }

    /// 从类型创建定义标识
    pub fn of<T: ?Sized + 'static>(name: Option<&str>) -> Self {
        Self::new(TypeInfo::of::<T>(), name.map(str::to_string))
    }
}

impl fmt::Display for DefinitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "'{}' (名称: '{}')", self.type_info.name, name),
            None => write!(f, "'{}'", self.type_info.name),
        }
    }
}
