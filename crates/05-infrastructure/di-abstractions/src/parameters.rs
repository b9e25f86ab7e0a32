//! 运行时参数
//!
//! 调用方在解析时传入、工厂函数按位置读取的额外参数，与注册表解析的依赖相互独立。

use di_common::{DependencyError, DependencyResult};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 按位置存放的运行时参数
#[derive(Clone, Default)]
pub struct Parameters {
    values: Vec<Arc<dyn Any + Send + Sync>>,
}

impl Parameters {
    /// 创建空参数列表
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加参数
    pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    pub fn push<T: Any + Send + Sync>(&mut self, value: T) {
        self.values.push(Arc::new(value));
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 按位置借用参数
    pub fn get_ref<T: Any>(&self, index: usize) -> Option<&T> {
        self.values.get(index)?.downcast_ref::<T>()
    }

    /// 按位置读取参数副本，缺失或类型不符时返回 `MissingParameter`
    pub fn get<T: Any + Clone>(&self, index: usize) -> DependencyResult<T> {
        self.get_ref::<T>(index)
            .cloned()
            .ok_or(DependencyError::MissingParameter {
                index,
                expected: std::any::type_name::<T>(),
            })
    }
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameters")
            .field("len", &self.values.len())
            .finish()
    }
}

/// 构造运行时参数
///
/// ```
/// use di_abstractions::parameters;
///
/// let params = parameters!["primary", 8080u16];
/// assert_eq!(params.len(), 2);
/// assert_eq!(params.get::<u16>(1).unwrap(), 8080);
/// ```
#[macro_export]
macro_rules! parameters {
    () => {
        $crate::Parameters::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Parameters::new()$(.with($value))+
    };
}
