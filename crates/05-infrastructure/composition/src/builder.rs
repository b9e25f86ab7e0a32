//! 应用构建器

use crate::error::StartupError;
use config_impl::{
    load_all, EnvironmentPropertySource, JsonPropertySource, PropertySource, TomlPropertySource,
};
use di_abstractions::Module;
use di_common::LogLevel;
use di_impl::{ContainerConfig, Koin, ResolutionHook};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// 应用构建器
///
/// 启动顺序：日志初始化 → 属性 → 模块 → 依赖校验 → 启动实例。
pub struct KoinApplication {
    /// 待加载的模块
    modules: Vec<Module>,
    /// 容器配置
    config: ContainerConfig,
    /// 属性源列表
    property_sources: Vec<Box<dyn PropertySource>>,
    /// 直接设置的属性，覆盖属性源中的同名属性
    properties: HashMap<String, Value>,
    /// 解析钩子
    hooks: Vec<Arc<dyn ResolutionHook>>,
    /// 是否在启动时创建标记为启动创建的单例
    eager_start: bool,
    /// 是否在启动时校验声明的依赖
    validation_enabled: bool,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl KoinApplication {
    /// 创建新的应用构建器
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            config: ContainerConfig::default(),
            property_sources: Vec::new(),
            properties: HashMap::new(),
            hooks: Vec::new(),
            eager_start: true,
            validation_enabled: false,
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
        }
    }

    /// 添加多个模块
    pub fn modules(mut self, modules: impl IntoIterator<Item = Module>) -> Self {
        self.modules.extend(modules);
        self
    }

    /// 添加模块
    pub fn module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    /// 设置容器日志级别
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.log_level = level;
        self
    }

    /// 设置容器配置
    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 是否在启动时创建启动实例
    pub fn eager_start(mut self, enabled: bool) -> Self {
        self.eager_start = enabled;
        self
    }

    /// 启用或禁用依赖校验
    pub fn enable_validation(mut self, enabled: bool) -> Self {
        self.validation_enabled = enabled;
        self
    }

    /// 添加 TOML 属性文件
    pub fn add_config_toml<P: AsRef<Path>>(self, path: P) -> Self {
        info!("添加 TOML 属性文件: {}", path.as_ref().display());
        self.property_source(TomlPropertySource::new(path))
    }

    /// 添加 JSON 属性文件
    pub fn add_config_json<P: AsRef<Path>>(self, path: P) -> Self {
        info!("添加 JSON 属性文件: {}", path.as_ref().display());
        self.property_source(JsonPropertySource::new(path))
    }

    /// 添加环境变量属性源
    pub fn add_config_env_vars<S: Into<String>>(self, prefix: S) -> Self {
        let prefix = prefix.into();
        info!("添加环境变量属性源，前缀: {}", prefix);
        self.property_source(EnvironmentPropertySource::new(prefix))
    }

    /// 添加自定义属性源
    pub fn property_source<T: PropertySource + 'static>(mut self, source: T) -> Self {
        debug!("添加属性源: {}", source.name());
        self.property_sources.push(Box::new(source));
        self
    }

    /// 直接设置属性
    pub fn properties(mut self, properties: HashMap<String, Value>) -> Self {
        self.properties.extend(properties);
        self
    }

    /// 注册解析钩子
    pub fn hook(mut self, hook: Arc<dyn ResolutionHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true; // 启用日志初始化
        self
    }

    /// 启动容器
    pub fn start(self) -> Result<Arc<Koin>, StartupError> {
        // 只有在明确配置了日志时才初始化日志
        // 避免在测试环境中重复初始化
        if self.logging_enabled {
            self.initialize_logging()?;
        }

        let Self {
            modules,
            config,
            property_sources,
            properties,
            hooks,
            eager_start,
            validation_enabled,
            ..
        } = self;

        info!("开始启动容器");
        let started = Instant::now();
        let koin = Arc::new(Koin::new(config));
        for hook in hooks {
            koin.add_hook(hook);
        }

        let mut merged = load_all(&property_sources)?;
        merged.extend(properties);
        koin.load_properties(merged)?;

        koin.load_modules(modules)?;

        if validation_enabled {
            info!("开始依赖校验");
            koin.validate()
                .map_err(|errors| StartupError::Validation { errors })?;
        }

        if eager_start {
            koin.create_eager_instances()?;
        }

        info!(
            "容器启动完成，耗时 {:.3} ms",
            started.elapsed().as_secs_f64() * 1000.0
        );
        Ok(koin)
    }

    /// 初始化日志系统
    fn initialize_logging(&self) -> Result<(), StartupError> {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(self.logging_config.level)
            .with_target(self.logging_config.show_target)
            .with_thread_ids(self.logging_config.show_thread_ids)
            .with_file(self.logging_config.show_file)
            .with_line_number(self.logging_config.show_line_number);

        if self.logging_config.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|e| StartupError::Logging {
            message: e.to_string(),
        })?;

        info!("日志系统初始化完成");
        Ok(())
    }
}

impl Default for KoinApplication {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }
}
