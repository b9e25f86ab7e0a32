//! # Component Macros
//!
//! 这个 crate 提供编译期依赖装配的过程宏，代替运行时反射。
//!
//! ## 核心宏
//!
//! - [`Injectable`] - 为结构体生成 `di_abstractions::Injectable` 实现
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::Injectable;
//! use std::sync::Arc;
//!
//! #[derive(Injectable)]
//! pub struct OrderService {
//!     repository: Arc<OrderRepository>,
//!     #[inject(name = "audit")]
//!     audit_log: Arc<dyn AuditLog>,
//!     cache: Option<Arc<Cache>>,
//!     #[inject(property = "orders.page_size")]
//!     page_size: usize,
//!     #[inject(default)]
//!     stats: OrderStats,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod injectable;
mod utils;

// Re-exports are not allowed in proc-macro crates

/// 可注入类型派生宏
///
/// 字段规则：
///
/// - `Arc<T>` - 解析 `T`，计入 `dependencies()`
/// - `Option<Arc<T>>` - 可选解析，未注册时为 `None`
/// - `#[inject(name = "x")]` - 按名称解析（可用于以上两种字段），名称一并计入 `dependencies()`
/// - `#[inject(property = "key")]` - 读取属性并转换为字段类型；`Option<T>` 字段允许属性缺失
/// - `#[inject(default)]` - 使用 `Default::default()`
///
/// 其他字段类型会产生编译错误。
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    injectable::derive_injectable_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
