//! 宏工具函数

use syn::{GenericArgument, PathArguments, Type};

/// 取类型路径的最后一段，例如 `std::sync::Arc<T>` 中的 `Arc`
fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => type_path.path.segments.last(),
        _ => None,
    }
}

/// 从类型中提取泛型参数
pub fn extract_generic_type(ty: &Type) -> Option<&Type> {
    let segment = last_segment(ty)?;
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(GenericArgument::Type(inner_type)) => Some(inner_type),
            _ => None,
        },
        _ => None,
    }
}

/// 检查类型是否为 Option<T>
pub fn is_option_type(ty: &Type) -> bool {
    last_segment(ty).is_some_and(|segment| segment.ident == "Option")
}

/// 检查类型是否为 Arc<T>
pub fn is_arc_type(ty: &Type) -> bool {
    last_segment(ty).is_some_and(|segment| segment.ident == "Arc")
}

/// 若类型为 `Arc<T>` 则返回 `T`
pub fn arc_inner(ty: &Type) -> Option<&Type> {
    if is_arc_type(ty) {
        extract_generic_type(ty)
    } else {
        None
    }
}

/// 若类型为 `Option<T>` 则返回 `T`
pub fn option_inner(ty: &Type) -> Option<&Type> {
    if is_option_type(ty) {
        extract_generic_type(ty)
    } else {
        None
    }
}
