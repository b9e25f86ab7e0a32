//! `#[derive(Injectable)]` 实现

use crate::utils::{arc_inner, option_inner};
use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Error, Field, Fields, LitStr, Result, Type};

/// 字段上的 `#[inject(...)]` 参数
#[derive(Default)]
struct InjectArgs {
    name: Option<LitStr>,
    property: Option<LitStr>,
    default: bool,
}

impl InjectArgs {
    fn from_field(field: &Field) -> Result<Self> {
        let mut args = Self::default();

        for attr in field.attrs.iter().filter(|a| a.path().is_ident("inject")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    args.name = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("property") {
                    args.property = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("default") {
                    args.default = true;
                } else {
                    return Err(meta.error("不支持的 inject 参数，可用: name, property, default"));
                }
                Ok(())
            })?;
        }

        let exclusive = [args.name.is_some(), args.property.is_some(), args.default];
        if exclusive.iter().filter(|set| **set).count() > 1 {
            return Err(Error::new(
                field.span(),
                "inject 参数 name / property / default 只能选择一个",
            ));
        }
        Ok(args)
    }
}

/// 单个字段的装配方式
enum FieldPlan<'a> {
    Required { ty: &'a Type, name: Option<LitStr> },
    Optional { ty: &'a Type, name: Option<LitStr> },
    Property { ty: &'a Type, key: LitStr },
    OptionalProperty { ty: &'a Type, key: LitStr },
    Default,
}

impl<'a> FieldPlan<'a> {
    fn for_field(field: &'a Field) -> Result<Self> {
        let args = InjectArgs::from_field(field)?;
        let ty = &field.ty;

        if args.default {
            return Ok(Self::Default);
        }
        if let Some(key) = args.property {
            return Ok(match option_inner(ty) {
                Some(inner) => Self::OptionalProperty { ty: inner, key },
                None => Self::Property { ty, key },
            });
        }
        if let Some(inner) = arc_inner(ty) {
            return Ok(Self::Required {
                ty: inner,
                name: args.name,
            });
        }
        if let Some(inner) = option_inner(ty).and_then(arc_inner) {
            return Ok(Self::Optional {
                ty: inner,
                name: args.name,
            });
        }

        Err(Error::new(
            ty.span(),
            "无法注入该字段: 需要 Arc<T>、Option<Arc<T>>，或使用 #[inject(property = \"..\")] / #[inject(default)]",
        ))
    }

    fn initializer(&self, span: proc_macro2::Span) -> TokenStream {
        match self {
            Self::Required { ty, name: None } => quote_spanned! {span=> ctx.get::<#ty>()? },
            Self::Required { ty, name: Some(name) } => {
                quote_spanned! {span=> ctx.get_named::<#ty>(#name)? }
            }
            Self::Optional { ty, name: None } => {
                quote_spanned! {span=> ctx.get_optional::<#ty>()? }
            }
            Self::Optional { ty, name: Some(name) } => {
                quote_spanned! {span=> ctx.get_optional_named::<#ty>(#name)? }
            }
            Self::Property { ty, key } => {
                quote_spanned! {span=> ctx.property_required::<#ty>(#key)? }
            }
            Self::OptionalProperty { ty, key } => {
                quote_spanned! {span=> ctx.property::<#ty>(#key)? }
            }
            Self::Default => quote_spanned! {span=> ::std::default::Default::default() },
        }
    }

    /// 必需依赖的 `DefinitionKey` 表达式
    fn dependency(&self) -> Option<TokenStream> {
        match self {
            Self::Required { ty, name: None } => {
                Some(quote! { ::di_abstractions::DefinitionKey::of::<#ty>(::std::option::Option::None) })
            }
            Self::Required { ty, name: Some(name) } => Some(quote! {
                ::di_abstractions::DefinitionKey::of::<#ty>(::std::option::Option::Some(#name))
            }),
            _ => None,
        }
    }
}

/// 实现 #[derive(Injectable)] 宏
pub fn derive_injectable_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(Error::new(
                input.span(),
                "Injectable 只能用于结构体",
            ))
        }
    };

    let (plans, construct) = match &data.fields {
        Fields::Named(fields) => {
            let plans = fields
                .named
                .iter()
                .map(|field| FieldPlan::for_field(field).map(|plan| (field, plan)))
                .collect::<Result<Vec<_>>>()?;
            let inits = plans.iter().map(|(field, plan)| {
                let ident = &field.ident;
                let init = plan.initializer(field.ty.span());
                quote! { #ident: #init }
            });
            let construct = quote! { Self { #(#inits),* } };
            (plans, construct)
        }
        Fields::Unit => (Vec::new(), quote! { Self }),
        Fields::Unnamed(fields) => {
            return Err(Error::new(
                fields.span(),
                "Injectable 仅支持具名字段结构体或单元结构体",
            ))
        }
    };

    let dependencies = plans.iter().filter_map(|(_, plan)| plan.dependency());

    Ok(quote! {
        impl #impl_generics ::di_abstractions::Injectable for #struct_name #ty_generics #where_clause {
            fn dependencies() -> ::std::vec::Vec<::di_abstractions::DefinitionKey> {
                ::std::vec![#(#dependencies),*]
            }

            #[allow(unused_variables)]
            fn build(
                ctx: &::di_abstractions::ResolveContext<'_>,
            ) -> ::di_abstractions::DependencyResult<Self> {
                ::std::result::Result::Ok(#construct)
            }
        }
    })
}
