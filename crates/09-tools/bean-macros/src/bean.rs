//! Bean 派生宏实现

use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, punctuated::Punctuated, Attribute, DeriveInput, Meta, Result, Token};

/// `#[bean(...)]` 声明的能力
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeanArgs {
    pub context_aware: bool,
    pub factory_aware: bool,
    pub name_aware: bool,
}

impl BeanArgs {
    /// 合并类型上所有 `#[bean(...)]` 属性
    pub fn from_attributes(attrs: &[Attribute]) -> Result<Self> {
        let mut args = BeanArgs::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("bean")) {
            let parsed = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
            for meta in parsed {
                args.apply(&meta)?;
            }
        }

        Ok(args)
    }

    fn apply(&mut self, meta: &Meta) -> Result<()> {
        let Meta::Path(path) = meta else {
            return Err(syn::Error::new_spanned(meta, "bean 属性不接受参数"));
        };

        let flag = if path.is_ident("context_aware") {
            &mut self.context_aware
        } else if path.is_ident("factory_aware") {
            &mut self.factory_aware
        } else if path.is_ident("name_aware") {
            &mut self.name_aware
        } else {
            return Err(syn::Error::new_spanned(
                path,
                "未知的 bean 属性，可选值: context_aware, factory_aware, name_aware",
            ));
        };

        if *flag {
            return Err(syn::Error::new_spanned(path, "重复的 bean 属性"));
        }
        *flag = true;
        Ok(())
    }
}

/// 生成 `Bean` 实现
pub fn derive_bean_impl(mut input: DeriveInput) -> Result<TokenStream> {
    let args = BeanArgs::from_attributes(&input.attrs)?;
    let name = &input.ident;

    // Bean 要求 'static，泛型参数同样需要
    let type_params: Vec<_> = input.generics.type_params().map(|param| param.ident.clone()).collect();
    let where_clause = input.generics.make_where_clause();
    for param in type_params {
        where_clause.predicates.push(parse_quote!(#param: 'static));
    }
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let context_aware = args.context_aware.then(|| {
        quote! {
            fn as_context_aware(&mut self) -> ::std::option::Option<&mut dyn ::di_abstractions::ApplicationContextAware> {
                ::std::option::Option::Some(self)
            }
        }
    });

    let factory_aware = args.factory_aware.then(|| {
        quote! {
            fn as_factory_aware(&mut self) -> ::std::option::Option<&mut dyn ::di_abstractions::BeanFactoryAware> {
                ::std::option::Option::Some(self)
            }
        }
    });

    let name_aware = args.name_aware.then(|| {
        quote! {
            fn as_name_aware(&mut self) -> ::std::option::Option<&mut dyn ::di_abstractions::BeanNameAware> {
                ::std::option::Option::Some(self)
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::di_abstractions::Bean for #name #ty_generics #where_clause {
            #context_aware
            #factory_aware
            #name_aware
        }
    })
}
