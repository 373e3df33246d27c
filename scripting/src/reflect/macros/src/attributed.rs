use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Expr, Fields, GenericArgument, Ident, LitStr, PathArguments, Token,
    Type, parse::ParseStream, parse_macro_input, spanned::Spanned,
};

/// `("Name")` or `("Name", count = N)`.
struct NameAndCount {
    name: LitStr,
    count: Option<Expr>,
}

fn parse_name_and_count(attr: &Attribute) -> syn::Result<NameAndCount> {
    attr.parse_args_with(|input: ParseStream| {
        let name: LitStr = input.parse()?;
        let mut count = None;
        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            let key: Ident = input.parse()?;
            if key != "count" {
                return Err(syn::Error::new(key.span(), "expected `count = N`"));
            }
            input.parse::<Token![=]>()?;
            count = Some(input.parse()?);
        }
        if name.value().is_empty() {
            return Err(syn::Error::new(name.span(), "attribute names cannot be empty"));
        }
        Ok(NameAndCount { name, count })
    })
}

/// `External<T>` -> `T`.
fn external_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "External" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

pub fn derive_attributed(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let ast = parse_macro_input!(input as DeriveInput);
    match expand(&ast) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn expand(ast: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &ast.ident;
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new(
            ast.generics.span(),
            "Attributed cannot be derived for generic types",
        ));
    }

    let Data::Struct(data) = &ast.data else {
        return Err(syn::Error::new(
            Span::call_site(),
            "Attributed can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new(
            data.fields.span(),
            "Attributed requires named fields",
        ));
    };

    let mut class = LitStr::new(&struct_name.to_string(), struct_name.span());
    let mut tables = Vec::new();
    for attr in &ast.attrs {
        if attr.path().is_ident("class") {
            class = attr.parse_args()?;
        } else if attr.path().is_ident("table") {
            tables.push(parse_name_and_count(attr)?);
        }
    }

    let mut scope_field = None;
    let mut externals = Vec::new();
    for field in &fields.named {
        let Some(ident) = &field.ident else {
            continue;
        };
        for attr in &field.attrs {
            if attr.path().is_ident("scope") {
                scope_field = Some(ident.clone());
            } else if attr.path().is_ident("attribute") {
                let inner = external_inner(&field.ty).ok_or_else(|| {
                    syn::Error::new(field.ty.span(), "prescribed attributes must be `External<T>`")
                })?;
                externals.push((ident.clone(), inner.clone(), parse_name_and_count(attr)?));
            }
        }
    }
    let scope_field = scope_field
        .or_else(|| {
            fields
                .named
                .iter()
                .filter_map(|f| f.ident.clone())
                .find(|ident| ident == "scope")
        })
        .ok_or_else(|| {
            syn::Error::new(
                Span::call_site(),
                "Attributed requires a `Scope` field marked `#[scope]`",
            )
        })?;

    // Use ::rusty_scripting paths, which work both inside and outside the crate.
    // Inside the crate, this works because of `extern crate self as rusty_scripting;` in lib.rs
    let reflect = quote! { ::rusty_scripting::reflect };

    let external_signatures = externals.iter().map(|(field, inner, attr)| {
        let name = &attr.name;
        let count = match &attr.count {
            Some(count) => quote! { #count },
            None => quote! { 1 },
        };
        quote! {
            #reflect::Signature::external(
                #name,
                <#inner as #reflect::Value>::KIND,
                #count,
                {
                    fn accessor(node: &dyn #reflect::Node) -> ::std::option::Option<#reflect::Binding> {
                        #reflect::Node::as_any(node)
                            .downcast_ref::<#struct_name>()
                            .map(|this| ::std::convert::From::from(this.#field.share()))
                    }
                    accessor
                },
            )
        }
    });

    let table_signatures = tables.iter().map(|attr| {
        let name = &attr.name;
        let count = match &attr.count {
            Some(count) => quote! { #count },
            None => quote! { 0 },
        };
        quote! { #reflect::Signature::table(#name, #count) }
    });

    Ok(quote! {
        impl #reflect::Attributed for #struct_name {
            const CLASS_NAME: &'static str = #class;

            fn signatures() -> ::std::vec::Vec<#reflect::Signature> {
                ::std::vec![
                    #(#external_signatures,)*
                    #(#table_signatures,)*
                ]
            }
        }

        impl #reflect::Node for #struct_name {
            fn scope(&self) -> &#reflect::Scope {
                &self.#scope_field
            }

            fn scope_mut(&mut self) -> &mut #reflect::Scope {
                &mut self.#scope_field
            }

            fn class_name(&self) -> &'static str {
                #class
            }

            fn clone_node(&self) -> ::std::boxed::Box<dyn #reflect::Node> {
                ::std::boxed::Box::new(::std::clone::Clone::clone(self))
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn is_attributed(&self) -> bool {
                true
            }
        }
    })
}
