#![warn(missing_docs)]

//! This crate contains the attribute macro which turns an annotated impl block into a
//! `subcommander::HandlerSource` implementation.

extern crate proc_macro;

use proc_macro2::{Span, TokenStream};
use quote::quote;
use std::collections::HashMap;
use syn::{
    parse_macro_input,
    Attribute,
    Error,
    FnArg,
    Ident,
    ImplItem,
    ItemImpl,
    Lit,
    LitStr,
    Meta,
    NestedMeta,
    Result,
    Type,
};

/// Implements `HandlerSource<Ctx>` for the type of the annotated impl block.
///
/// Methods marked `#[subcommand(name = "..", alias("..", ..), permission = "..")]` become
/// subcommands and must have the signature `(&self, &Ctx, &str, &[String]) -> HandlerResult`.
/// Methods marked `#[complete(name = "..")]` become completion providers for the named subcommand
/// and must have the signature `(&self, &Ctx, &[String]) -> CompletionResult`. The receiver may be
/// omitted. When it is present, the type must be `Clone + 'static`, since each handler keeps its
/// own copy of the source.
#[proc_macro_attribute]
pub fn handler_source(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let context = parse_macro_input!(attr as Type);
    let item_impl = parse_macro_input!(item as ItemImpl);
    match generate_source(context, item_impl) {
        Ok(output) => output.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

struct SubcommandDecl {
    method: Ident,
    has_receiver: bool,
    name: LitStr,
    aliases: Vec<LitStr>,
    permission: Option<LitStr>,
}

struct CompletionDecl {
    method: Ident,
    has_receiver: bool,
    target: LitStr,
}

fn generate_source(context: Type, mut item_impl: ItemImpl) -> Result<TokenStream> {
    let mut subcommands = Vec::new();
    let mut completions = Vec::new();

    for item in item_impl.items.iter_mut() {
        let method = match item {
            ImplItem::Method(method) => method,
            _ => continue,
        };

        let has_receiver = matches!(method.sig.inputs.first(), Some(FnArg::Receiver(_)));
        let mut kept = Vec::with_capacity(method.attrs.len());
        for attr in method.attrs.drain(..) {
            if attr.path.is_ident("subcommand") {
                let (name, aliases, permission) = parse_subcommand(&attr)?;
                subcommands.push(SubcommandDecl {
                    method: method.sig.ident.clone(),
                    has_receiver,
                    name,
                    aliases,
                    permission,
                });
            } else if attr.path.is_ident("complete") {
                completions.push(CompletionDecl {
                    method: method.sig.ident.clone(),
                    has_receiver,
                    target: parse_complete(&attr)?,
                });
            } else {
                kept.push(attr);
            }
        }
        method.attrs = kept;
    }

    check_unique_keys(&subcommands)?;
    check_unique_targets(&completions)?;

    let self_ty = &item_impl.self_ty;

    let subcommand_exprs = subcommands.iter().map(|decl| {
        let SubcommandDecl {
            method,
            has_receiver,
            name,
            aliases,
            permission,
        } = decl;

        let (capture, call) = if *has_receiver {
            (
                quote! { let __this = ::core::clone::Clone::clone(self); },
                quote! { __this.#method(__caller, __label, __args) },
            )
        } else {
            (
                TokenStream::new(),
                quote! { <#self_ty>::#method(__caller, __label, __args) },
            )
        };
        let aliases = aliases.iter();
        let permission = permission.iter();

        quote! {
            {
                #capture
                ::subcommander::Subcommand::new(
                    #name,
                    move |__caller: &#context, __label: &str, __args: &[::std::string::String]| #call,
                )
                #( .alias(#aliases) )*
                #( .permission(#permission) )*
            }
        }
    });

    let completion_exprs = completions.iter().map(|decl| {
        let CompletionDecl {
            method,
            has_receiver,
            target,
        } = decl;

        let (capture, call) = if *has_receiver {
            (
                quote! { let __this = ::core::clone::Clone::clone(self); },
                quote! { __this.#method(__caller, __args) },
            )
        } else {
            (
                TokenStream::new(),
                quote! { <#self_ty>::#method(__caller, __args) },
            )
        };

        quote! {
            {
                #capture
                ::subcommander::Completion::new(
                    #target,
                    move |__caller: &#context, __args: &[::std::string::String]| #call,
                )
            }
        }
    });

    let (impl_generics, _, where_clause) = item_impl.generics.split_for_impl();

    Ok(quote! {
        #item_impl

        impl #impl_generics ::subcommander::HandlerSource<#context> for #self_ty #where_clause {
            fn subcommands(&self) -> ::std::vec::Vec<::subcommander::Subcommand<#context>> {
                ::std::vec![#( #subcommand_exprs ),*]
            }

            fn completions(&self) -> ::std::vec::Vec<::subcommander::Completion<#context>> {
                ::std::vec![#( #completion_exprs ),*]
            }
        }
    })
}

// Parses `#[subcommand(name = "..", alias("..", ..), alias = "..", permission = "..")]`
fn parse_subcommand(attr: &Attribute) -> Result<(LitStr, Vec<LitStr>, Option<LitStr>)> {
    let mut name = None;
    let mut aliases = Vec::new();
    let mut permission = None;

    for nested in meta_list(attr)? {
        match nested {
            NestedMeta::Meta(Meta::NameValue(pair)) if pair.path.is_ident("name") =>
                name = Some(lit_str(&pair.lit)?),
            NestedMeta::Meta(Meta::NameValue(pair)) if pair.path.is_ident("permission") =>
                permission = Some(lit_str(&pair.lit)?),
            NestedMeta::Meta(Meta::NameValue(pair)) if pair.path.is_ident("alias") =>
                aliases.push(lit_str(&pair.lit)?),
            NestedMeta::Meta(Meta::List(list)) if list.path.is_ident("alias") =>
                for alias in list.nested {
                    match alias {
                        NestedMeta::Lit(lit) => aliases.push(lit_str(&lit)?),
                        other => return Err(Error::new_spanned(other, "Expected a string literal.")),
                    }
                },
            other =>
                return Err(Error::new_spanned(
                    other,
                    "Expected `name = \"..\"`, `alias(\"..\", ..)` or `permission = \"..\"`.",
                )),
        }
    }

    let name = match name {
        Some(name) if !name.value().is_empty() => name,
        Some(name) => return Err(Error::new_spanned(name, "Must specify a name for the subcommand.")),
        None => return Err(Error::new_spanned(attr, "Must specify a name for the subcommand.")),
    };

    for key in std::iter::once(&name).chain(aliases.iter()) {
        let value = key.value();
        if value.is_empty() || value.chars().any(char::is_whitespace) {
            return Err(Error::new_spanned(
                key,
                "Subcommand names and aliases must be non-empty and contain no whitespace.",
            ));
        }
    }

    Ok((name, aliases, permission))
}

// Parses `#[complete(name = "..")]`
fn parse_complete(attr: &Attribute) -> Result<LitStr> {
    let mut target = None;

    for nested in meta_list(attr)? {
        match nested {
            NestedMeta::Meta(Meta::NameValue(pair)) if pair.path.is_ident("name") =>
                target = Some(lit_str(&pair.lit)?),
            other => return Err(Error::new_spanned(other, "Expected `name = \"..\"`.")),
        }
    }

    match target {
        Some(target) if !target.value().is_empty() => Ok(target),
        _ => Err(Error::new_spanned(
            attr,
            "Must specify a subcommand for the completion provider to attach to.",
        )),
    }
}

fn meta_list(attr: &Attribute) -> Result<impl Iterator<Item = NestedMeta>> {
    match attr.parse_meta()? {
        Meta::List(list) => Ok(list.nested.into_iter()),
        other => Err(Error::new_spanned(other, "Expected a parenthesized argument list.")),
    }
}

fn lit_str(lit: &Lit) -> Result<LitStr> {
    match lit {
        Lit::Str(lit) => Ok(lit.clone()),
        other => Err(Error::new_spanned(other, "Expected a string literal.")),
    }
}

fn check_unique_keys(subcommands: &[SubcommandDecl]) -> Result<()> {
    let mut all_keys: HashMap<String, &LitStr> = HashMap::new();
    let mut errors: Option<Error> = None;

    let keys = subcommands
        .iter()
        .flat_map(|decl| std::iter::once(&decl.name).chain(decl.aliases.iter()));
    for key in keys {
        if let Some(original) = all_keys.get(&key.value()) {
            let mut error = Error::new_spanned(key, "Subcommand names and aliases must be unique.");
            error.combine(Error::new(original.span(), "Key originally defined here"));
            errors = Some(match errors.take() {
                Some(mut errors) => {
                    errors.combine(error);
                    errors
                }
                None => error,
            });
            continue;
        }

        all_keys.insert(key.value(), key);
    }

    match errors {
        Some(errors) => Err(errors),
        None => Ok(()),
    }
}

fn check_unique_targets(completions: &[CompletionDecl]) -> Result<()> {
    let mut targets: HashMap<String, Span> = HashMap::new();
    for decl in completions {
        let target = decl
            .target
            .value()
            .chars()
            .flat_map(char::to_lowercase)
            .collect::<String>();
        if targets.insert(target, decl.target.span()).is_some() {
            return Err(Error::new_spanned(
                &decl.target,
                "This subcommand already has an attached completion provider.",
            ));
        }
    }

    Ok(())
}
