use std::collections::HashSet;

use proc_macro2::{TokenStream, TokenTree};
use quote::{ToTokens, quote};
use syn::{DeriveInput, Generics, Ident, WherePredicate, parse_quote};

use super::field::{FieldRepr, FieldType};

pub struct CodeGenerator<'a> {
    input: &'a DeriveInput,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(input: &'a DeriveInput) -> Self {
        Self { input }
    }

    pub fn generate(&self, fields: &[FieldRepr]) -> TokenStream {
        let struct_name = &self.input.ident;
        let generics = self.bounded_generics(fields);
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
        let statements = fields.iter().filter_map(|field| self.walk_statement(field));

        quote! {
            impl #impl_generics ::envflag::Schema for #struct_name #ty_generics #where_clause {
                #[allow(unused_variables)]
                fn walk<'envflag>(
                    &'envflag mut self,
                    walker: &mut ::envflag::Walker<'envflag>,
                ) -> ::core::result::Result<(), ::envflag::EnvflagError> {
                    #(#statements)*
                    ::core::result::Result::Ok(())
                }
            }

            impl #impl_generics ::envflag::Bind for #struct_name #ty_generics #where_clause {
                fn bind<'envflag>(
                    &'envflag mut self,
                    meta: ::envflag::FieldMeta,
                    walker: &mut ::envflag::Walker<'envflag>,
                ) -> ::core::result::Result<(), ::envflag::EnvflagError> {
                    walker.nest(meta, ::envflag::Embedding::Named, self)
                }
            }
        }
    }

    /// The struct's generics plus a trait bound for every walked field whose
    /// type mentions a type parameter.
    fn bounded_generics(&self, fields: &[FieldRepr]) -> Generics {
        let mut generics = self.input.generics.clone();
        let params: HashSet<Ident> = generics.type_params().map(|p| p.ident.clone()).collect();
        if params.is_empty() {
            return generics;
        }

        let predicates: Vec<WherePredicate> = fields
            .iter()
            .filter(|field| mentions_param(field.ty.to_token_stream(), &params))
            .filter_map(|field| {
                let ty = &field.ty;
                match field.field_type {
                    FieldType::Skip => None,
                    FieldType::Standard => Some(parse_quote!(#ty: ::envflag::Bind)),
                    FieldType::Flatten => Some(parse_quote!(#ty: ::envflag::Schema)),
                    FieldType::Decode => Some(parse_quote!(#ty: ::envflag::Decode)),
                }
            })
            .collect();
        generics.make_where_clause().predicates.extend(predicates);
        generics
    }

    fn walk_statement(&self, field: &FieldRepr) -> Option<TokenStream> {
        let ident = &field.ident;
        let meta = self.field_meta(field);

        let statement = match field.field_type {
            FieldType::Skip => return None,
            FieldType::Standard => quote! {
                walker.field(#meta, &mut self.#ident)?;
            },
            FieldType::Flatten => quote! {
                walker.nest(#meta, ::envflag::Embedding::Anonymous, &mut self.#ident)?;
            },
            FieldType::Decode => quote! {
                walker.leaf(#meta, ::envflag::Slot::Custom(&mut self.#ident))?;
            },
        };
        Some(statement)
    }

    fn field_meta(&self, field: &FieldRepr) -> TokenStream {
        let name = &field.name;
        let overrides = &field.overrides;
        let env = overrides.env.as_ref().map(|lit| quote!(.env(#lit)));
        let flag = overrides.flag.as_ref().map(|lit| quote!(.flag(#lit)));
        let json = overrides.json.as_ref().map(|lit| quote!(.display(#lit)));
        let help = overrides.help.as_ref().map(|lit| quote!(.help(#lit)));

        quote! {
            ::envflag::FieldMeta::new(#name) #env #flag #json #help
        }
    }
}

fn mentions_param(tokens: TokenStream, params: &HashSet<Ident>) -> bool {
    tokens.into_iter().any(|tree| match tree {
        TokenTree::Ident(ident) => params.contains(&ident),
        TokenTree::Group(group) => mentions_param(group.stream(), params),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(input: DeriveInput) -> String {
        let fields = match &input.data {
            syn::Data::Struct(data) => data
                .fields
                .iter()
                .map(|field| FieldRepr::parse(field).unwrap())
                .collect::<Vec<_>>(),
            _ => unreachable!(),
        };
        CodeGenerator::new(&input).generate(&fields).to_string()
    }

    #[test]
    fn generic_fields_are_bounded() {
        let output = generate(parse_quote! {
            struct Pair<T, S> {
                value: T,
                #[envflag(flatten)]
                rest: S,
                list: Vec<T>,
                count: u16,
            }
        });
        assert!(output.contains("T : :: envflag :: Bind"));
        assert!(output.contains("S : :: envflag :: Schema"));
        assert!(output.contains("Vec < T > : :: envflag :: Bind"));
        assert!(!output.contains("u16 : :: envflag :: Bind"));
    }

    #[test]
    fn skipped_generic_fields_are_unbounded() {
        let output = generate(parse_quote! {
            struct Holder<T> {
                #[envflag(skip)]
                cache: T,
                port: u16,
            }
        });
        assert!(!output.contains("T : :: envflag"));
    }

    #[test]
    fn non_generic_structs_get_no_where_clause() {
        let output = generate(parse_quote! {
            struct Plain {
                port: u16,
            }
        });
        assert!(!output.contains("where"));
    }
}
