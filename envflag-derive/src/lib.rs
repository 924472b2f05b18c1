//! `#[derive(Schema)]` for envflag configuration structs.
//!
//! ```ignore
//! #[derive(Default, envflag::Schema)]
//! struct AppConfig {
//!     #[envflag(env = "listen_port", help = "Port to listen on")]
//!     port: u16,
//!     db: Database,
//!     #[envflag(flatten)]
//!     logging: Logging,
//!     #[envflag(decode)]
//!     level: Level,
//!     #[envflag(skip)]
//!     cache: Cache,
//! }
//! ```

mod field;
mod generate;

use proc_macro2::TokenStream;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

use crate::{field::FieldRepr, generate::CodeGenerator};

#[proc_macro_derive(Schema, attributes(envflag))]
pub fn derive_schema(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match impl_derive(&input) {
        Ok(output) => output.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn impl_derive(input: &DeriveInput) -> syn::Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Schema derive only supports structs",
        ));
    };

    let fields = match &data.fields {
        Fields::Named(named) => named
            .named
            .iter()
            .map(FieldRepr::parse)
            .collect::<syn::Result<Vec<_>>>()?,
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Schema derive only supports structs with named fields",
            ));
        }
    };

    Ok(CodeGenerator::new(input).generate(&fields))
}
