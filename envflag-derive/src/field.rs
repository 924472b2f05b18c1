use syn::ext::IdentExt;
use syn::{Field, Ident, LitStr, Type};

pub struct FieldRepr {
    pub ident: Ident,
    /// Canonical field name, without any `r#` prefix.
    pub name: String,
    pub ty: Type,
    pub overrides: Overrides,
    pub field_type: FieldType,
}

#[derive(Default)]
pub struct Overrides {
    pub env: Option<LitStr>,
    pub flag: Option<LitStr>,
    pub json: Option<LitStr>,
    pub help: Option<LitStr>,
}

impl Overrides {
    fn is_empty(&self) -> bool {
        self.env.is_none() && self.flag.is_none() && self.json.is_none() && self.help.is_none()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum FieldType {
    /// #[envflag(flatten)]
    Flatten,
    /// #[envflag(decode)]
    Decode,
    /// #[envflag(skip)]
    Skip,
    /// Bound through the field type's `Bind` impl.
    Standard,
}

impl FieldRepr {
    pub fn parse(field: &Field) -> syn::Result<FieldRepr> {
        let ident = field.ident.clone().ok_or_else(|| {
            syn::Error::new_spanned(field, "Schema derive only supports structs with named fields")
        })?;
        let name = ident.unraw().to_string();

        let mut overrides = Overrides::default();
        let mut markers = Vec::new();

        for attr in &field.attrs {
            if !attr.path().is_ident("envflag") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                let slot = if meta.path.is_ident("env") {
                    &mut overrides.env
                } else if meta.path.is_ident("flag") {
                    &mut overrides.flag
                } else if meta.path.is_ident("json") {
                    &mut overrides.json
                } else if meta.path.is_ident("help") {
                    &mut overrides.help
                } else {
                    let marker = if meta.path.is_ident("flatten") {
                        FieldType::Flatten
                    } else if meta.path.is_ident("decode") {
                        FieldType::Decode
                    } else if meta.path.is_ident("skip") {
                        FieldType::Skip
                    } else {
                        return Err(meta.error("unsupported envflag attribute"));
                    };
                    if !meta.input.is_empty() && !meta.input.peek(syn::Token![,]) {
                        return Err(meta.error("expected a marker without a value"));
                    }
                    markers.push(marker);
                    return Ok(());
                };

                if slot.is_some() {
                    return Err(meta.error("duplicate envflag attribute"));
                }
                let value: LitStr = meta.value()?.parse()?;
                *slot = Some(value);
                Ok(())
            })?;
        }

        let field_type = match markers.len() {
            0 => FieldType::Standard,
            1 => markers.remove(0),
            _ => {
                return Err(syn::Error::new_spanned(
                    field,
                    "flatten, decode and skip are mutually exclusive",
                ));
            }
        };

        if matches!(field_type, FieldType::Flatten | FieldType::Skip) && !overrides.is_empty() {
            return Err(syn::Error::new_spanned(
                field,
                "flatten and skip fields take no naming attributes",
            ));
        }

        Ok(FieldRepr {
            ident,
            name,
            ty: field.ty.clone(),
            overrides,
            field_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    fn parse(field: Field) -> syn::Result<FieldRepr> {
        FieldRepr::parse(&field)
    }

    #[test]
    fn plain_field() {
        let repr = parse(parse_quote!(pub port: u16)).unwrap();
        assert_eq!(repr.name, "port");
        assert_eq!(repr.field_type, FieldType::Standard);
        assert!(repr.overrides.is_empty());
    }

    #[test]
    fn raw_identifier_is_unraw_named() {
        let repr = parse(parse_quote!(r#type: String)).unwrap();
        assert_eq!(repr.name, "type");
    }

    #[test]
    fn overrides_are_collected() {
        let repr = parse(parse_quote!(
            #[envflag(
                env = "max_retries",
                flag = "retries",
                json = "maxRetries",
                help = "Retry budget"
            )]
            retries: u32
        ))
        .unwrap();
        assert_eq!(repr.overrides.env.unwrap().value(), "max_retries");
        assert_eq!(repr.overrides.flag.unwrap().value(), "retries");
        assert_eq!(repr.overrides.json.unwrap().value(), "maxRetries");
        assert_eq!(repr.overrides.help.unwrap().value(), "Retry budget");
    }

    #[test]
    fn markers() {
        let repr = parse(parse_quote!(#[envflag(flatten)] base: Base)).unwrap();
        assert_eq!(repr.field_type, FieldType::Flatten);
        let repr = parse(parse_quote!(#[envflag(decode, help = "Level")] level: Level)).unwrap();
        assert_eq!(repr.field_type, FieldType::Decode);
        let repr = parse(parse_quote!(#[envflag(skip)] cache: Cache)).unwrap();
        assert_eq!(repr.field_type, FieldType::Skip);
    }

    #[test]
    fn conflicting_markers_are_rejected() {
        assert!(parse(parse_quote!(#[envflag(flatten, skip)] base: Base)).is_err());
        assert!(parse(parse_quote!(#[envflag(flatten, env = "X")] base: Base)).is_err());
    }

    #[test]
    fn unknown_and_duplicate_attributes_are_rejected() {
        assert!(parse(parse_quote!(#[envflag(default = "1")] port: u16)).is_err());
        assert!(parse(parse_quote!(#[envflag(env = "A", env = "B")] port: u16)).is_err());
        assert!(parse(parse_quote!(#[envflag(env)] port: u16)).is_err());
    }

    #[test]
    fn unrelated_attributes_are_ignored() {
        let repr = parse(parse_quote!(#[serde(rename = "p")] port: u16)).unwrap();
        assert_eq!(repr.field_type, FieldType::Standard);
    }
}
