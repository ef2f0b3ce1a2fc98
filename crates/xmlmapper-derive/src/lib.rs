//! Derive macro for `helios-xmlmapper`.
//!
//! `#[derive(XmlSerializable)]` generates the static class descriptor, the
//! property accessor and an `XmlValue` impl so derived types can be nested in
//! other derived types.
//!
//! ## Attributes
//!
//! | Attribute | Placement | Effect |
//! |-----------|-----------|--------|
//! | `#[xml(rename = "...")]` | struct | short name used for the root element |
//! | `#[xml(rename = "...")]` | field | model-level property name |
//! | `#[xml(attribute)]` | field | written as an attribute |
//! | `#[xml(cdata)]` | field | written as a CDATA section |
//! | `#[xml(node_value)]` | field | written as the element's own text |
//! | `#[xml(type = "...")]` | field | overrides the declared type tag |
//! | `#[xml(skip)]` | field | never encoded |
//!
//! Role markers may be combined; the resolver picks attribute, then CDATA,
//! then node value. Role markers on `Vec`/`VecDeque` fields are rejected.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    Data, DeriveInput, Error, Fields, GenericArgument, LitStr, PathArguments, Type,
    parse_macro_input, spanned::Spanned,
};

#[proc_macro_derive(XmlSerializable, attributes(xml))]
pub fn derive_xml_serializable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_xml_serializable(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// Options collected from `#[xml(...)]` on a field.
#[derive(Default)]
struct FieldOptions {
    rename: Option<LitStr>,
    type_tag: Option<LitStr>,
    attribute: bool,
    cdata: bool,
    node_value: bool,
    skip: bool,
}

impl FieldOptions {
    fn has_role(&self) -> bool {
        self.attribute || self.cdata || self.node_value
    }
}

fn parse_field_options(field: &syn::Field) -> Result<FieldOptions, Error> {
    let mut options = FieldOptions::default();

    for attr in field.attrs.iter().filter(|a| a.path().is_ident("xml")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("attribute") {
                options.attribute = true;
            } else if meta.path.is_ident("cdata") {
                options.cdata = true;
            } else if meta.path.is_ident("node_value") {
                options.node_value = true;
            } else if meta.path.is_ident("skip") {
                options.skip = true;
            } else if meta.path.is_ident("rename") {
                options.rename = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("type") {
                options.type_tag = Some(meta.value()?.parse()?);
            } else {
                return Err(meta.error(
                    "unknown xml field attribute, expected one of: attribute, cdata, node_value, rename, type, skip",
                ));
            }
            Ok(())
        })?;
    }

    Ok(options)
}

fn parse_container_rename(input: &DeriveInput) -> Result<Option<LitStr>, Error> {
    let mut rename = None;

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("xml")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                rename = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unknown xml container attribute, expected: rename"))
            }
        })?;
    }

    Ok(rename)
}

/// Returns true if the type is syntactically a `Vec` or `VecDeque`, possibly
/// wrapped in `Option` or `Box`.
fn is_collection_type(ty: &Type) -> bool {
    let Type::Path(type_path) = ty else {
        return false;
    };
    let Some(segment) = type_path.path.segments.last() else {
        return false;
    };

    if segment.ident == "Vec" || segment.ident == "VecDeque" {
        return true;
    }

    if segment.ident == "Option" || segment.ident == "Box" {
        if let PathArguments::AngleBracketed(args) = &segment.arguments {
            return args.args.iter().any(|arg| match arg {
                GenericArgument::Type(inner) => is_collection_type(inner),
                _ => false,
            });
        }
    }

    false
}

/// Maps a `type = "..."` override to a `TypeTag` expression.
fn type_tag_tokens(tag: &LitStr) -> proc_macro2::TokenStream {
    match tag.value().as_str() {
        "string" => quote! { ::helios_xmlmapper::TypeTag::String },
        "int" | "integer" => quote! { ::helios_xmlmapper::TypeTag::Integer },
        "float" => quote! { ::helios_xmlmapper::TypeTag::Float },
        "bool" | "boolean" => quote! { ::helios_xmlmapper::TypeTag::Boolean },
        "object" => quote! { ::helios_xmlmapper::TypeTag::Object },
        "mixed" => quote! { ::helios_xmlmapper::TypeTag::Mixed },
        _ => quote! { ::helios_xmlmapper::TypeTag::Named(#tag) },
    }
}

fn expand_xml_serializable(input: DeriveInput) -> Result<proc_macro2::TokenStream, Error> {
    let ident = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "#[derive(XmlSerializable)] does not support generic parameters",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    ident.span(),
                    "#[derive(XmlSerializable)] requires a struct with named fields",
                ));
            }
        },
        Data::Enum(_) | Data::Union(_) => {
            return Err(Error::new(
                ident.span(),
                "#[derive(XmlSerializable)] can only be used on structs",
            ));
        }
    };

    let short_name = parse_container_rename(&input)?
        .unwrap_or_else(|| LitStr::new(&ident.unraw().to_string(), ident.span()));

    let mut descriptors = Vec::new();
    let mut accessors = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for field in fields {
        let options = parse_field_options(field)?;
        if options.skip {
            continue;
        }

        let field_ident = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected a named field"))?;
        let ty = &field.ty;

        if options.has_role() && is_collection_type(ty) {
            return Err(Error::new(
                ty.span(),
                "role markers (attribute, cdata, node_value) cannot be used on collection fields",
            ));
        }

        let name = options
            .rename
            .clone()
            .unwrap_or_else(|| LitStr::new(&field_ident.unraw().to_string(), field_ident.span()));
        if seen.contains(&name.value()) {
            return Err(Error::new(
                name.span(),
                format!("duplicate xml property name '{}'", name.value()),
            ));
        }
        seen.push(name.value());

        let declared_type = match &options.type_tag {
            Some(tag) => {
                let tag = type_tag_tokens(tag);
                quote! { <#ty as ::helios_xmlmapper::XmlValue>::DECLARED_TYPE.with_tag(#tag) }
            }
            None => quote! { <#ty as ::helios_xmlmapper::XmlValue>::DECLARED_TYPE },
        };

        let attribute = options.attribute;
        let cdata = options.cdata;
        let node_value = options.node_value;

        descriptors.push(quote! {
            ::helios_xmlmapper::PropertyMetadata::new(
                #name,
                ::core::option::Option::Some(#declared_type),
                ::helios_xmlmapper::Markers {
                    attribute: #attribute,
                    cdata: #cdata,
                    node_value: #node_value,
                },
            )
        });

        accessors.push(quote! {
            #name => ::core::option::Option::Some(
                ::helios_xmlmapper::XmlValue::to_xml_value(&self.#field_ident)
            )
        });
    }

    let class_name = LitStr::new(&ident.unraw().to_string(), Span::call_site());

    Ok(quote! {
        impl ::helios_xmlmapper::XmlSerializable for #ident {
            fn metadata(&self) -> &'static ::helios_xmlmapper::ClassMetadata {
                static METADATA: ::helios_xmlmapper::ClassMetadata =
                    ::helios_xmlmapper::ClassMetadata::new(
                        ::core::concat!(::core::module_path!(), "::", #class_name),
                        #short_name,
                        &[#(#descriptors),*],
                    );
                &METADATA
            }

            fn property_value(
                &self,
                property: &str,
            ) -> ::core::option::Option<::helios_xmlmapper::Value<'_>> {
                match property {
                    #(#accessors,)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl ::helios_xmlmapper::XmlValue for #ident {
            const DECLARED_TYPE: ::helios_xmlmapper::DeclaredType =
                ::helios_xmlmapper::DeclaredType::Single(::helios_xmlmapper::TypeTag::Object);

            fn to_xml_value(&self) -> ::helios_xmlmapper::Value<'_> {
                ::helios_xmlmapper::Value::Object(self)
            }
        }
    })
}
