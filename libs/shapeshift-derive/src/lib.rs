use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr, Visibility};

/// Derive `Mappable` and `Record` for a struct with named fields.
///
/// Each field may carry one tag:
///
/// ```ignore
/// #[derive(Record, Default)]
/// pub struct User {
///     #[shapeshift("name,required,len=8")]
///     pub username: String,
///     #[shapeshift("-")]
///     pub internal: u64,
///     pub age: i32,
///     secret: String, // non-pub: never read, never written
/// }
/// ```
///
/// The struct must implement `Default`, have no generic parameters, and
/// every field type must implement `Mappable`.
#[proc_macro_derive(Record, attributes(shapeshift))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

struct FieldInfo<'a> {
    ident: &'a syn::Ident,
    name: String,
    ty: &'a syn::Type,
    tag: String,
    exported: bool,
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;
    let name_str = name.to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record only supports structs with named fields",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "Record only supports structs")),
    };

    let mut infos = Vec::with_capacity(fields.len());
    for field in fields {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        infos.push(FieldInfo {
            ident,
            name: ident.to_string(),
            ty: &field.ty,
            tag: field_tag(field)?,
            exported: matches!(field.vis, Visibility::Public(_)),
        });
    }

    let schema_fields = infos.iter().map(|f| {
        let FieldInfo {
            name,
            ty,
            tag,
            exported,
            ..
        } = f;
        quote! {
            ::shapeshift::Field::new(
                #name,
                <#ty as ::shapeshift::Mappable>::field_type(),
                #tag,
                #exported,
            )
        }
    });

    let to_value_fields = infos.iter().map(|f| {
        let FieldInfo { ident, name, .. } = f;
        quote! { (#name, ::shapeshift::Mappable::to_value(&self.#ident)) }
    });

    let set_field_arms = infos.iter().map(|f| {
        let FieldInfo { ident, name, ty, .. } = f;
        quote! {
            #name => {
                self.#ident = <#ty as ::shapeshift::Mappable>::from_value(__value)?;
                Ok(())
            }
        }
    });

    Ok(quote! {
        impl ::shapeshift::Mappable for #name {
            fn field_type() -> ::shapeshift::FieldType {
                ::shapeshift::FieldType::Record(::shapeshift::RecordType::of::<Self>())
            }

            fn to_value(&self) -> ::shapeshift::Value {
                ::shapeshift::Value::Record(::shapeshift::RecordValue::new(
                    #name_str,
                    vec![#(#to_value_fields),*],
                ))
            }

            fn from_value(
                value: ::shapeshift::Value,
            ) -> Result<Self, ::shapeshift::ValueError> {
                ::shapeshift::record_from_value::<Self>(value)
            }
        }

        impl ::shapeshift::Record for #name {
            const NAME: &'static str = #name_str;

            fn schema() -> ::shapeshift::Schema {
                ::shapeshift::Schema::new(#name_str, vec![#(#schema_fields),*])
            }

            fn set_field(
                &mut self,
                __name: &str,
                __value: ::shapeshift::Value,
            ) -> Result<(), ::shapeshift::ValueError> {
                match __name {
                    #(#set_field_arms)*
                    _ => Err(::shapeshift::ValueError::UnknownField {
                        record: #name_str,
                        field: __name.to_string(),
                    }),
                }
            }
        }
    })
}

/// The string in `#[shapeshift("...")]`, or empty when the field has none.
fn field_tag(field: &syn::Field) -> Result<String, syn::Error> {
    let mut tag: Option<String> = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("shapeshift") {
            continue;
        }
        if tag.is_some() {
            return Err(syn::Error::new_spanned(
                attr,
                "duplicate #[shapeshift(...)] attribute",
            ));
        }
        let lit: LitStr = attr.parse_args()?;
        tag = Some(lit.value());
    }
    Ok(tag.unwrap_or_default())
}
