//! Mappable derive macro implementation

use darling::util::PathList;
use darling::{ast, FromDeriveInput, FromField};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Visibility};

/// Receiver for the struct that derives `Mappable`
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(mapper), supports(struct_named))]
struct MappableReceiver {
    ident: syn::Ident,
    generics: syn::Generics,
    data: ast::Data<(), MappableFieldReceiver>,
    /// Zero-argument methods exposed to the mapper
    #[darling(default)]
    methods: PathList,
}

/// Receiver for the fields in the struct
#[derive(Debug, FromField)]
#[darling(attributes(mapper))]
struct MappableFieldReceiver {
    ident: Option<syn::Ident>,
    vis: Visibility,
    #[darling(default)]
    tag: Option<String>,
    #[darling(default)]
    skip: bool,
}

pub fn process_derive_mappable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let receiver = match MappableReceiver::from_derive_input(&input) {
        Ok(receiver) => receiver,
        Err(err) => return err.write_errors().into(),
    };

    match generate_mappable_impl(&receiver) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_mappable_impl(receiver: &MappableReceiver) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &receiver.ident;
    let struct_name_str = struct_name.to_string();

    if !receiver.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &receiver.generics,
            "Mappable cannot be derived for generic structs",
        ));
    }

    let ast::Data::Struct(fields) = &receiver.data else {
        unreachable!("Darling ensures this is a struct")
    };

    let all_fields: Vec<(&syn::Ident, &MappableFieldReceiver)> = fields
        .iter()
        .filter_map(|field| field.ident.as_ref().map(|ident| (ident, field)))
        .collect();

    // Skipped fields are invisible to the converter but not to the zero test.
    let zero_checks = all_fields.iter().map(|(ident, field)| {
        if field.skip {
            quote! { ::sovran_mapper::__private::skipped_is_zero(&self.#ident) }
        } else {
            quote! { ::sovran_mapper::Mappable::is_zero(&self.#ident) }
        }
    });

    let fields: Vec<(&syn::Ident, &MappableFieldReceiver)> = all_fields
        .iter()
        .copied()
        .filter(|(_, field)| !field.skip)
        .collect();

    let field_metas = fields.iter().map(|(ident, field)| {
        let name = ident.to_string();
        let exported = matches!(field.vis, Visibility::Public(_));
        let tag = match &field.tag {
            Some(tag) => quote! { ::core::option::Option::Some(#tag) },
            None => quote! { ::core::option::Option::None },
        };
        quote! { ::sovran_mapper::FieldMeta::new(#name, #tag, #exported) }
    });

    let field_idents: Vec<_> = fields.iter().map(|(ident, _)| *ident).collect();
    let field_names: Vec<_> = field_idents.iter().map(|ident| ident.to_string()).collect();

    let mut method_idents = Vec::new();
    for path in receiver.methods.iter() {
        let ident = path
            .get_ident()
            .ok_or_else(|| syn::Error::new_spanned(path, "expected a method name"))?;
        method_idents.push(ident);
    }
    let method_names: Vec<_> = method_idents.iter().map(|ident| ident.to_string()).collect();

    Ok(quote! {
        impl ::sovran_mapper::Typed for #struct_name {
            fn describe() -> ::sovran_mapper::TypeInfo {
                const FIELDS: &[::sovran_mapper::FieldMeta] = &[#(#field_metas),*];
                const METHODS: &[&str] = &[#(#method_names),*];
                ::sovran_mapper::TypeInfo::of::<Self>(::sovran_mapper::Shape::Struct(
                    ::sovran_mapper::StructInfo::new(#struct_name_str, FIELDS, METHODS),
                ))
            }
        }

        impl ::sovran_mapper::Mappable for #struct_name {
            fn type_info(&self) -> ::sovran_mapper::TypeInfo {
                <Self as ::sovran_mapper::Typed>::describe()
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }

            fn value_ref(&self) -> ::sovran_mapper::ValueRef<'_> {
                ::sovran_mapper::ValueRef::Struct(self)
            }

            fn value_mut(&mut self) -> ::sovran_mapper::ValueMut<'_> {
                ::sovran_mapper::ValueMut::Struct(self)
            }

            fn is_zero(&self) -> bool {
                true #(&& #zero_checks)*
            }

            fn try_assign(&mut self, _src: &dyn ::sovran_mapper::Mappable) -> bool {
                false
            }

            fn apply_any(
                &mut self,
                value: ::std::boxed::Box<dyn ::core::any::Any + Send>,
            ) -> ::core::result::Result<(), ::std::boxed::Box<dyn ::core::any::Any + Send>> {
                ::sovran_mapper::__private::apply_same(self, value)
            }

            fn new_empty(&self) -> ::std::boxed::Box<dyn ::sovran_mapper::Mappable> {
                ::std::boxed::Box::new(<Self as ::core::default::Default>::default())
            }
        }

        impl ::sovran_mapper::StructAccess for #struct_name {
            fn field(&self, name: &str) -> ::core::option::Option<&dyn ::sovran_mapper::Mappable> {
                match name {
                    #(#field_names => ::core::option::Option::Some(
                        &self.#field_idents as &dyn ::sovran_mapper::Mappable
                    ),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_mut(
                &mut self,
                name: &str,
            ) -> ::core::option::Option<&mut dyn ::sovran_mapper::Mappable> {
                match name {
                    #(#field_names => ::core::option::Option::Some(
                        &mut self.#field_idents as &mut dyn ::sovran_mapper::Mappable
                    ),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn call_method(
                &self,
                name: &str,
            ) -> ::core::option::Option<::std::boxed::Box<dyn ::sovran_mapper::Mappable>> {
                match name {
                    #(#method_names => ::core::option::Option::Some(
                        ::std::boxed::Box::new(self.#method_idents())
                            as ::std::boxed::Box<dyn ::sovran_mapper::Mappable>
                    ),)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}
