//! Derive macros for [dualshade].
//!
//! `#[derive(UniformBlock)]` turns a plain Rust struct into a uniform block description: a struct definition listing
//! its fields in declaration order, and a `<Name>Fields` struct holding one typed expression per field.
//!
//! Fields must be of types usable in shaders (scalars, vectors, matrices and arrays of those). Fields which are
//! themselves uniform blocks, or arrays of uniform blocks, are marked with `#[uniform(nested)]`.
//!
//! [dualshade]: https://crates.io/crates/dualshade

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::{
  parse_macro_input, spanned::Spanned, Data, DeriveInput, Expr, Field, Fields, Ident, Meta, NestedMeta, Type,
};

/// How a field maps to the struct definition.
#[derive(Debug)]
enum FieldKind<'a> {
  /// A value type.
  Value(&'a Type),

  /// A nested uniform block.
  Nested(&'a Type),

  /// An array of nested uniform blocks.
  NestedArray(&'a Type, &'a Expr),
}

#[derive(Debug)]
struct BlockField<'a> {
  ident: &'a Ident,
  kind: FieldKind<'a>,
}

impl<'a> BlockField<'a> {
  fn new(field: &'a Field) -> Result<Self, syn::Error> {
    let ident = field
      .ident
      .as_ref()
      .ok_or_else(|| syn::Error::new(field.span(), "uniform block fields must be named"))?;

    let kind = if is_nested(field)? {
      match &field.ty {
        Type::Array(array) => FieldKind::NestedArray(&array.elem, &array.len),
        ty => FieldKind::Nested(ty),
      }
    } else {
      FieldKind::Value(&field.ty)
    };

    Ok(BlockField { ident, kind })
  }

  /// Builder call adding the field to the struct definition.
  fn def(&self) -> proc_macro2::TokenStream {
    let name = self.ident.to_string();

    match self.kind {
      FieldKind::Value(ty) => quote! {
        .field::<#ty>(#name)
      },

      FieldKind::Nested(ty) => quote! {
        .nested(#name, <#ty as ::dualshade::structs::UniformBlock>::struct_def())
      },

      FieldKind::NestedArray(ty, len) => quote! {
        .nested_array(#name, <#ty as ::dualshade::structs::UniformBlock>::struct_def(), #len)
      },
    }
  }

  /// Declaration of the accessor in the fields struct.
  fn accessor_decl(&self) -> proc_macro2::TokenStream {
    let ident = self.ident;

    match self.kind {
      FieldKind::Value(ty) => quote! {
        pub #ident: ::dualshade::expr::Expr<#ty>
      },

      FieldKind::Nested(ty) => quote! {
        pub #ident: <#ty as ::dualshade::structs::UniformBlock>::Fields
      },

      FieldKind::NestedArray(ty, _) => quote! {
        pub #ident: ::dualshade::structs::StructArrayFields<#ty>
      },
    }
  }

  /// Initialization of the accessor from the `object` expression.
  fn accessor_init(&self) -> proc_macro2::TokenStream {
    let ident = self.ident;
    let name = ident.to_string();

    match self.kind {
      FieldKind::Value(_) => quote! {
        #ident: ::dualshade::structs::field(&object, #name)
      },

      FieldKind::Nested(ty) => quote! {
        #ident: <#ty as ::dualshade::structs::UniformBlock>::fields(
          ::dualshade::structs::field_expr(&object, #name)
        )
      },

      FieldKind::NestedArray(..) => quote! {
        #ident: ::dualshade::structs::StructArrayFields::new(
          ::dualshade::structs::field_expr(&object, #name)
        )
      },
    }
  }
}

/// Whether the field carries `#[uniform(nested)]`.
fn is_nested(field: &Field) -> Result<bool, syn::Error> {
  let mut nested = false;

  for attr in field.attrs.iter().filter(|attr| attr.path.is_ident("uniform")) {
    match attr.parse_meta()? {
      Meta::List(list) => {
        for item in list.nested {
          match item {
            NestedMeta::Meta(Meta::Path(path)) if path.is_ident("nested") => nested = true,
            item => {
              return Err(syn::Error::new(
                item.span(),
                "unknown uniform attribute; expected `nested`",
              ))
            }
          }
        }
      }

      meta => {
        return Err(syn::Error::new(
          meta.span(),
          "expected #[uniform(nested)]",
        ))
      }
    }
  }

  Ok(nested)
}

fn derive_uniform_block(input: &DeriveInput) -> Result<proc_macro2::TokenStream, syn::Error> {
  if !input.generics.params.is_empty() {
    return Err(syn::Error::new(
      input.generics.span(),
      "uniform blocks cannot be generic",
    ));
  }

  let fields = match &input.data {
    Data::Struct(data) => match &data.fields {
      Fields::Named(fields) => &fields.named,
      _ => {
        return Err(syn::Error::new(
          input.ident.span(),
          "uniform blocks must have named fields",
        ))
      }
    },

    _ => {
      return Err(syn::Error::new(
        Span::call_site(),
        "uniform blocks must be structs",
      ))
    }
  };

  let fields = fields
    .iter()
    .map(BlockField::new)
    .collect::<Result<Vec<_>, _>>()?;

  let vis = &input.vis;
  let ident = &input.ident;
  let name = ident.to_string();
  let fields_ident = format_ident!("{}Fields", ident);
  let fields_doc = format!("Typed field accessors of [`{}`].", ident);

  let defs = fields.iter().map(BlockField::def);
  let accessor_decls = fields.iter().map(BlockField::accessor_decl);
  let accessor_inits = fields.iter().map(BlockField::accessor_init);

  Ok(quote! {
    #[doc = #fields_doc]
    #vis struct #fields_ident {
      #(#accessor_decls),*
    }

    impl ::dualshade::structs::UniformBlock for #ident {
      type Fields = #fields_ident;

      fn struct_def() -> ::dualshade::structs::StructDef {
        ::dualshade::structs::StructDef::new(#name)
          #(#defs)*
      }

      fn fields(object: ::dualshade::expr::ErasedExpr) -> Self::Fields {
        #fields_ident {
          #(#accessor_inits),*
        }
      }
    }
  })
}

/// Derive [`UniformBlock`](https://docs.rs/dualshade/latest/dualshade/structs/trait.UniformBlock.html).
#[proc_macro_derive(UniformBlock, attributes(uniform))]
pub fn uniform_block(tokens: TokenStream) -> TokenStream {
  let input = parse_macro_input!(tokens as DeriveInput);

  derive_uniform_block(&input)
    .unwrap_or_else(|e| e.to_compile_error())
    .into()
}
