use proc_macro::TokenStream;
use proc_macro2::{Ident, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, Meta};

/// Derive a struct-of-vectors timeseries for a per-timestep flux record.
///
/// Every field of the source struct must be `f64`. The generated
/// `{StructName}Timeseries` holds one `Vec<f64>` per field and offers
/// `with_capacity`, `push`, `len`, `is_empty`, `drain_front` (drops leading
/// steps, e.g. a warm-up period) and `field` (lookup of a column by name).
/// `field_names()` is added to the source struct.
///
/// `#[fluxes(timeseries_name = "CustomName")]` overrides the generated name.
#[proc_macro_derive(Fluxes, attributes(fluxes))]
pub fn derive_fluxes(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let ts_name =
        timeseries_name(input)?.unwrap_or_else(|| format_ident!("{}Timeseries", name));

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Fluxes can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Fluxes can only be derived for structs",
            ))
        }
    };

    let mut idents: Vec<&Ident> = Vec::with_capacity(fields.len());
    for field in fields {
        if !is_f64(&field.ty) {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "Fluxes derive: all fields must be f64",
            ));
        }
        if let Some(ident) = field.ident.as_ref() {
            idents.push(ident);
        }
    }
    let Some(first) = idents.first().copied() else {
        return Err(syn::Error::new_spanned(
            name,
            "Fluxes struct must have at least one field",
        ));
    };
    let names: Vec<String> = idents.iter().map(|i| i.to_string()).collect();

    Ok(quote! {
        /// Per-field timeseries collected from successive flux records.
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct #ts_name {
            #(pub #idents: Vec<f64>,)*
        }

        impl #ts_name {
            /// Pre-allocate all vectors for `n` timesteps.
            pub fn with_capacity(n: usize) -> Self {
                Self {
                    #(#idents: Vec::with_capacity(n),)*
                }
            }

            /// Append one timestep.
            pub fn push(&mut self, f: &#name) {
                #(self.#idents.push(f.#idents);)*
            }

            /// Number of timesteps stored.
            pub fn len(&self) -> usize {
                self.#first.len()
            }

            /// Returns `true` if no timesteps have been stored.
            pub fn is_empty(&self) -> bool {
                self.#first.is_empty()
            }

            /// Drop the first `n` timesteps (all of them if `n >= len`).
            pub fn drain_front(&mut self, n: usize) {
                let n = n.min(self.len());
                #(self.#idents.drain(..n);)*
            }

            /// Column of values for the field called `name`.
            pub fn field(&self, name: &str) -> Option<&[f64]> {
                match name {
                    #(#names => Some(self.#idents.as_slice()),)*
                    _ => None,
                }
            }
        }

        impl #name {
            /// Field names, in declaration order.
            pub fn field_names() -> &'static [&'static str] {
                &[#(#names),*]
            }
        }
    })
}

fn timeseries_name(input: &DeriveInput) -> syn::Result<Option<Ident>> {
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("fluxes")) {
        let nested = attr.parse_args_with(
            syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated,
        )?;
        for meta in nested {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("timeseries_name") => {
                    if let syn::Expr::Lit(syn::ExprLit {
                        lit: Lit::Str(s), ..
                    }) = &nv.value
                    {
                        return Ok(Some(format_ident!("{}", s.value())));
                    }
                    return Err(syn::Error::new_spanned(
                        &nv.value,
                        "timeseries_name expects a string literal",
                    ));
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "unknown fluxes attribute, expected `timeseries_name = \"...\"`",
                    ))
                }
            }
        }
    }
    Ok(None)
}

fn is_f64(ty: &syn::Type) -> bool {
    matches!(ty, syn::Type::Path(p) if p.path.is_ident("f64"))
}
