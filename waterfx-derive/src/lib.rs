//! Derive macros for the waterfx particle effects crate.
//!
//! This crate provides one derive macro:
//!
//! - [`Attributes`] - Describes a per-particle vertex record as named channels
//!
//! # Usage
//!
//! The macro is re-exported from the main `waterfx` crate. You don't need
//! to add this crate directly:
//!
//! ```ignore
//! use waterfx::prelude::*;
//!
//! #[repr(C)]
//! #[derive(Clone, Copy, Default, Pod, Zeroable, Attributes)]
//! struct SplashVertex {
//!     position: Vec3,
//!     scale: f32,
//!     broken: f32,
//! }
//!
//! buffer.mark_dirty(SplashVertex::POSITION | SplashVertex::BROKEN);
//! ```
//!
//! # Channel Layout
//!
//! Every named field becomes one channel. The channel name is the field
//! name, the byte offset comes from `core::mem::offset_of!`, and the bit in
//! the dirty mask follows declaration order. The struct must be `#[repr(C)]`
//! so that offsets are stable for the renderer.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Ident, Type};

/// Maximum channels per record; one bit each in a `ChannelMask(u32)`.
const MAX_CHANNELS: usize = 32;

/// Derive macro for per-particle attribute records.
///
/// # Generated Items
///
/// For a struct `DropletVertex` with fields `position: Vec3` and `scale: f32`:
///
/// - `impl waterfx::Attributes for DropletVertex` with a `CHANNELS` table
/// - `DropletVertex::POSITION` and `DropletVertex::SCALE` channel masks
/// - `DropletVertex::ALL` covering every channel
///
/// # Supported Field Types
///
/// `f32`, `u32`, `Vec2`, `Vec3`, `Vec4` and `Quat` (bare or `glam::`-qualified).
///
/// # Panics
///
/// The macro panics at compile time if:
/// - Applied to an enum or a tuple struct
/// - The struct is not `#[repr(C)]`
/// - A field has an unsupported type
/// - The struct has more than 32 fields
#[proc_macro_derive(Attributes)]
pub fn derive_attributes(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let is_repr_c = input.attrs.iter().any(|attr| {
        attr.path().is_ident("repr")
            && attr
                .parse_nested_meta(|meta| {
                    if meta.path.is_ident("C") {
                        Ok(())
                    } else {
                        Err(meta.error("not C"))
                    }
                })
                .is_ok()
    });
    if !is_repr_c {
        panic!("Attributes derive requires #[repr(C)] on '{}'", name);
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => panic!("Attributes derive only supports structs with named fields"),
        },
        _ => panic!("Attributes derive only supports structs"),
    };

    if fields.len() > MAX_CHANNELS {
        panic!(
            "Attributes derive supports at most {} fields, '{}' has {}",
            MAX_CHANNELS,
            name,
            fields.len()
        );
    }

    let mut channel_entries = Vec::new();
    let mut mask_consts = Vec::new();

    for (bit, field) in fields.iter().enumerate() {
        let field_name = field.ident.as_ref().unwrap();
        let field_name_str = field_name.to_string();
        let format = channel_format(&field.ty);
        let bit = bit as u32;

        channel_entries.push(quote! {
            waterfx::Channel {
                name: #field_name_str,
                format: #format,
                offset: ::core::mem::offset_of!(#name, #field_name) as u32,
                mask: waterfx::ChannelMask::bit(#bit),
            }
        });

        let const_name = Ident::new(&field_name_str.to_uppercase(), Span::call_site());
        let doc = format!("Dirty mask for the `{}` channel.", field_name_str);
        mask_consts.push(quote! {
            #[doc = #doc]
            pub const #const_name: waterfx::ChannelMask = waterfx::ChannelMask::bit(#bit);
        });
    }

    let channel_count = fields.len() as u32;

    let expanded = quote! {
        impl waterfx::Attributes for #name {
            const CHANNELS: &'static [waterfx::Channel] = &[
                #(#channel_entries),*
            ];
        }

        impl #name {
            #(#mask_consts)*

            /// Mask covering every channel of this record.
            pub const ALL: waterfx::ChannelMask = waterfx::ChannelMask::first(#channel_count);
        }
    };

    TokenStream::from(expanded)
}

/// Map a field type to its `waterfx::ChannelFormat` variant.
fn channel_format(ty: &Type) -> proc_macro2::TokenStream {
    let type_str = quote!(#ty).to_string().replace(' ', "");

    match type_str.as_str() {
        "f32" => quote! { waterfx::ChannelFormat::Float32 },
        "u32" => quote! { waterfx::ChannelFormat::Uint32 },
        "Vec2" | "glam::Vec2" => quote! { waterfx::ChannelFormat::Float32x2 },
        "Vec3" | "glam::Vec3" => quote! { waterfx::ChannelFormat::Float32x3 },
        "Vec4" | "glam::Vec4" | "Quat" | "glam::Quat" => quote! { waterfx::ChannelFormat::Float32x4 },
        _ => panic!("Unsupported type in Attributes struct: {}", type_str),
    }
}
