//! `define_port_error!` declares the error enum a driven port returns.
//!
//! Each variant gets a snake_case constructor taking `impl Into` arguments.
//! An optional trailing `unavailable: [..];` list names the variants that mean
//! the backing store could not be reached; `is_unavailable` reports them so
//! services can answer 503 instead of 500.
//!
//! ```ignore
//! define_port_error! {
//!     pub enum OfferStoreError {
//!         Connection { message: String } => "offer store unreachable: {message}",
//!         Query { message: String } => "offer store query failed: {message}",
//!     }
//!     unavailable: [Connection];
//! }
//! ```

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* }) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
        $( unavailable: [ $($unavailable:ident),* $(,)? ]; )?
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*

            /// Whether the store behind the port could not be reached.
            pub fn is_unavailable(&self) -> bool {
                match self {
                    $( $( Self::$unavailable { .. } => true, )* )?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }
    };
}

pub(crate) use define_port_error;
