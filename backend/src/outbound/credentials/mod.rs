//! Session credential codecs.

mod jwt_codec;

pub use jwt_codec::JwtCredentialCodec;
