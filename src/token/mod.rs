//! Token tickets: claims, their encoding and the builder.

pub mod builder;
pub mod claims;
pub mod serializer;

pub use builder::TokenTicketBuilder;
pub use claims::Claims;
pub use serializer::ClaimsSerializer;
