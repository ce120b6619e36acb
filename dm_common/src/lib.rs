mod cents;
mod secret;

pub mod helpers;

pub use cents::Cents;
pub use secret::Secret;
