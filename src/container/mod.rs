//! Template container handling

pub mod codec;

pub use codec::{decode, encode};
