//! NBT, SNBT, and MCA region codec for Minecraft world data.
//!
//! The core types are [`tag::Node`]/[`tag::Payload`] (the tree), [`decode`]
//! and [`encode`] (the binary codec), [`snbt`] (the textual rendering), and
//! [`mca`] (the region-file container). See each module for details.

pub mod compress;
pub mod cursor;
pub mod decode;
pub mod encode;
pub mod error;
pub mod kind;
pub mod mca;
pub mod navigate;
pub mod snbt;
pub mod tag;

pub use compress::Framing;
pub use decode::parse;
pub use encode::{pack, pack_into};
pub use error::{Error, ErrorKind, Result};
pub use kind::Kind;
pub use mca::{Mca, TimestampPolicy};
pub use navigate::{get_child, get_child_deep};
pub use snbt::{to_snbt, to_snbt_into, SnbtOptions};
pub use tag::{Node, Payload};
