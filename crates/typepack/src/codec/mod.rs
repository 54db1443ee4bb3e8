//! The MessagePack byte codec: marker constants, the forward-only
//! [`Packer`], and the pull-style [`Unpacker`].

pub mod constants;
pub mod packer;
pub mod unpacker;

pub use packer::{Packer, PackerCompat};
pub use unpacker::{SubtreeUnpacker, Token, Unpacker};
