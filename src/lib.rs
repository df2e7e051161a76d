pub mod codec;
pub mod export;
pub mod item;

pub use codec::{decode, encode, CodecError};
pub use item::{Item, ItemDatabase};
