pub mod asset;
pub mod fit;

pub use asset::{MediaAsset, MediaKind};
pub use fit::fit;
