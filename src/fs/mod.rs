pub mod atomic;
pub mod meta;
pub mod scratch;

pub use atomic::{fsync_parent_dir, write_atomic};
pub use meta::{kind_of, resolve_symlink_target, sha256_hex_of};
pub use scratch::Scratch;
