pub mod content;

pub use content::{identify, hash_file, ContentId, DISPLAY_HASH_LENGTH};
