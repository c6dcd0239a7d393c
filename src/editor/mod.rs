pub mod debounce;
pub mod session;

pub use session::{CAPTION_DEBOUNCE, Editor};
