pub mod logging;
pub mod markup;
pub mod retry;

pub use markup::{normalize, normalize_text, resolve_image_url, Normalized};
pub use retry::RetryPolicy;
