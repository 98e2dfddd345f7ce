pub mod error;
pub mod openai;
pub mod util;

pub use error::{AiError, Result};
pub use openai::{ImageRequest, OpenAi};
pub use util::strip_code_blocks;
