pub mod categories;
pub mod error;
pub mod gemini;
pub mod models;
pub mod quran_cloud;
pub mod surahs;

pub use categories::{find_category, CATEGORIES};
pub use error::ApiError;
pub use gemini::{ExplainError, ExplanationClient, KeyCheck, MAX_QUESTION_CHARS};
pub use models::*;
pub use quran_cloud::{Editions, QuranClient};
pub use surahs::{display_name, verse_count, PAGE_COUNT, SURAH_COUNT};
