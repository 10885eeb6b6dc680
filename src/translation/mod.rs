/*!
 * Translation of free text through a language model.
 *
 * - `pipeline`: text mode and sentence-aligned table mode
 * - `prompts`: system/human templates and per-pair exemplars
 * - `result`: typed results and stable failure codes
 */

pub mod pipeline;
pub mod prompts;
pub mod result;

pub use pipeline::{Translator, check_request};
pub use prompts::OutputFormat;
pub use result::{ErrorKind, ResultError, TranslationResult};
