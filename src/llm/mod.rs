/*!
 * Structured LLM invocation.
 *
 * - `template`: prompt templates with named placeholders
 * - `gateway`: one prompt exchange against a provider, with cost and tokens
 * - `structured`: lenient JSON extraction and schema validation of replies
 * - `usage`: cost/token values and the caller-owned running total
 */

pub mod gateway;
pub mod structured;
pub mod template;
pub mod usage;

pub use gateway::{Exchange, Gateway, ModelSettings};
pub use structured::{ReplySchema, SchemaViolation, StructuredReply, parse_structured_reply};
pub use template::{PromptTemplate, PromptVars};
pub use usage::{CostTracker, Usage};
