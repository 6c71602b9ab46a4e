/*!
 * Translation service for document text using AI providers.
 *
 * This module contains the client-side translation functionality:
 *
 * - `client`: The translation client and the `Translator` seam the
 *   processing loop depends on
 * - `prompts`: Prompt templates and builders for document translation
 */

// Re-export main types for easier usage
pub use self::client::{TranslationClient, TranslationRequest, Translator};
pub use self::prompts::PromptTemplate;

// Submodules
pub mod client;
pub mod prompts;
