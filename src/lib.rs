/*!
 * # doctrans - AI-powered Word document translation
 *
 * A Rust library for translating Word documents using AI, while tracking
 * job status and progress in a persisted record a client can poll.
 *
 * ## Features
 *
 * - Extract text runs from DOCX packages via namespace-qualified XML traversal
 * - Translate each run with an LLM provider (Anthropic API, or a mock for tests)
 * - Rewrite the document in place: every non-body part is preserved byte-for-byte
 * - Per-node progress reporting while a document is being processed
 * - Job records persisted in SQLite, queryable for status polling and history
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document_processor`: DOCX package handling and text-run manipulation
 * - `translation`: AI-powered translation client:
 *   - `translation::client`: The translation client and the `Translator` seam
 *   - `translation::prompts`: Prompt templates for document translation
 * - `worker`: The per-job processing loop and its status-event channel
 * - `database`: Job record persistence (SQLite)
 * - `file_utils`: File system operations and scratch-area management
 * - `language_utils`: Supported-language table and pair validation
 * - `providers`: Client implementations for LLM providers:
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::mock`: Deterministic in-memory provider
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod database;
pub mod document_processor;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;
pub mod worker;

// Re-export main types for easier usage
pub use app_config::Config;
pub use database::{JobRecord, JobStatus, Repository};
pub use document_processor::{DocumentTree, DocxPackage};
pub use errors::{AppError, DocumentError, ProviderError, TranslationError};
pub use translation::{TranslationClient, TranslationRequest, Translator};
pub use worker::{JobEvent, JobHandle, JobWorker};
