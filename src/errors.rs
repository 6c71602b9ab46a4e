/*!
 * Error types for the doctrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors that can occur during translation of a single text run
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider returned an empty translation
    #[error("Provider returned an empty translation")]
    EmptyResponse,

    /// The request did not finish within the configured deadline
    #[error("Translation request timed out after {seconds}s")]
    Timeout {
        /// Deadline that was exceeded, in seconds
        seconds: u64
    },

    /// The requested language pair is not supported
    #[error("Unsupported language pair: {src_lang} -> {target}")]
    UnsupportedLanguagePair {
        /// Source language code
        src_lang: String,
        /// Target language code
        target: String,
    },
}

/// Errors that can occur while reading or writing a packaged document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// I/O error while accessing the document
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a readable ZIP archive
    #[error("ZIP archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The document body XML could not be parsed
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A required archive entry is absent
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// The document structure is not what the format requires
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    /// Serializing or writing the output archive failed
    #[error("Failed to write document: {0}")]
    Write(String),
}

/// Errors related to translation job records
#[derive(Error, Debug)]
pub enum JobError {
    /// No job exists with the given identifier
    #[error("Job not found: {0}")]
    NotFound(String),

    /// The requested status change is not a legal transition
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from document processing
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error from job bookkeeping
    #[error("Job error: {0}")]
    Job(#[from] JobError),

    /// Processing was cancelled before completion
    #[error("Job was cancelled")]
    Cancelled,

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
