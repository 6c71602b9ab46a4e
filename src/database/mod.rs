/*!
 * Job persistence layer.
 *
 * Translation jobs are tracked in a SQLite database so a polling client can
 * observe status and progress while a document is being processed, and list
 * past jobs after the fact.
 */

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

pub use connection::DatabaseConnection;
pub use models::{JobHistoryEntry, JobRecord, JobStatus, JobStatusView, JobUpdate};
pub use repository::Repository;
