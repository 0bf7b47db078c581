//! didyoumean - fuzzy "did you mean" search over a MongoDB collection.
//!
//! Queries are matched as case-insensitive patterns against a chosen set of
//! fields and returned a page at a time. Collections are maintained through
//! batch upserts keyed on each document's `id`.
//!
//! # Quick start
//!
//! ```no_run
//! use didyoumean::{
//!     CallContext, Document, DocumentStore, ManagerConfig, MongoStore,
//!     Pagination, Verifier,
//! };
//!
//! # async fn run() -> didyoumean::Result<()> {
//! let verifier = Verifier::new();
//! let cfg = ManagerConfig::load("config.yaml".as_ref(), &verifier)?;
//! let ctx = CallContext::background();
//! let store = MongoStore::connect(&ctx, &cfg.mongo, &verifier).await?;
//!
//! let mut page = Pagination::new(1, 10);
//! let docs: Vec<Document> = store
//!     .find(&ctx, "movies", &["title", "keywords"], "batman", &mut page)
//!     .await?;
//! for doc in &docs {
//!     println!("{} {}", doc.id, doc.title);
//! }
//! println!("{} match(es)", page.total_documents);
//!
//! store.close(&ctx).await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod store;
pub mod verifier;

pub use config::{ManagerConfig, MongoConfig};
pub use context::CallContext;
pub use document::{Document, Pagination};
pub use error::{Error, Result};
pub use store::{
    BatchResult,
    DocumentStore,
    IndexDirection,
    IndexSpec,
    MemoryStore,
    MockStore,
    MongoStore,
};
pub use verifier::{Validate, Verifier, VerifyError};
