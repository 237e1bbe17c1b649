//! Estate plan import
//!
//! Turns an answer-file export into a persisted estate plan in two steps:
//!
//! 1. [`ImportPipeline::parse`]: field extraction, person extraction and
//!    registry matching, a normalized preview, and a cached session
//! 2. [`ImportPipeline::commit`]: per-person decisions applied by the
//!    [`DomainTransformer`], every entity validated and written in dependency
//!    order, role failures collected rather than fatal
//!
//! # Example
//!
//! ```rust,ignore
//! use estate_import::{create_all, ImportConfig, ImportPipeline};
//! use estate_model::MemoryStore;
//! use std::sync::Arc;
//!
//! let pipeline = ImportPipeline::new(Arc::new(MemoryStore::new()), ImportConfig::default());
//! let parsed = pipeline.parse(&markup).await?;
//!
//! let (_, extraction) = pipeline.extract(&markup)?;
//! let result = pipeline.commit(&parsed.session_id, &create_all(&extraction)).await?;
//! println!("plan {} with {} roles", result.plan_id, result.roles_created);
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod fields;
pub mod pipeline;
pub mod preview;
pub mod session;
pub mod transform;

pub use config::{ConfigError, ImportConfig};
pub use error::{ImportError, PartialImport, RoleCreationError, SessionError, TransformError};
pub use extract::{extract_people, Extraction};
pub use pipeline::{accept_top_matches, create_all, ImportPipeline, ImportResult, ParseResult};
pub use preview::ImportPreview;
pub use session::{ImportSession, MokaSessionCache, SessionCache};
pub use transform::{dedup_roles, DomainTransformer, PersonDecision, PersonLookup, TransformOutput};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
