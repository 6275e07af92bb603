//! Familiar Schema Coder
//!
//! Tags serialized records with a compact schema reference resolved through a
//! shared schema registry, and resolves that reference back on read.
//!
//! ## Wire format
//!
//! ```text
//! +------+----------------------+-----------------
//! | 0x00 | schema id (i32, BE)  | payload body ...
//! +------+----------------------+-----------------
//!   1 B          4 B
//! ```
//!
//! ## Architecture
//!
//! - **Wire codec** ([`wire`]): the 5-byte prefix
//! - **Registration policy** ([`policy`]): register or look up on write
//! - **Registry gateway** ([`gateway`]): the capability required from a
//!   registry client, with in-memory, file-backed and caching implementations
//! - **Coder** ([`coder`]): ties the three together per write and read
//!
//! ```ignore
//! use familiar_schema_coder::{InMemoryRegistry, RegistrySchemaCoder, SchemaCoder, Subject};
//!
//! let registry = InMemoryRegistry::<apache_avro::Schema>::new();
//! let coder = RegistrySchemaCoder::with_subject(Subject::new("orders-value")?, &registry);
//!
//! let mut out = Vec::new();
//! coder.write_schema(&schema, &mut out)?;
//! // ... append the payload body ...
//! let resolved = coder.read_schema(&mut out.as_slice())?;
//! ```

pub mod cache;
pub mod coder;
pub mod config;
pub mod error;
pub mod file;
pub mod fingerprint;
pub mod gateway;
pub mod memory;
pub mod policy;
pub mod schema;
pub mod subject;
pub mod wire;

pub use cache::{CacheStats, CachedRegistry};
pub use coder::{RegistrySchemaCoder, SchemaCoder};
pub use config::CoderSettings;
pub use error::{CoderError, RegistryError, RegistryOperation, Result};
pub use file::FileRegistry;
pub use fingerprint::Fingerprint;
pub use gateway::RegistryGateway;
pub use memory::{InMemoryRegistry, Registration};
pub use policy::{should_auto_register, RegistryConfig, WriteMode, AUTO_REGISTER_SCHEMAS};
pub use schema::RegistrySchema;
pub use subject::{Subject, SubjectNameStrategy};
pub use wire::{
    decode_prefix, encode_prefix, split_prefix, write_prefix, SchemaId, MAGIC_BYTE, PREFIX_LEN,
};
