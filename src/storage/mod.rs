//! NutriFlex Storage
//!
//! Persistence seam for the tracker: a key-value blob store with atomic
//! whole-value reads and writes per key.
//!
//! - **kv**: `StateKey`, the `KvStore` trait, and the memory/file backends
//! - **error**: Error types
//!
//! # Layout
//!
//! ```text
//! data_dir/
//!   nutri-flex-history.json        meals + exercises
//!   nutri-flex-water.json          live hydration record for today
//!   nutri-flex-water-history.json  date -> cups
//!   ...                            one file per StateKey
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use nutriflex::storage::{FileStore, KvStore, StateKey};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = FileStore::open("./nutriflex_data")?;
//!     store.put(StateKey::Pantry, r#"["huevo","leche"]"#)?;
//!     let pantry = store.get(StateKey::Pantry)?;
//!     println!("{:?}", pantry);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod kv;

pub use error::{StorageError, StorageResult};
pub use kv::{FileStore, KvStore, MemoryStore, StateKey};
