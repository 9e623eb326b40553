//! Strongbox - an encrypted credential manager with its own container format.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── init          # Create a new database
//! │   ├── add/get/show  # Entry CRUD and display
//! │   ├── edit          # Field edits, password changes, removal
//! │   ├── group         # Group management
//! │   ├── compare       # Conflict report across divergent copies
//! │   └── completions   # Shell completions
//! └── core/             # Core engine
//!     ├── crypto        # Argon2id key derivation + ChaCha20-Poly1305 AEAD
//!     ├── codec         # Authenticated container encode/decode
//!     ├── store/        # In-memory group/entry tree and queries
//!     ├── conflict      # Divergence detection between store copies
//!     ├── session       # Open → mutate → atomic save lifecycle
//!     ├── cache         # Encrypted password cache sidecar
//!     └── config        # Database location and profile resolution
//! ```
//!
//! # Features
//!
//! - Password (and optional keyfile) protected storage
//! - Authenticated encryption: any tampering fails decryption outright
//! - Atomic saves after every mutation
//! - Conflict detection across independently-modified copies

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::session::Session;
pub use crate::core::store::Store;
