//! Function loader for precompiled chunks
//!
//! A chunk stream is either a precompiled artifact (signature followed by a
//! marshaled container) or source text. The loader sniffs the signature,
//! decodes artifacts into a prototype tree and binds the tree into a
//! closure. Source text is handed back untouched for the host's parser.
//!
//! # Example
//!
//! ```
//! use bytecode_system::{dump, FunctionProto, PeekReader};
//! use core_types::{State, Table};
//! use loader::Loader;
//!
//! let mut artifact = Vec::new();
//! dump(&FunctionProto::new("main"), &mut artifact).unwrap();
//!
//! let state = State::new();
//! let env = Table::new();
//! let mut reader = PeekReader::new(&artifact[..]);
//! let closure = Loader::new()
//!     .try_load_precompiled(&state, &mut reader, &env)
//!     .unwrap();
//! assert!(closure.is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

pub use error::{LoadError, LoadResult};

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::rc::Rc;

use bytecode_system::{peek_signature, unmarshal, PeekReader};
use core_types::{State, Table, Value};
use tracing::{debug, trace};

/// Default cap on the payload read after the signature (64 MiB)
pub const DEFAULT_MAX_ARTIFACT_SIZE: u64 = 64 * 1024 * 1024;

/// Outcome of [`Loader::load`]
#[derive(Debug)]
pub enum Chunk<R> {
    /// A decoded artifact bound into a closure
    Precompiled(Value),
    /// Source text; the reader still yields every original byte
    Source(PeekReader<R>),
}

impl<R> Chunk<R> {
    /// Whether the chunk was a precompiled artifact
    pub fn is_precompiled(&self) -> bool {
        matches!(self, Chunk::Precompiled(_))
    }
}

/// Loads precompiled chunks
#[derive(Debug, Clone)]
pub struct Loader {
    max_artifact_size: u64,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    /// Create a loader with default limits
    pub fn new() -> Self {
        Self {
            max_artifact_size: DEFAULT_MAX_ARTIFACT_SIZE,
        }
    }

    /// Set the maximum payload size accepted after the signature
    pub fn with_max_artifact_size(mut self, bytes: u64) -> Self {
        self.max_artifact_size = bytes;
        self
    }

    /// Configured maximum payload size
    pub fn max_artifact_size(&self) -> u64 {
        self.max_artifact_size
    }

    /// Load a precompiled chunk if the stream carries one
    ///
    /// Returns `Ok(None)` when the signature is absent; the reader then
    /// still yields the stream from its original position. On a match the
    /// rest of the stream is read, unmarshaled and decoded, and the tree is
    /// bound into a closure whose environment is `env`. Any failure after
    /// the signature rejects the whole artifact.
    pub fn try_load_precompiled<R: Read>(
        &self,
        state: &State,
        reader: &mut PeekReader<R>,
        env: &Table,
    ) -> LoadResult<Option<Value>> {
        if !peek_signature(reader) {
            trace!("no artifact signature, treating as source");
            return Ok(None);
        }

        let mut payload = Vec::new();
        reader
            .by_ref()
            .take(self.max_artifact_size.saturating_add(1))
            .read_to_end(&mut payload)?;
        if payload.len() as u64 > self.max_artifact_size {
            return Err(LoadError::TooLarge {
                limit: self.max_artifact_size,
            });
        }

        let container = unmarshal(&payload)?;
        let proto = bytecode_system::decode(&container)?;
        debug!(
            source = %proto.source_name,
            bytes = payload.len(),
            functions = proto.node_count(),
            "precompiled chunk loaded"
        );
        Ok(Some(state.new_closure(Rc::new(proto), env.clone(), 0)))
    }

    /// Load from any reader, handing source text back to the caller
    pub fn load<R: Read>(&self, state: &State, reader: R, env: &Table) -> LoadResult<Chunk<R>> {
        let mut reader = PeekReader::new(reader);
        match self.try_load_precompiled(state, &mut reader, env)? {
            Some(closure) => Ok(Chunk::Precompiled(closure)),
            None => Ok(Chunk::Source(reader)),
        }
    }

    /// Load from a file
    pub fn load_file(
        &self,
        state: &State,
        path: impl AsRef<Path>,
        env: &Table,
    ) -> LoadResult<Chunk<File>> {
        let path = path.as_ref();
        trace!(path = %path.display(), "loading chunk file");
        let file = File::open(path)?;
        self.load(state, file, env)
    }
}
