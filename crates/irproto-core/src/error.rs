//! Error types for the irproto-core library.
//!
//! Only two things can stop a compilation run: the filesystem refusing a
//! directory or file, and a namespace mapping that cannot be turned into a
//! safe, unique output path. Structural oddities in the IR are never errors.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for irproto operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all irproto operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to create or write an output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to create an output directory
    #[error("failed to create directory '{path}': {source}")]
    DirectoryCreate {
        /// Path to the directory that failed to create
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Two namespaces resolved to the same output path
    #[error("namespaces '{first}' and '{second}' both map to '{path}'")]
    PathCollision {
        /// The shared relative path
        path: String,
        /// Namespace that claimed the path first
        first: String,
        /// Namespace that collided with it
        second: String,
    },

    /// Namespace or dump file name would produce a path escaping the output directory
    #[error("path traversal detected: '{name}' would escape output directory")]
    PathTraversal {
        /// The offending namespace full name or dump file name
        name: String,
    },
}

impl Error {
    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new directory creation error
    pub fn directory_create(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreate {
            path: path.into(),
            source,
        }
    }

    /// Creates a new path collision error
    pub fn path_collision(
        path: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::PathCollision {
            path: path.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    /// Creates a new path traversal error
    pub fn path_traversal(name: impl Into<String>) -> Self {
        Self::PathTraversal { name: name.into() }
    }

    /// Returns true if the filesystem rejected a directory or file
    pub fn is_filesystem(&self) -> bool {
        matches!(self, Self::FileWrite { .. } | Self::DirectoryCreate { .. })
    }
}
