use thiserror::Error;

use crate::{ObjectId, Transform};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("buffer length {len} is not a multiple of the {record} byte record size")]
    MisalignedBuffer { len: usize, record: usize },
    #[error("record index {index} out of bounds for {count} records")]
    RecordOutOfBounds { index: usize, count: usize },
    #[error("{0} not found")]
    ObjectNotFound(ObjectId),
    #[error("{id} range {start}..{end} does not match its {expected} merged splats")]
    StaleObjectRange {
        id: ObjectId,
        start: usize,
        end: usize,
        expected: usize,
    },
    #[error("invalid transform {0:?}")]
    InvalidTransform(Transform),
    #[error("{0}")]
    RenderTarget(#[from] RenderTargetError),
    #[error("vertex count not found in PLY header")]
    PlyVertexCountNotFound,
    #[error("{0}")]
    PlyVertexCountParseFailed(#[from] std::num::ParseIntError),
    #[error("{0}")]
    PlyValueParseFailed(#[from] std::num::ParseFloatError),
    #[error("not a PLY file")]
    NotPly,
    #[error("PLY header not found")]
    PlyHeaderNotFound,
    #[error("unsupported PLY format {0}")]
    PlyUnsupportedFormat(String),
    #[error("unsupported PLY property type {0}")]
    PlyUnsupportedProperty(String),
    #[error("PLY vertex {0} is missing values")]
    PlyValueMissing(usize),
}

/// The error returned by a [`RenderTarget`](crate::RenderTarget) that rejected a buffer.
#[derive(Debug, Error)]
#[error("render target rejected buffer: {reason}")]
pub struct RenderTargetError {
    pub reason: String,
}

impl RenderTargetError {
    /// Create a new render target error.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
