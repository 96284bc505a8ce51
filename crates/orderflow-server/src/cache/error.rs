//! Errores del cache LRU.

use thiserror::Error;

use super::recency_list::NodeId;

/// Errores de la lista de recencia.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    /// Indice fuera de `[0, len)` (o `[0, len]` para insert).
    #[error("index {index} out of range for list of length {len}")]
    InvalidIndex { index: usize, len: usize },

    /// El nodo ya fue removido.
    #[error("node {0:?} is no longer in the list")]
    StaleNode(NodeId),
}

/// Errores del cache acotado.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache capacity must be at least 1")]
    ZeroCapacity,

    #[error("recency list error: {0}")]
    List(#[from] ListError),

    /// El mapa de entries y la lista no coinciden.
    #[error("cache bookkeeping corrupted: {0}")]
    Corrupted(String),
}
