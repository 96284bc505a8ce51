use serde::Deserialize;

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 1000;

/// Query parameters para GET /orders.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LimitQuery {
    pub limit: usize,
}

impl Default for LimitQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
        }
    }
}

impl LimitQuery {
    /// Limite acotado a [`MAX_LIMIT`].
    pub fn clamped(&self) -> usize {
        self.limit.min(MAX_LIMIT)
    }
}
