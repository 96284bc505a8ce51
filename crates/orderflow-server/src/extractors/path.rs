use serde::Deserialize;

/// Longitud maxima aceptada para un order_uid.
pub const MAX_ORDER_UID_LEN: usize = 128;

/// Extractor para rutas /order/{id}
#[derive(Debug, Deserialize)]
pub struct OrderPath {
    pub id: String,
}

impl OrderPath {
    /// Valida el id y lo retorna sin espacios.
    pub fn validate(&self) -> Result<&str, String> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err("Order id cannot be empty".to_string());
        }
        if id.len() > MAX_ORDER_UID_LEN {
            return Err(format!(
                "Order id cannot be longer than {} characters",
                MAX_ORDER_UID_LEN
            ));
        }
        if id.chars().any(|c| c.is_control()) {
            return Err("Order id cannot contain control characters".to_string());
        }
        Ok(id)
    }
}
