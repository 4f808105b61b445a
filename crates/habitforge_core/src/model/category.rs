//! Category read model. Categories are managed elsewhere; the core only
//! reads and echoes them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CategoryId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    /// Hex color such as `#4CAF50`.
    pub color: Option<String>,
    pub icon: Option<String>,
}
