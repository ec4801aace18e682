//! 描画履歴レコードの DTO
//!
//! 永続化レイアウトと、参加時に返す `history[]` の要素は同じ形をしています。
//!
//! ```text
//! { "type": "stroke" | "clear",
//!   "data": { "color"?, "width"?, "points"?, "timestamp" },
//!   "userId": "..." }
//! ```

use serde::{Deserialize, Serialize};

pub use crate::domain::DrawingKind;
use crate::domain::Point;

/// `data` フィールド
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingDataRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    pub timestamp: i64,
}

/// 描画履歴 1 件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingCommandRecord {
    #[serde(rename = "type")]
    pub kind: DrawingKind,
    pub data: DrawingDataRecord,
    pub user_id: String,
}
