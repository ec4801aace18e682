//! 値オブジェクト
//!
//! 不変条件を生成時に検証し、検証済みの値だけがドメイン層を流れるようにします。

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// Room ID の最小長
pub const ROOM_ID_MIN_LEN: usize = 6;
/// Room ID の最大長
pub const ROOM_ID_MAX_LEN: usize = 8;

/// Room ID（`^[A-Za-z0-9]{6,8}$`）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// 文字列を検証して RoomId を作成
    ///
    /// 前後の空白は取り除いてから検証します。
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        let len = trimmed.chars().count();

        if !(ROOM_ID_MIN_LEN..=ROOM_ID_MAX_LEN).contains(&len)
            || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ValueObjectError::InvalidRoomId(value));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomId> for String {
    fn from(value: RoomId) -> Self {
        value.0
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 接続 ID（トランスポート層が接続ごとに払い出す）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyConnectionId);
        }
        Ok(Self(value))
    }

    /// 新しい接続 ID を払い出す（UUID v4）
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConnectionId> for String {
    fn from(value: ConnectionId) -> Self {
        value.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// キャンバス上の座標
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_accepts_alphanumeric_within_bounds() {
        // テスト項目: 6〜8 文字の英数字は RoomId として受け入れられる
        // given (前提条件):
        let candidates = ["Ab3dE9", "Q1W2E3", "abcdefgh", "1234567"];

        // when (操作):
        let results: Vec<_> = candidates
            .iter()
            .map(|c| RoomId::new(c.to_string()))
            .collect();

        // then (期待する結果):
        for (candidate, result) in candidates.iter().zip(results) {
            assert_eq!(result.unwrap().as_str(), *candidate);
        }
    }

    #[test]
    fn test_room_id_rejects_invalid_shapes() {
        // テスト項目: 短すぎる・長すぎる・記号を含む RoomId は拒否される
        // given (前提条件):
        let candidates = ["abc", "abcdefghi", "ab!123", "", "ab 123", "ａｂｃｄｅｆ"];

        // when (操作) / then (期待する結果):
        for candidate in candidates {
            assert_eq!(
                RoomId::new(candidate.to_string()),
                Err(ValueObjectError::InvalidRoomId(candidate.to_string())),
                "{candidate:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_room_id_trims_surrounding_whitespace() {
        // テスト項目: 前後の空白は検証前に取り除かれる
        // given (前提条件):
        let raw = "  Ab3dE9 ".to_string();

        // when (操作):
        let room_id = RoomId::new(raw).unwrap();

        // then (期待する結果):
        assert_eq!(room_id.as_str(), "Ab3dE9");
    }

    #[test]
    fn test_room_id_deserialization_is_validated() {
        // テスト項目: JSON からの復元時にも検証が行われる
        // given (前提条件):
        let valid = "\"Ab3dE9\"";
        let invalid = "\"ab!123\"";

        // when (操作):
        let valid_result: Result<RoomId, _> = serde_json::from_str(valid);
        let invalid_result: Result<RoomId, _> = serde_json::from_str(invalid);

        // then (期待する結果):
        assert_eq!(valid_result.unwrap().as_str(), "Ab3dE9");
        assert!(invalid_result.is_err());
    }

    #[test]
    fn test_connection_id_rejects_blank() {
        // テスト項目: 空の接続 ID は拒否される
        // given (前提条件):
        let blank = "   ".to_string();

        // when (操作):
        let result = ConnectionId::new(blank);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyConnectionId));
    }

    #[test]
    fn test_connection_id_generate_is_unique() {
        // テスト項目: 払い出される接続 ID は一意
        // given (前提条件):
        let first = ConnectionId::generate();

        // when (操作):
        let second = ConnectionId::generate();

        // then (期待する結果):
        assert_ne!(first, second);
        assert!(!first.as_str().is_empty());
    }
}
