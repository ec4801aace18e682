//! Room ID の払い出し
//!
//! 共有しやすい短い英数字コードを生成します。衝突の確認と再試行は呼び出し側
//! （HTTP の join エンドポイント）の責務です。

use super::{error::ValueObjectError, value_object::RoomId};

/// 生成に使うアルファベット（数字・大文字・小文字の 62 文字）
pub const ROOM_ID_ALPHABET: &str =
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// 生成する Room ID の長さ
pub const GENERATED_ROOM_ID_LEN: usize = 6;

/// Room ID ジェネレーター
///
/// プロセス起動時に一度だけ作成し、`OpenRoomUseCase` が保持します。内部状態は
/// 不変なので複数タスクから同時に `generate` を呼び出せます。
#[derive(Debug, Clone)]
pub struct RoomIdGenerator {
    alphabet: Vec<char>,
    length: usize,
}

impl RoomIdGenerator {
    pub fn new() -> Self {
        Self {
            alphabet: ROOM_ID_ALPHABET.chars().collect(),
            length: GENERATED_ROOM_ID_LEN,
        }
    }

    /// 新しい Room ID を生成
    pub fn generate(&self) -> Result<RoomId, ValueObjectError> {
        let code = nanoid::format(nanoid::rngs::default, &self.alphabet, self.length);
        RoomId::new(code)
    }
}

impl Default for RoomIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generate_produces_valid_room_id() {
        // テスト項目: 生成された ID は 6 文字の英数字
        // given (前提条件):
        let generator = RoomIdGenerator::new();

        // when (操作):
        let room_id = generator.generate().unwrap();

        // then (期待する結果):
        assert_eq!(room_id.as_str().len(), GENERATED_ROOM_ID_LEN);
        assert!(room_id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_uses_only_alphabet() {
        // テスト項目: 生成された文字はすべてアルファベットに含まれる
        // given (前提条件):
        let generator = RoomIdGenerator::new();

        // when (操作):
        let ids: Vec<RoomId> = (0..200).map(|_| generator.generate().unwrap()).collect();

        // then (期待する結果):
        for id in &ids {
            assert!(id.as_str().chars().all(|c| ROOM_ID_ALPHABET.contains(c)));
        }
    }

    #[test]
    fn test_generate_is_not_constant() {
        // テスト項目: 連続して生成した ID が同じ値に偏らない
        // given (前提条件):
        let generator = RoomIdGenerator::new();

        // when (操作):
        let ids: HashSet<String> = (0..100)
            .map(|_| generator.generate().unwrap().into_string())
            .collect();

        // then (期待する結果): 62^6 通りなので 100 回程度ならほぼ衝突しない
        assert!(ids.len() > 95);
    }

    #[tokio::test]
    async fn test_generate_concurrently() {
        // テスト項目: 複数タスクから同時に生成できる
        // given (前提条件):
        let generator = std::sync::Arc::new(RoomIdGenerator::new());

        // when (操作):
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let generator = generator.clone();
                tokio::spawn(async move { generator.generate() })
            })
            .collect();

        // then (期待する結果):
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
    }
}
