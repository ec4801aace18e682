//! エンティティ
//!
//! Room とその構成要素（Member, DrawingCommand）を表します。
//! 変更操作はすべて `last_activity` を更新します。

use serde::{Deserialize, Serialize};

use super::value_object::{ConnectionId, Point, RoomId, Timestamp};

/// メンバーのカーソル状態
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
    pub visible: bool,
}

impl Default for Cursor {
    /// 原点・非表示
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            visible: false,
        }
    }
}

/// Room に参加している接続
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub connection_id: ConnectionId,
    pub joined_at: Timestamp,
    pub cursor: Cursor,
}

impl Member {
    pub fn new(connection_id: ConnectionId, joined_at: Timestamp) -> Self {
        Self {
            connection_id,
            joined_at,
            cursor: Cursor::default(),
        }
    }
}

/// 確定したストローク
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Point>,
    pub color: String,
    pub width: f64,
}

/// 描画履歴の種類（永続化レイアウトの `type`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingKind {
    Stroke,
    Clear,
}

impl DrawingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrawingKind::Stroke => "stroke",
            DrawingKind::Clear => "clear",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "stroke" => Some(DrawingKind::Stroke),
            "clear" => Some(DrawingKind::Clear),
            _ => None,
        }
    }
}

/// 描画操作の種類
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DrawingAction {
    Stroke(Stroke),
    /// 以前のストロークをすべて消すトゥームストーン
    Clear,
}

/// 描画履歴の 1 エントリ（追記後は不変）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingCommand {
    pub action: DrawingAction,
    pub author: ConnectionId,
    pub timestamp: Timestamp,
}

impl DrawingCommand {
    pub fn stroke(author: ConnectionId, stroke: Stroke, timestamp: Timestamp) -> Self {
        Self {
            action: DrawingAction::Stroke(stroke),
            author,
            timestamp,
        }
    }

    pub fn clear(author: ConnectionId, timestamp: Timestamp) -> Self {
        Self {
            action: DrawingAction::Clear,
            author,
            timestamp,
        }
    }

    pub fn kind(&self) -> DrawingKind {
        match self.action {
            DrawingAction::Stroke(_) => DrawingKind::Stroke,
            DrawingAction::Clear => DrawingKind::Clear,
        }
    }
}

/// 描画履歴を左から畳み込み、現在見えているストロークを返す
///
/// `clear` で可視ストロークをリセットし、`stroke` で追加する。
pub fn replay(log: &[DrawingCommand]) -> Vec<&Stroke> {
    log.iter()
        .fold(Vec::new(), |mut visible, command| match &command.action {
            DrawingAction::Stroke(stroke) => {
                visible.push(stroke);
                visible
            }
            DrawingAction::Clear => {
                visible.clear();
                visible
            }
        })
}

/// Room エンティティ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub members: Vec<Member>,
    pub drawing_log: Vec<DrawingCommand>,
    pub last_activity: Timestamp,
    pub created_at: Timestamp,
}

impl Room {
    /// 空の Room を作成
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self {
            id,
            members: Vec::new(),
            drawing_log: Vec::new(),
            last_activity: created_at,
            created_at,
        }
    }

    pub fn touch(&mut self, now: Timestamp) {
        self.last_activity = now;
    }

    pub fn user_count(&self) -> usize {
        self.members.len()
    }

    pub fn has_member(&self, connection_id: &ConnectionId) -> bool {
        self.members
            .iter()
            .any(|m| &m.connection_id == connection_id)
    }

    pub fn member(&self, connection_id: &ConnectionId) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| &m.connection_id == connection_id)
    }

    /// 未参加の場合のみメンバーを追加する
    ///
    /// # Returns
    ///
    /// 追加した場合は `true`、既に参加済みなら `false`（Room は変更しない）
    pub fn add_member_if_absent(&mut self, connection_id: ConnectionId, now: Timestamp) -> bool {
        if self.has_member(&connection_id) {
            return false;
        }
        self.members.push(Member::new(connection_id, now));
        self.touch(now);
        true
    }

    /// メンバーを削除する（存在しなければ何もしない）
    pub fn remove_member(&mut self, connection_id: &ConnectionId, now: Timestamp) -> bool {
        let before = self.members.len();
        self.members.retain(|m| &m.connection_id != connection_id);
        let removed = self.members.len() != before;
        if removed {
            self.touch(now);
        }
        removed
    }

    /// 描画履歴に追記する
    pub fn append(&mut self, command: DrawingCommand, now: Timestamp) {
        self.drawing_log.push(command);
        self.touch(now);
    }

    /// メンバーのカーソルを更新する
    ///
    /// # Returns
    ///
    /// メンバーが存在しない場合は `false`（エラーではない）
    pub fn update_cursor(
        &mut self,
        connection_id: &ConnectionId,
        x: f64,
        y: f64,
        now: Timestamp,
    ) -> bool {
        let Some(member) = self
            .members
            .iter_mut()
            .find(|m| &m.connection_id == connection_id)
        else {
            return false;
        };

        member.cursor = Cursor {
            x,
            y,
            visible: true,
        };
        self.touch(now);
        true
    }

    /// 現在見えているストローク
    pub fn visible_strokes(&self) -> Vec<&Stroke> {
        replay(&self.drawing_log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_id() -> RoomId {
        RoomId::new("Ab3dE9".to_string()).unwrap()
    }

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn stroke(tag: f64) -> Stroke {
        Stroke {
            points: vec![Point::new(tag, tag), Point::new(tag + 1.0, tag + 1.0)],
            color: "#000000".to_string(),
            width: 2.0,
        }
    }

    #[test]
    fn test_new_room_is_empty() {
        // テスト項目: 作成直後の Room はメンバーも履歴も持たない
        // given (前提条件):
        let created_at = Timestamp::new(1000);

        // when (操作):
        let room = Room::new(room_id(), created_at);

        // then (期待する結果):
        assert_eq!(room.user_count(), 0);
        assert!(room.drawing_log.is_empty());
        assert_eq!(room.created_at, created_at);
        assert_eq!(room.last_activity, created_at);
    }

    #[test]
    fn test_add_member_if_absent_is_idempotent() {
        // テスト項目: 同じ接続を 2 回追加してもメンバーは 1 人
        // given (前提条件):
        let mut room = Room::new(room_id(), Timestamp::new(1000));

        // when (操作):
        let first = room.add_member_if_absent(conn("alice"), Timestamp::new(1001));
        let second = room.add_member_if_absent(conn("alice"), Timestamp::new(1002));

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(room.user_count(), 1);
        assert_eq!(room.members[0].joined_at, Timestamp::new(1001));
        assert_eq!(room.members[0].cursor, Cursor::default());
        // 2 回目は Room を変更しない
        assert_eq!(room.last_activity, Timestamp::new(1001));
    }

    #[test]
    fn test_remove_member() {
        // テスト項目: メンバー削除は存在するときだけ Room を変更する
        // given (前提条件):
        let mut room = Room::new(room_id(), Timestamp::new(1000));
        room.add_member_if_absent(conn("alice"), Timestamp::new(1001));
        room.add_member_if_absent(conn("bob"), Timestamp::new(1002));

        // when (操作):
        let removed = room.remove_member(&conn("alice"), Timestamp::new(1003));
        let removed_again = room.remove_member(&conn("alice"), Timestamp::new(1004));

        // then (期待する結果):
        assert!(removed);
        assert!(!removed_again);
        assert_eq!(room.user_count(), 1);
        assert!(room.has_member(&conn("bob")));
        assert_eq!(room.last_activity, Timestamp::new(1003));
    }

    #[test]
    fn test_update_cursor_for_member() {
        // テスト項目: カーソル更新でメンバーのカーソルが表示状態になる
        // given (前提条件):
        let mut room = Room::new(room_id(), Timestamp::new(1000));
        room.add_member_if_absent(conn("alice"), Timestamp::new(1001));

        // when (操作):
        let updated = room.update_cursor(&conn("alice"), 12.5, 40.0, Timestamp::new(1002));

        // then (期待する結果):
        assert!(updated);
        assert_eq!(
            room.member(&conn("alice")).unwrap().cursor,
            Cursor {
                x: 12.5,
                y: 40.0,
                visible: true
            }
        );
        assert_eq!(room.last_activity, Timestamp::new(1002));
    }

    #[test]
    fn test_update_cursor_for_unknown_member_is_noop() {
        // テスト項目: 未参加の接続のカーソル更新は何もしない
        // given (前提条件):
        let mut room = Room::new(room_id(), Timestamp::new(1000));

        // when (操作):
        let updated = room.update_cursor(&conn("ghost"), 1.0, 1.0, Timestamp::new(1001));

        // then (期待する結果):
        assert!(!updated);
        assert_eq!(room.last_activity, Timestamp::new(1000));
    }

    #[test]
    fn test_replay_resets_on_clear() {
        // テスト項目: stroke(A), stroke(B), clear, stroke(C) の再生結果は C のみ
        // given (前提条件):
        let mut room = Room::new(room_id(), Timestamp::new(1000));
        let author = conn("alice");
        room.append(
            DrawingCommand::stroke(author.clone(), stroke(1.0), Timestamp::new(1)),
            Timestamp::new(1),
        );
        room.append(
            DrawingCommand::stroke(author.clone(), stroke(2.0), Timestamp::new(2)),
            Timestamp::new(2),
        );
        room.append(
            DrawingCommand::clear(author.clone(), Timestamp::new(3)),
            Timestamp::new(3),
        );
        room.append(
            DrawingCommand::stroke(author, stroke(3.0), Timestamp::new(4)),
            Timestamp::new(4),
        );

        // when (操作):
        let visible = room.visible_strokes();

        // then (期待する結果):
        assert_eq!(room.drawing_log.len(), 4);
        assert_eq!(visible, vec![&stroke(3.0)]);
    }

    #[test]
    fn test_replay_of_empty_log() {
        // テスト項目: 空の履歴からは何も見えない
        // given (前提条件):
        let log: Vec<DrawingCommand> = Vec::new();

        // when (操作):
        let visible = replay(&log);

        // then (期待する結果):
        assert!(visible.is_empty());
    }

    #[test]
    fn test_command_kind_names() {
        // テスト項目: 種類名が永続化レイアウトと一致する
        // given (前提条件):
        let author = conn("alice");

        // when (操作):
        let stroke_cmd = DrawingCommand::stroke(author.clone(), stroke(0.0), Timestamp::new(1));
        let clear_cmd = DrawingCommand::clear(author, Timestamp::new(2));

        // then (期待する結果):
        assert_eq!(stroke_cmd.kind().as_str(), "stroke");
        assert_eq!(clear_cmd.kind().as_str(), "clear");
        assert_eq!(DrawingKind::parse("clear"), Some(DrawingKind::Clear));
        assert_eq!(DrawingKind::parse("erase"), None);
    }
}
