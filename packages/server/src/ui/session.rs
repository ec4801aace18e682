//! Session Gateway
//!
//! 1 接続につき 1 つの `Session` が、受信したイベントを検証し、
//! UseCase の呼び出しと配信メッセージの組み立てを行います。
//!
//! ```text
//! Unattached --join--> Joined(room_id) --close--> Closed
//!      |                                            ^
//!      +--------------------close-------------------+
//! ```
//!
//! - `Joined` になった接続は、閉じるまで 1 つの Room に束縛される
//! - 同じ接続のイベントは受信順に 1 つずつ処理される（`handle` は `&mut self`）
//! - 自分への返信（ack / error）は自分の送信チャンネルに直接積む
//!
//! トランスポートには依存しないため、WebSocket を介さずにテストできます。

use std::sync::Arc;

use crate::{
    domain::{ConnectionId, PusherChannel, RoomId, Stroke},
    infrastructure::dto::{
        conversion::history_records,
        websocket::{ClientEvent, ErrorCode, InboundFrame, JoinAck, ServerEvent},
    },
};

use super::state::AppState;

/// 接続ごとの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unattached,
    Joined(RoomId),
    Closed,
}

pub struct Session {
    connection_id: ConnectionId,
    state: SessionState,
    /// この接続自身への送信チャンネル
    outbound: PusherChannel,
    app: Arc<AppState>,
}

impl Session {
    pub fn new(connection_id: ConnectionId, outbound: PusherChannel, app: Arc<AppState>) -> Self {
        Self {
            connection_id,
            state: SessionState::Unattached,
            outbound,
            app,
        }
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// テキストフレームを 1 つ処理する
    pub async fn handle_text(&mut self, text: &str) {
        match serde_json::from_str::<InboundFrame>(text) {
            Ok(frame) => self.handle(frame).await,
            Err(e) => {
                tracing::debug!(
                    "Malformed frame from '{}': {}",
                    self.connection_id,
                    e
                );
                self.reply(&ServerEvent::Error {
                    error: ErrorCode::MalformedEvent,
                });
            }
        }
    }

    /// 解釈済みのイベントを 1 つ処理する
    pub async fn handle(&mut self, frame: InboundFrame) {
        if self.state == SessionState::Closed {
            return;
        }

        let InboundFrame { ack_id, event } = frame;
        if let ClientEvent::Join { room_id } = event {
            self.join(room_id, ack_id).await;
            return;
        }

        let Some(room_id) = self.bound_room(event.room_id()) else {
            tracing::debug!(
                "'{}' from '{}' ignored: not joined to room '{}'",
                event.name(),
                self.connection_id,
                event.room_id()
            );
            self.reply(&ServerEvent::Error {
                error: ErrorCode::NotJoined,
            });
            return;
        };

        let user_id = self.connection_id.to_string();
        match event {
            ClientEvent::Join { .. } => {}
            ClientEvent::DrawStart {
                point,
                color,
                width,
                ..
            } => {
                let event = ServerEvent::DrawStart {
                    user_id,
                    point,
                    color,
                    width,
                };
                if let Some(message) = encode(&event) {
                    self.app
                        .relay_drawing_usecase
                        .relay_preview(&room_id, &self.connection_id, &message)
                        .await;
                }
            }
            ClientEvent::DrawMove { point, .. } => {
                let event = ServerEvent::DrawMove { user_id, point };
                if let Some(message) = encode(&event) {
                    self.app
                        .relay_drawing_usecase
                        .relay_preview(&room_id, &self.connection_id, &message)
                        .await;
                }
            }
            ClientEvent::DrawEnd {
                points,
                color,
                width,
                ..
            } => {
                let stroke = Stroke {
                    points: points.clone(),
                    color: color.clone(),
                    width,
                };
                let event = ServerEvent::DrawEnd {
                    user_id,
                    points,
                    color,
                    width,
                };
                if let Some(message) = encode(&event) {
                    self.app
                        .relay_drawing_usecase
                        .commit_stroke(&room_id, &self.connection_id, stroke, &message)
                        .await;
                }
            }
            ClientEvent::ClearCanvas { .. } => {
                let event = ServerEvent::ClearCanvas { user_id };
                if let Some(message) = encode(&event) {
                    self.app
                        .relay_drawing_usecase
                        .clear_canvas(&room_id, &self.connection_id, &message)
                        .await;
                }
            }
            ClientEvent::CursorMove { x, y, .. } => {
                let event = ServerEvent::CursorMove { user_id, x, y };
                if let Some(message) = encode(&event) {
                    self.app
                        .move_cursor_usecase
                        .execute(&room_id, &self.connection_id, x, y, &message)
                        .await;
                }
            }
        }
    }

    /// 接続終了。Joined だった場合は退出処理と `user-left` の通知を行う
    pub async fn close(&mut self) {
        let previous = std::mem::replace(&mut self.state, SessionState::Closed);
        let SessionState::Joined(room_id) = previous else {
            return;
        };

        let user_count = self
            .app
            .leave_room_usecase
            .execute(&room_id, &self.connection_id)
            .await;
        tracing::info!(
            "'{}' left room '{}' ({} remaining)",
            self.connection_id,
            room_id,
            user_count
        );

        let event = ServerEvent::UserLeft {
            user_id: self.connection_id.to_string(),
            user_count,
        };
        if let Some(message) = encode(&event) {
            self.app
                .leave_room_usecase
                .broadcast_participant_left(&room_id, &self.connection_id, &message)
                .await;
        }
    }

    async fn join(&mut self, raw_room_id: String, ack_id: Option<u64>) {
        // 検証エラーはログに残さない
        let Ok(room_id) = RoomId::new(raw_room_id) else {
            self.reject(ack_id, ErrorCode::InvalidRoomId);
            return;
        };

        if let SessionState::Joined(current) = &self.state
            && current != &room_id
        {
            self.reject(ack_id, ErrorCode::AlreadyJoined);
            return;
        }

        let outcome = match self
            .app
            .join_room_usecase
            .execute(&room_id, &self.connection_id, self.outbound.clone())
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    "Failed to join '{}' to room '{}': {}",
                    self.connection_id,
                    room_id,
                    e
                );
                self.reject(ack_id, ErrorCode::ServerError);
                return;
            }
        };
        self.state = SessionState::Joined(room_id.clone());

        let user_count = outcome.room.user_count();
        if let Some(ack_id) = ack_id {
            let ack = JoinAck::accepted(
                ack_id,
                room_id.to_string(),
                history_records(&outcome.room),
                user_count,
                self.connection_id.to_string(),
            );
            self.reply(&ServerEvent::Ack(ack));
        }

        if !outcome.newly_added {
            tracing::debug!(
                "'{}' re-joined room '{}', no notification",
                self.connection_id,
                room_id
            );
            return;
        }

        tracing::info!(
            "'{}' joined room '{}' ({} members)",
            self.connection_id,
            room_id,
            user_count
        );
        let event = ServerEvent::UserJoined {
            user_id: self.connection_id.to_string(),
            user_count,
        };
        if let Some(message) = encode(&event) {
            self.app
                .join_room_usecase
                .broadcast_participant_joined(&room_id, &self.connection_id, &message)
                .await;
        }
    }

    /// イベントが指定する Room が、この接続の参加中の Room であればそれを返す
    fn bound_room(&self, requested: &str) -> Option<RoomId> {
        match &self.state {
            SessionState::Joined(room_id) if room_id.as_str() == requested.trim() => {
                Some(room_id.clone())
            }
            _ => None,
        }
    }

    fn reject(&self, ack_id: Option<u64>, error: ErrorCode) {
        if let Some(ack_id) = ack_id {
            self.reply(&ServerEvent::Ack(JoinAck::rejected(ack_id, error)));
        }
    }

    fn reply(&self, event: &ServerEvent) {
        let Some(message) = encode(event) else {
            return;
        };
        if self.outbound.send(message).is_err() {
            tracing::debug!("Connection '{}' is gone, reply dropped", self.connection_id);
        }
    }
}

fn encode(event: &ServerEvent) -> Option<String> {
    match event.to_json() {
        Ok(message) => Some(message),
        Err(e) => {
            tracing::error!("Failed to serialize server event: {}", e);
            None
        }
    }
}
