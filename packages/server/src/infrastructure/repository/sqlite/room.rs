//! SQLite Room Repository 実装
//!
//! `sqlx` の SQLite ドライバで Room Store を永続化します。
//!
//! ```text
//! rooms            (room_id PK, created_at, last_activity)
//! members          ((room_id, connection_id) PK, joined_at, cursor_x, cursor_y, cursor_visible)
//! drawing_commands (seq AUTOINCREMENT, room_id, kind, data JSON, author, timestamp)
//! ```
//!
//! 各操作は 1 トランザクションで実行します。変更系のトランザクションは
//! 必ず書き込み文から始め、読み取りロックからの昇格で競合しないようにします。
//! `drawing_commands.seq` が履歴の追記順（再生順）です。

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use rakugaki_shared::time::Clock;
use sqlx::{
    Row, SqliteConnection, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

use crate::{
    domain::{
        ConnectionId, Cursor, DrawingCommand, EnsuredRoom, Member, MemberAdmission,
        RepositoryError, Room, RoomId, RoomRepository, Timestamp,
    },
    infrastructure::dto::record::{DrawingCommandRecord, DrawingDataRecord, DrawingKind},
};

const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS rooms (
        room_id       TEXT PRIMARY KEY NOT NULL,
        created_at    INTEGER NOT NULL,
        last_activity INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS members (
        room_id        TEXT NOT NULL REFERENCES rooms (room_id),
        connection_id  TEXT NOT NULL,
        joined_at      INTEGER NOT NULL,
        cursor_x       REAL NOT NULL DEFAULT 0,
        cursor_y       REAL NOT NULL DEFAULT 0,
        cursor_visible INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (room_id, connection_id)
    )",
    "CREATE TABLE IF NOT EXISTS drawing_commands (
        seq       INTEGER PRIMARY KEY AUTOINCREMENT,
        room_id   TEXT NOT NULL REFERENCES rooms (room_id),
        kind      TEXT NOT NULL,
        data      TEXT NOT NULL,
        author    TEXT NOT NULL,
        timestamp INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_drawing_commands_room ON drawing_commands (room_id, seq)",
];

fn storage(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

fn corrupt(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::CorruptRecord(e.to_string())
}

/// SQLite Room Repository 実装
pub struct SqliteRoomRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteRoomRepository {
    /// データベース URL（例: `sqlite://rakugaki.db`）に接続し、スキーマを用意する
    pub async fn connect(database_url: &str, clock: Arc<dyn Clock>) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(storage)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .map_err(storage)?;

        Self::with_pool(pool, clock).await
    }

    /// インメモリ DB で作成する（テスト用）
    ///
    /// SQLite のインメモリ DB は接続ごとに別物になるため、接続を 1 本に固定する。
    pub async fn in_memory(clock: Arc<dyn Clock>) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(storage)?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(storage)?;

        Self::with_pool(pool, clock).await
    }

    async fn with_pool(pool: SqlitePool, clock: Arc<dyn Clock>) -> Result<Self, RepositoryError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(storage)?;
        }
        Ok(Self { pool, clock })
    }

    fn now(&self) -> i64 {
        self.clock.now_millis()
    }
}

/// `last_activity` を更新する。Room が存在すれば `true`
async fn touch_room(
    conn: &mut SqliteConnection,
    room_id: &RoomId,
    now: i64,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query("UPDATE rooms SET last_activity = ? WHERE room_id = ?")
        .bind(now)
        .bind(room_id.as_str())
        .execute(&mut *conn)
        .await
        .map_err(storage)?;
    Ok(result.rows_affected() > 0)
}

/// Room が無ければ作成し、あれば `last_activity` を更新する。作成したら `true`
async fn upsert_room(
    conn: &mut SqliteConnection,
    room_id: &RoomId,
    now: i64,
) -> Result<bool, RepositoryError> {
    let inserted = sqlx::query(
        "INSERT OR IGNORE INTO rooms (room_id, created_at, last_activity) VALUES (?, ?, ?)",
    )
    .bind(room_id.as_str())
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(storage)?;
    let created = inserted.rows_affected() > 0;

    if !created {
        touch_room(conn, room_id, now).await?;
    }
    Ok(created)
}

async fn load_room(
    conn: &mut SqliteConnection,
    room_id: &RoomId,
) -> Result<Option<Room>, RepositoryError> {
    let Some(row) =
        sqlx::query("SELECT created_at, last_activity FROM rooms WHERE room_id = ?")
            .bind(room_id.as_str())
            .fetch_optional(&mut *conn)
            .await
            .map_err(storage)?
    else {
        return Ok(None);
    };

    let mut room = Room::new(
        room_id.clone(),
        Timestamp::new(row.try_get("created_at").map_err(storage)?),
    );
    room.last_activity = Timestamp::new(row.try_get("last_activity").map_err(storage)?);

    let member_rows = sqlx::query(
        "SELECT connection_id, joined_at, cursor_x, cursor_y, cursor_visible
         FROM members WHERE room_id = ? ORDER BY rowid",
    )
    .bind(room_id.as_str())
    .fetch_all(&mut *conn)
    .await
    .map_err(storage)?;

    for row in member_rows {
        let connection_id: String = row.try_get("connection_id").map_err(storage)?;
        room.members.push(Member {
            connection_id: ConnectionId::new(connection_id).map_err(corrupt)?,
            joined_at: Timestamp::new(row.try_get("joined_at").map_err(storage)?),
            cursor: Cursor {
                x: row.try_get("cursor_x").map_err(storage)?,
                y: row.try_get("cursor_y").map_err(storage)?,
                visible: row.try_get("cursor_visible").map_err(storage)?,
            },
        });
    }

    let command_rows = sqlx::query(
        "SELECT kind, data, author FROM drawing_commands WHERE room_id = ? ORDER BY seq",
    )
    .bind(room_id.as_str())
    .fetch_all(&mut *conn)
    .await
    .map_err(storage)?;

    for row in command_rows {
        let kind: String = row.try_get("kind").map_err(storage)?;
        let data: String = row.try_get("data").map_err(storage)?;
        let record = DrawingCommandRecord {
            kind: DrawingKind::parse(&kind)
                .ok_or_else(|| corrupt(format!("unknown drawing kind '{}'", kind)))?,
            data: serde_json::from_str::<DrawingDataRecord>(&data).map_err(corrupt)?,
            user_id: row.try_get("author").map_err(storage)?,
        };
        room.drawing_log
            .push(DrawingCommand::try_from(record).map_err(corrupt)?);
    }

    Ok(Some(room))
}

async fn require_room(
    conn: &mut SqliteConnection,
    room_id: &RoomId,
) -> Result<Room, RepositoryError> {
    load_room(conn, room_id)
        .await?
        .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))
}

#[async_trait]
impl RoomRepository for SqliteRoomRepository {
    async fn ensure_room(&self, room_id: &RoomId) -> Result<EnsuredRoom, RepositoryError> {
        let now = self.now();
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let created = upsert_room(&mut tx, room_id, now).await?;
        let room = require_room(&mut tx, room_id).await?;
        tx.commit().await.map_err(storage)?;

        if created {
            tracing::debug!("Room '{}' created in SQLite store", room_id);
        }

        Ok(EnsuredRoom { room, created })
    }

    async fn ensure_room_exists(&self, room_id: &RoomId) -> Result<bool, RepositoryError> {
        let now = self.now();
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let created = upsert_room(&mut tx, room_id, now).await?;
        tx.commit().await.map_err(storage)?;

        if created {
            tracing::debug!("Room '{}' created in SQLite store", room_id);
        }
        Ok(created)
    }

    async fn add_member_if_absent(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<MemberAdmission, RepositoryError> {
        let now = self.now();
        let mut tx = self.pool.begin().await.map_err(storage)?;

        if !touch_room(&mut tx, room_id, now).await? {
            return Err(RepositoryError::RoomNotFound(room_id.to_string()));
        }

        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO members (room_id, connection_id, joined_at) VALUES (?, ?, ?)",
        )
        .bind(room_id.as_str())
        .bind(connection_id.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        let room = require_room(&mut tx, room_id).await?;
        tx.commit().await.map_err(storage)?;

        Ok(MemberAdmission {
            room,
            newly_added: inserted.rows_affected() > 0,
        })
    }

    async fn remove_member(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<Option<Room>, RepositoryError> {
        let now = self.now();
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let deleted = sqlx::query("DELETE FROM members WHERE room_id = ? AND connection_id = ?")
            .bind(room_id.as_str())
            .bind(connection_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(storage)?;

        if deleted.rows_affected() > 0 {
            touch_room(&mut tx, room_id, now).await?;
        }

        let room = load_room(&mut tx, room_id).await?;
        tx.commit().await.map_err(storage)?;
        Ok(room)
    }

    async fn append_drawing_command(
        &self,
        room_id: &RoomId,
        command: DrawingCommand,
    ) -> Result<(), RepositoryError> {
        let now = self.now();
        let record = DrawingCommandRecord::from(&command);
        let data = serde_json::to_string(&record.data).map_err(corrupt)?;

        let mut tx = self.pool.begin().await.map_err(storage)?;

        if !touch_room(&mut tx, room_id, now).await? {
            return Err(RepositoryError::RoomNotFound(room_id.to_string()));
        }

        sqlx::query(
            "INSERT INTO drawing_commands (room_id, kind, data, author, timestamp)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(room_id.as_str())
        .bind(record.kind.as_str())
        .bind(data)
        .bind(record.user_id)
        .bind(record.data.timestamp)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        tx.commit().await.map_err(storage)?;
        Ok(())
    }

    async fn update_cursor(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        x: f64,
        y: f64,
    ) -> Result<(), RepositoryError> {
        let now = self.now();
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let updated = sqlx::query(
            "UPDATE members SET cursor_x = ?, cursor_y = ?, cursor_visible = 1
             WHERE room_id = ? AND connection_id = ?",
        )
        .bind(x)
        .bind(y)
        .bind(room_id.as_str())
        .bind(connection_id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        if updated.rows_affected() > 0 {
            touch_room(&mut tx, room_id, now).await?;
        }

        tx.commit().await.map_err(storage)?;
        Ok(())
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<Option<Room>, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        let room = load_room(&mut tx, room_id).await?;
        tx.commit().await.map_err(storage)?;
        Ok(room)
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let ids: Vec<String> = sqlx::query("SELECT room_id FROM rooms ORDER BY room_id")
            .fetch_all(&mut *tx)
            .await
            .map_err(storage)?
            .into_iter()
            .map(|row| row.try_get("room_id"))
            .collect::<Result<_, _>>()
            .map_err(storage)?;

        let mut rooms = Vec::with_capacity(ids.len());
        for id in ids {
            let room_id = RoomId::new(id).map_err(corrupt)?;
            if let Some(room) = load_room(&mut tx, &room_id).await? {
                rooms.push(room);
            }
        }

        tx.commit().await.map_err(storage)?;
        Ok(rooms)
    }
}
