//! Infrastructure 層
//!
//! Domain 層の trait（RoomRepository, RoomRegistry）の具体的な実装と、
//! ワイヤーフォーマットの DTO を提供します。

pub mod dto;
pub mod registry;
pub mod repository;
