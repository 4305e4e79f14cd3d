//! # gRPC サービス実装
//!
//! proto 生成コード（`src/proto/`）の UserManager トレイトを実装する。
//! ビジネスロジックは HTTP ハンドラと同じユースケース層に委譲する。

pub mod user_manager;

pub use user_manager::UserManagerGrpc;
