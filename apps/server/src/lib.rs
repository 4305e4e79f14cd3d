//! # ユーザー管理サーバーライブラリ
//!
//! ユースケース・ハンドラ・gRPC サービスを公開する。
//! 統合テストからルーターとユースケースを直接組み立てられるようにする。

pub mod error;
pub mod grpc;
pub mod handler;
pub mod proto;
pub mod usecase;
