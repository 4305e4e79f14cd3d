//! # ユースケース層
//!
//! HTTP ハンドラと gRPC サービスの両方から呼び出される
//! ビジネスロジックを定義する。トランスポート固有の知識は持たない。

pub mod user;

pub use user::{ListUsersInput, UserUseCase};
