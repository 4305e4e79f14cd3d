//! # ユーザー管理サーバー
//!
//! ユーザー CRUD を HTTP/JSON と gRPC の 2 つのトランスポートで提供する
//! マイクロサービス。どちらのトランスポートも同一のユースケース層に委譲する。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `SERVER_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `HTTP_PORT` | **Yes** | HTTP API のポート番号 |
//! | `GRPC_PORT` | **Yes** | gRPC API のポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `ALLOWED_FILTERS` | No | 絞り込み可能カラム（デフォルト: `country`） |
//! | `NOTIFICATION_BACKEND` | No | `webhook` \| `noop`（デフォルト: `noop`） |
//! | `NOTIFICATION_WEBHOOK_URL` | No | backend=webhook の場合に必須 |
//! | `LOG_FORMAT` | No | `json` \| `pretty`（デフォルト: `pretty`） |
//!
//! ## 起動方法
//!
//! ```bash
//! HTTP_PORT=8080 GRPC_PORT=50051 DATABASE_URL=postgres://... \
//!     cargo run -p userhub-server
//! ```

mod config;

use std::{net::SocketAddr, sync::Arc};

use config::ServerConfig;
use tokio::net::TcpListener;
use userhub_domain::{
   clock::{Clock, SystemClock},
   filter::AllowedFilters,
};
use userhub_infra::{
   Argon2PasswordHasher, PasswordHasher, db,
   notification::{ChannelNotifier, NoopChannelNotifier, WebhookChannelNotifier},
   repository::{PostgresUserRepository, UserRepository},
};
use userhub_server::{
   grpc::UserManagerGrpc,
   handler::{self, UserState},
   proto::usermanager::v1::user_manager_server::UserManagerServer,
   usecase::UserUseCase,
};
use userhub_shared::observability::{LogFormat, init_tracing};

/// ユーザー管理サーバーのエントリーポイント
///
/// HTTP と gRPC のサーバーを同一プロセスで起動し、
/// どちらかが停止した時点でプロセスを終了する。
#[tokio::main]
async fn main() -> anyhow::Result<()> {
   // .env ファイルを読み込む（存在する場合）
   dotenvy::dotenv().ok();

   // トレーシング初期化
   init_tracing(LogFormat::from_env());

   // 設定読み込み
   let config = ServerConfig::from_env().expect("設定の読み込みに失敗しました");

   tracing::info!(
      http_port = config.http_port,
      grpc_port = config.grpc_port,
      "ユーザー管理サーバーを起動します"
   );

   // データベース接続プールを作成し、マイグレーションを適用する
   let pool = db::create_pool(&config.database_url)
      .await
      .expect("データベース接続に失敗しました");
   db::run_migrations(&pool)
      .await
      .expect("マイグレーションの適用に失敗しました");
   tracing::info!("データベースに接続しました");

   // 依存コンポーネントを初期化
   let repository: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(pool));
   let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
   let notifier: Arc<dyn ChannelNotifier> = match config.notification.backend.as_str() {
      "webhook" => {
         let url = config
            .notification
            .webhook_url
            .clone()
            .expect("NOTIFICATION_WEBHOOK_URL が設定されていません");
         Arc::new(
            WebhookChannelNotifier::new(url).expect("通知クライアントの構築に失敗しました"),
         )
      }
      _ => Arc::new(NoopChannelNotifier),
   };
   let clock: Arc<dyn Clock> = Arc::new(SystemClock);
   let allowed_filters = AllowedFilters::new(config.allowed_filters.iter().cloned());

   let usecase = UserUseCase::new(
      repository,
      password_hasher,
      notifier,
      clock,
      allowed_filters,
   );

   // HTTP ルーター
   let state = Arc::new(UserState {
      usecase: usecase.clone(),
   });
   let app = handler::router(state);

   // gRPC サーバー
   let grpc_addr: SocketAddr = format!("{}:{}", config.host, config.grpc_port)
      .parse()
      .expect("gRPC アドレスのパースに失敗しました");
   let grpc_future = async move {
      tonic::transport::Server::builder()
         .add_service(UserManagerServer::new(UserManagerGrpc::new(usecase)))
         .serve(grpc_addr)
         .await
         .map_err(|e| anyhow::anyhow!("gRPC サーバーエラー: {e}"))
   };

   // HTTP サーバー
   let http_addr: SocketAddr = format!("{}:{}", config.host, config.http_port)
      .parse()
      .expect("HTTP アドレスのパースに失敗しました");
   let listener = TcpListener::bind(http_addr).await?;
   tracing::info!("サーバーが起動しました: http={} grpc={}", http_addr, grpc_addr);

   tokio::select! {
      result = axum::serve(listener, app) => {
         if let Err(e) = result {
            tracing::error!("HTTP サーバーエラー: {e}");
         }
      }
      result = grpc_future => {
         if let Err(e) = result {
            tracing::error!("{e}");
         }
      }
      () = shutdown_signal() => {
         tracing::info!("シャットダウンシグナルを受信しました。サーバーを停止します");
      }
   }

   Ok(())
}

/// SIGINT / SIGTERM を待つ
async fn shutdown_signal() {
   let ctrl_c = async {
      tokio::signal::ctrl_c()
         .await
         .expect("SIGINT ハンドラの登録に失敗しました");
   };

   #[cfg(unix)]
   let terminate = async {
      tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
         .expect("SIGTERM ハンドラの登録に失敗しました")
         .recv()
         .await;
   };

   #[cfg(not(unix))]
   let terminate = std::future::pending::<()>();

   tokio::select! {
      () = ctrl_c => {},
      () = terminate => {},
   }
}
