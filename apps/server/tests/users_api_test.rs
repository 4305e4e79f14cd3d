//! ユーザー CRUD API 統合テスト
//!
//! インメモリリポジトリを使い、ルーター越しに HTTP ステータスと
//! レスポンスボディの契約を検証する。
//!
//! ## テストケース
//!
//! - 作成 → 201 とレスポンス形状、通知の記録
//! - 一覧のページング（トークンの発行 → 次ページ取得 → 最終ページで省略）
//! - 壊れたトークン・不正な pagination・絞り込みの契約エラーメッセージ
//! - 更新の 200 / 400 / 404 / 409
//! - 削除の 204 / 404
//! - health / readiness

use std::sync::Arc;

use axum::{
   Router,
   body::Body,
   http::{Method, Request, StatusCode, header},
};
use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;
use tower::ServiceExt as _;
use userhub_domain::{
   clock::FixedClock,
   filter::AllowedFilters,
   password::PasswordHash,
   user::{User, UserDraft, UserId},
};
use userhub_infra::{
   Argon2PasswordHasher,
   mock::{InMemoryUserRepository, RecordingChannelNotifier},
   notification::Channel,
};
use userhub_server::{
   handler::{self, UserState},
   usecase::UserUseCase,
};

/// テスト用の固定タイムスタンプ
fn now() -> DateTime<Utc> {
   DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

struct TestApp {
   router:   Router,
   repo:     InMemoryUserRepository,
   notifier: RecordingChannelNotifier,
}

fn setup() -> TestApp {
   let repo = InMemoryUserRepository::new();
   let notifier = RecordingChannelNotifier::new();
   let usecase = UserUseCase::new(
      Arc::new(repo.clone()),
      Arc::new(Argon2PasswordHasher::new()),
      Arc::new(notifier.clone()),
      Arc::new(FixedClock::new(now())),
      AllowedFilters::new(["country"]),
   );
   let router = handler::router(Arc::new(UserState { usecase }));

   TestApp {
      router,
      repo,
      notifier,
   }
}

/// 一意制約を経由せずにユーザーを直接投入する
fn seed_user(repo: &InMemoryUserRepository, nickname: &str, country: &str, ts: i64) -> UserId {
   let draft = UserDraft::new(
      "Test",
      "User",
      nickname,
      format!("{nickname}@example.com"),
      country,
      "pa55word",
   )
   .unwrap();
   let user = User::new(
      UserId::new(),
      draft,
      PasswordHash::new("$argon2id$v=19$..."),
      DateTime::from_timestamp(ts, 0).unwrap(),
   );
   let id = user.id();
   repo.seed(user);
   id
}

/// base64 トークンをクエリパラメータとして安全に埋め込む
fn urlencode(token: &str) -> String {
   token
      .replace('%', "%25")
      .replace('+', "%2B")
      .replace('/', "%2F")
      .replace('=', "%3D")
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
   let response = router.oneshot(request).await.unwrap();
   let status = response.status();
   let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
   let json = if bytes.is_empty() {
      serde_json::Value::Null
   } else {
      serde_json::from_slice(&bytes).unwrap()
   };
   (status, json)
}

fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
   Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
   Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn create_body(nickname: &str, email: &str) -> serde_json::Value {
   serde_json::json!({
      "first_name": "Ada",
      "last_name": "Lovelace",
      "nickname": nickname,
      "password": "pa55word",
      "email": email,
      "country": "UK"
   })
}

// --- 作成 ---

#[tokio::test]
async fn test_ユーザー作成は201とユーザーを返す() {
   let app = setup();

   let (status, body) = send(
      app.router,
      json_request(
         Method::POST,
         "/service/v1/users",
         create_body("ada", "ada@example.com"),
      ),
   )
   .await;

   assert_eq!(status, StatusCode::CREATED);
   assert_eq!(body["nickname"], "ada");
   assert_eq!(body["email"], "ada@example.com");
   assert_eq!(body["country"], "UK");
   assert!(body.get("password").is_none());
   assert!(body.get("password_hash").is_none());

   let sent = app.notifier.sent();
   assert_eq!(sent.len(), 1);
   assert_eq!(sent[0].0, Channel::Create);
}

#[tokio::test]
async fn test_重複メールアドレスの作成は409() {
   let app = setup();
   seed_user(&app.repo, "ada", "UK", 1_000);

   let (status, body) = send(
      app.router,
      json_request(
         Method::POST,
         "/service/v1/users",
         create_body("other", "ada@example.com"),
      ),
   )
   .await;

   assert_eq!(status, StatusCode::CONFLICT);
   assert_eq!(body["detail"], "user already exists");
}

#[tokio::test]
async fn test_不正なニックネームの作成は400() {
   let app = setup();

   let (status, _body) = send(
      app.router,
      json_request(
         Method::POST,
         "/service/v1/users",
         create_body("..bad", "bad@example.com"),
      ),
   )
   .await;

   assert_eq!(status, StatusCode::BAD_REQUEST);
}

// --- 一覧 ---

#[tokio::test]
async fn test_空の一覧はnext_pageフィールドを含まない() {
   let app = setup();

   let (status, body) = send(app.router, get_request("/service/v1/users")).await;

   assert_eq!(status, StatusCode::OK);
   assert_eq!(body, serde_json::json!({ "users": [] }));
}

#[tokio::test]
async fn test_一覧のページングはトークンで次ページへ進める() {
   let app = setup();
   seed_user(&app.repo, "user1", "NL", 1_000);
   seed_user(&app.repo, "user2", "NL", 2_000);
   seed_user(&app.repo, "user3", "NL", 3_000);

   let (status, body) = send(
      app.router.clone(),
      get_request("/service/v1/users?pagination=2"),
   )
   .await;

   assert_eq!(status, StatusCode::OK);
   assert_eq!(body["users"].as_array().unwrap().len(), 2);
   // 作成日時の降順
   assert_eq!(body["users"][0]["nickname"], "user3");
   let token = body["next_page"].as_str().expect("next_page が発行されること");

   let (status, body) = send(
      app.router,
      get_request(&format!("/service/v1/users?next_page={}", urlencode(token))),
   )
   .await;

   assert_eq!(status, StatusCode::OK);
   assert_eq!(body["users"].as_array().unwrap().len(), 1);
   assert_eq!(body["users"][0]["nickname"], "user1");
   assert!(body.get("next_page").is_none());
}

#[tokio::test]
async fn test_絞り込み付き一覧() {
   let app = setup();
   seed_user(&app.repo, "nl1", "NL", 1_000);
   seed_user(&app.repo, "uk1", "UK", 2_000);

   let (status, body) = send(
      app.router,
      get_request("/service/v1/users?filter=NL&filterBy=country"),
   )
   .await;

   assert_eq!(status, StatusCode::OK);
   assert_eq!(body["users"].as_array().unwrap().len(), 1);
   assert_eq!(body["users"][0]["nickname"], "nl1");
}

#[tokio::test]
async fn test_壊れたトークンは400() {
   let app = setup();

   let (status, body) = send(
      app.router,
      get_request("/service/v1/users?next_page=@@@"),
   )
   .await;

   assert_eq!(status, StatusCode::BAD_REQUEST);
   assert!(
      body["detail"]
         .as_str()
         .unwrap()
         .contains("could not decode next_page argument")
   );
}

#[tokio::test]
async fn test_不正なpaginationは400() {
   let app = setup();

   let (status, body) = send(
      app.router,
      get_request("/service/v1/users?pagination=abc"),
   )
   .await;

   assert_eq!(status, StatusCode::BAD_REQUEST);
   assert_eq!(body["detail"], "malformed pagination");
}

#[tokio::test]
async fn test_絞り込みの片方だけの指定は400() {
   let app = setup();

   let (status, body) = send(app.router, get_request("/service/v1/users?filter=NL")).await;

   assert_eq!(status, StatusCode::BAD_REQUEST);
   assert_eq!(
      body["detail"],
      "parameters filter and filterBy should be used together"
   );
}

#[tokio::test]
async fn test_許可されていないfilter_byは400() {
   let app = setup();

   let (status, body) = send(
      app.router,
      get_request("/service/v1/users?filter=30&filterBy=age"),
   )
   .await;

   assert_eq!(status, StatusCode::BAD_REQUEST);
   assert_eq!(body["detail"], "filterBy parameter 'age' not supported");
}

// --- 更新 ---

#[tokio::test]
async fn test_ユーザー更新は200と更新後のユーザーを返す() {
   let app = setup();
   let id = seed_user(&app.repo, "ada", "UK", 1_000);

   let (status, body) = send(
      app.router,
      json_request(
         Method::PUT,
         &format!("/service/v1/users/{id}"),
         serde_json::json!({ "country": "NL" }),
      ),
   )
   .await;

   assert_eq!(status, StatusCode::OK);
   assert_eq!(body["country"], "NL");
   assert_eq!(body["nickname"], "ada");

   let sent = app.notifier.sent();
   assert_eq!(sent.last().unwrap().0, Channel::Update);
}

#[tokio::test]
async fn test_空の更新は400() {
   let app = setup();
   let id = seed_user(&app.repo, "ada", "UK", 1_000);

   let (status, body) = send(
      app.router,
      json_request(
         Method::PUT,
         &format!("/service/v1/users/{id}"),
         serde_json::json!({}),
      ),
   )
   .await;

   assert_eq!(status, StatusCode::BAD_REQUEST);
   assert_eq!(body["detail"], "empty request");
}

#[tokio::test]
async fn test_存在しないユーザーの更新は404() {
   let app = setup();

   let (status, body) = send(
      app.router,
      json_request(
         Method::PUT,
         &format!("/service/v1/users/{}", UserId::new()),
         serde_json::json!({ "country": "NL" }),
      ),
   )
   .await;

   assert_eq!(status, StatusCode::NOT_FOUND);
   assert_eq!(body["detail"], "user not found");
}

#[tokio::test]
async fn test_ニックネームの重複更新は409() {
   let app = setup();
   seed_user(&app.repo, "taken", "UK", 1_000);
   let id = seed_user(&app.repo, "ada", "UK", 2_000);

   let (status, body) = send(
      app.router,
      json_request(
         Method::PUT,
         &format!("/service/v1/users/{id}"),
         serde_json::json!({ "nickname": "taken" }),
      ),
   )
   .await;

   assert_eq!(status, StatusCode::CONFLICT);
   assert_eq!(body["detail"], "user already exists");
}

// --- 削除 ---

#[tokio::test]
async fn test_ユーザー削除は204() {
   let app = setup();
   let id = seed_user(&app.repo, "ada", "UK", 1_000);

   let request = Request::builder()
      .method(Method::DELETE)
      .uri(format!("/service/v1/users/{id}"))
      .body(Body::empty())
      .unwrap();
   let (status, _body) = send(app.router, request).await;

   assert_eq!(status, StatusCode::NO_CONTENT);
   assert_eq!(app.notifier.sent().last().unwrap().0, Channel::Delete);
}

#[tokio::test]
async fn test_存在しないユーザーの削除は404() {
   let app = setup();

   let request = Request::builder()
      .method(Method::DELETE)
      .uri(format!("/service/v1/users/{}", UserId::new()))
      .body(Body::empty())
      .unwrap();
   let (status, body) = send(app.router, request).await;

   assert_eq!(status, StatusCode::NOT_FOUND);
   assert_eq!(body["detail"], "user not found");
}

// --- ヘルスチェック ---

#[tokio::test]
async fn test_healthは200を返す() {
   let app = setup();

   let (status, body) = send(app.router, get_request("/service/v1/health")).await;

   assert_eq!(status, StatusCode::OK);
   assert_eq!(body["status"], "healthy");
   assert!(body["version"].as_str().is_some());
}

#[tokio::test]
async fn test_readinessはインメモリリポジトリでready() {
   let app = setup();

   let (status, body) = send(app.router, get_request("/service/v1/readiness")).await;

   assert_eq!(status, StatusCode::OK);
   assert_eq!(body["status"], "ready");
   assert_eq!(body["checks"]["database"], "ok");
}
