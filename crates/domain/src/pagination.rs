//! # ページネーショントークン
//!
//! ユーザー一覧取得のカーソルを符号化・復号する自己完結型コーデック。
//!
//! ## ワイヤフォーマット
//!
//! トークンは以下の JSON を標準アルファベットの base64 で包んだ不透明文字列。
//!
//! ```json
//! {"limit": 5, "offset": 5, "filter_by": "country", "filter": "NL",
//!  "time": "2026-01-01T00:00:00Z"}
//! ```
//!
//! `limit == -1` は「リミット未指定」のセンチネル。`time` は発行時刻で、
//! 発行から 30 分未満のトークンのみ有効。
//!
//! ## 解決の優先順位
//!
//! | 入力 | 挙動 |
//! |------|------|
//! | 有効なトークン | トークンの内容をそのまま採用（他パラメータは無視） |
//! | 期限切れトークン | トークンを破棄し、生パラメータから組み立て直す |
//! | トークンなし | 生パラメータ（pagination / filter / filterBy）から組み立てる |
//!
//! トークンはサーバ自身が発行したものなので、有効なトークン経由の
//! 絞り込み条件には許可リストの検査を適用しない。生パラメータ経由の
//! 絞り込みは必ず [`AllowedFilters`] と突き合わせる。
//!
//! ## 設計方針
//!
//! コーデックは純粋関数として実装し、I/O もログ出力も行わない。
//! 時刻は [`Clock`] 経由で注入し、期限判定をテスト可能にする。

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
   clock::Clock,
   filter::{AllowedFilters, Filter},
};

/// トークンの有効期間（分）
const TOKEN_TTL_MINUTES: i64 = 30;

/// ワイヤ上の「リミット未指定」センチネル
const NO_LIMIT: i64 = -1;

/// トークンの解決・発行で発生するエラー
///
/// すべてクライアント入力の誤りであり、HTTP 400 / gRPC INVALID_ARGUMENT に
/// 対応する。メッセージは API の互換性契約の一部なので変更しないこと。
#[derive(Debug, Error)]
pub enum PageTokenError {
   /// トークンが base64 として復号できない
   #[error("could not decode next_page argument: {0}")]
   TokenDecode(#[from] base64::DecodeError),

   /// 復号結果が期待する JSON として解釈できない
   #[error("could not unmarshal limit offset: {0}")]
   TokenParse(#[from] serde_json::Error),

   /// `pagination` パラメータが整数として解釈できない
   #[error("malformed pagination")]
   InvalidPagination,

   /// `filter` と `filterBy` の片方だけが指定された
   #[error("parameters filter and filterBy should be used together")]
   FilterPairing,

   /// `filterBy` が許可リストに含まれないカラム名を指定した
   #[error("filterBy parameter '{0}' not supported")]
   UnsupportedFilter(String),
}

/// トークンのワイヤ表現
///
/// フィールド名と順序はワイヤ互換性契約の一部。絞り込みなしの場合、
/// `filter_by` / `filter` は空文字列として常にシリアライズされる。
#[derive(Debug, Serialize, Deserialize)]
struct PageTokenWire {
   limit:     i64,
   offset:    i64,
   #[serde(default)]
   filter_by: String,
   #[serde(default)]
   filter:    String,
   time:      DateTime<Utc>,
}

/// 解決済みのページ選択
///
/// `limit: None` は「リミット未指定」（全件取得）を意味する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
   pub limit:  Option<i64>,
   pub offset: i64,
   pub filter: Option<Filter>,
}

impl PageSelection {
   /// 絞り込みもリミットもない全件取得の選択
   pub fn unbounded() -> Self {
      Self {
         limit:  None,
         offset: 0,
         filter: None,
      }
   }
}

/// トークンと生パラメータからページ選択を解決する
///
/// # 引数
///
/// - `raw_token`: `next_page` パラメータの生の値（空文字列 = 未指定）
/// - `filter` / `filter_by`: 絞り込みの生パラメータ（空文字列 = 未指定）
/// - `pagination`: `pagination` パラメータの遅延パーサ。`Ok(None)` は未指定、
///   正の値のみがリミットとして採用される
/// - `allowed`: 生パラメータ経由の絞り込みに適用する許可リスト
/// - `clock`: トークンの鮮度判定に使用する時刻プロバイダ
///
/// # エラー
///
/// 壊れたトークン、不正な `pagination`、対になっていない絞り込み、
/// 許可されていない `filterBy` に対して [`PageTokenError`] を返す。
pub fn resolve_page(
   raw_token: &str,
   filter: &str,
   filter_by: &str,
   pagination: impl FnOnce() -> Result<Option<i64>, PageTokenError>,
   allowed: &AllowedFilters,
   clock: &dyn Clock,
) -> Result<PageSelection, PageTokenError> {
   if !raw_token.is_empty() {
      let bytes = STANDARD.decode(raw_token)?;
      let wire: PageTokenWire = serde_json::from_slice(&bytes)?;

      let age = clock.now().signed_duration_since(wire.time);
      if age < Duration::minutes(TOKEN_TTL_MINUTES) {
         // 有効なトークンは自己完結。生パラメータは一切見ない。
         let filter = (!wire.filter_by.is_empty() && !wire.filter.is_empty())
            .then(|| Filter::new(wire.filter_by, wire.filter));
         return Ok(PageSelection {
            limit: (wire.limit > 0).then_some(wire.limit),
            offset: wire.offset,
            filter,
         });
      }
      // 期限切れトークンは limit / offset / filter ごと破棄する
   }

   let limit = pagination()?.filter(|v| *v > 0);

   let filter = match (filter.is_empty(), filter_by.is_empty()) {
      (true, true) => None,
      (false, false) => {
         if !allowed.contains(filter_by) {
            return Err(PageTokenError::UnsupportedFilter(filter_by.to_owned()));
         }
         Some(Filter::new(filter_by, filter))
      }
      _ => return Err(PageTokenError::FilterPairing),
   };

   Ok(PageSelection {
      limit,
      offset: 0,
      filter,
   })
}

/// 次ページが存在する場合にトークンを発行する
///
/// 次ページは `limit > 0 && offset >= 0 &&
/// total_matches - (offset + limit) > 0` のときに存在する。
/// 存在しない場合は `None` を返し、呼び出し側はフィールド自体を省略する
/// （空文字列は返さない）。
pub fn next_page_token(
   limit: Option<i64>,
   offset: i64,
   total_matches: i64,
   filter: Option<&Filter>,
   clock: &dyn Clock,
) -> Option<String> {
   let limit = limit.unwrap_or(NO_LIMIT);
   if limit <= 0 || offset < 0 || total_matches - (offset + limit) <= 0 {
      return None;
   }

   let wire = PageTokenWire {
      limit,
      // 次ページのオフセットには現在の limit をそのまま設定する（ワイヤ互換）
      offset: limit,
      filter_by: filter.map(|f| f.field().to_owned()).unwrap_or_default(),
      filter: filter.map(|f| f.value().to_owned()).unwrap_or_default(),
      time: clock.now(),
   };

   let json = serde_json::to_vec(&wire).expect("ページトークンのシリアライズは失敗しない");
   Some(STANDARD.encode(json))
}
