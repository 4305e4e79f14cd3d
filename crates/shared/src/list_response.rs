//! # ユーザー一覧レスポンス
//!
//! カーソルベースのページネーションに対応した一覧レスポンス型。

use serde::{Deserialize, Serialize};

/// ページネーション付きユーザー一覧レスポンス
///
/// ## JSON 形式
///
/// ```json
/// {
///   "users": [...],
///   "next_page": "opaque-token-string"
/// }
/// ```
///
/// 次ページが存在しない場合、`next_page` フィールドは出力されない
/// （`null` や空文字列は返さない）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedUsersResponse<T> {
   pub users:     Vec<T>,
   #[serde(skip_serializing_if = "Option::is_none")]
   pub next_page: Option<String>,
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_次ページなしの場合next_pageフィールドは省略される() {
      let response = PagedUsersResponse::<u32> {
         users:     vec![1, 2],
         next_page: None,
      };
      let json = serde_json::to_value(&response).unwrap();

      assert_eq!(json, serde_json::json!({ "users": [1, 2] }));
   }

   #[test]
   fn test_次ページありの場合next_pageフィールドが出力される() {
      let response = PagedUsersResponse::<u32> {
         users:     vec![],
         next_page: Some("token".to_string()),
      };
      let json = serde_json::to_value(&response).unwrap();

      assert_eq!(
         json,
         serde_json::json!({ "users": [], "next_page": "token" })
      );
   }
}
