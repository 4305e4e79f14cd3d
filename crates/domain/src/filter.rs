//! # 絞り込み条件
//!
//! ユーザー一覧取得の絞り込み条件（カラム名と値のペア）と、
//! 受け付けるカラム名の許可リストを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 用途 |
//! |---|------------|------|
//! | [`Filter`] | 絞り込み条件 | `filterBy`（カラム名）と `filter`（値）のペア |
//! | [`AllowedFilters`] | 許可リスト | 絞り込みに使用可能なカラム名の集合 |
//!
//! ## 設計方針
//!
//! 許可リストは起動時に設定から一度だけ構築し、以降は参照で引き回す。
//! 可変なグローバル状態は持たない。

use std::collections::BTreeSet;

/// 絞り込み条件（カラム名と値のペア）
///
/// フィールドと値の両方が非空であることは生成側で保証する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
   field: String,
   value: String,
}

impl Filter {
   pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
      Self {
         field: field.into(),
         value: value.into(),
      }
   }

   /// 絞り込み対象のカラム名
   pub fn field(&self) -> &str {
      &self.field
   }

   /// 絞り込み値
   pub fn value(&self) -> &str {
      &self.value
   }
}

/// 絞り込みに使用可能なカラム名の許可リスト
///
/// 起動時に設定から構築され、以降は変更されない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedFilters(BTreeSet<String>);

impl AllowedFilters {
   /// カラム名の一覧から許可リストを構築する
   ///
   /// 空文字列は無視する。
   pub fn new<I, S>(fields: I) -> Self
   where
      I: IntoIterator<Item = S>,
      S: Into<String>,
   {
      Self(
         fields
            .into_iter()
            .map(Into::into)
            .filter(|f| !f.is_empty())
            .collect(),
      )
   }

   /// カラム名が許可されているか判定する
   pub fn contains(&self, field: &str) -> bool {
      self.0.contains(field)
   }

   pub fn is_empty(&self) -> bool {
      self.0.is_empty()
   }

   /// 許可されているカラム名を辞書順で返す
   pub fn iter(&self) -> impl Iterator<Item = &str> {
      self.0.iter().map(String::as_str)
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;

   use super::*;

   #[test]
   fn test_許可リストに含まれるカラム名を判定できる() {
      let allowed = AllowedFilters::new(["country", "nickname"]);

      assert!(allowed.contains("country"));
      assert!(allowed.contains("nickname"));
      assert!(!allowed.contains("email"));
   }

   #[test]
   fn test_空文字列のカラム名は無視される() {
      let allowed = AllowedFilters::new(["country", ""]);

      assert_eq!(allowed.iter().collect::<Vec<_>>(), vec!["country"]);
   }

   #[test]
   fn test_空の許可リストは何も許可しない() {
      let allowed = AllowedFilters::default();

      assert!(allowed.is_empty());
      assert!(!allowed.contains("country"));
   }

   #[test]
   fn test_絞り込み条件はフィールドと値を保持する() {
      let filter = Filter::new("country", "NL");

      assert_eq!(filter.field(), "country");
      assert_eq!(filter.value(), "NL");
   }
}
