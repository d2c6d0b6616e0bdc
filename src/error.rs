//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//!
//! クライアント起因の拒否（[`Rejection`](crate::Rejection)）はここではなく
//! `validator`モジュールで定義します。このモジュールのエラーはすべて
//! 処理エラー（HTTP 500相当）として扱われます。

use thiserror::Error;

/// xlsxjsonクレート全体で使用するエラー型
///
/// Excelファイルのデコード、JSONへのシリアライズ、設定の検証中に発生する
/// すべてのエラーを統一的に扱うために使用されます。
///
/// # エラーの種類
///
/// - `Parse`: Excelファイルの解析中に発生したエラー（calamine由来）
/// - `Json`: JSONシリアライズ中に発生したエラー
/// - `Config`: 設定の検証に失敗したエラー
/// - `SecurityViolation`: デコーダー側の入力サイズ上限に違反したエラー
/// - `DecoderPanic`: デコーダーがパニックしたエラー
#[derive(Error, Debug)]
pub enum XlsxToJsonError {
    /// Excelファイルの解析中に発生したエラー
    ///
    /// calamineクレートがExcelファイルを解析する際に発生したエラーです。
    /// ファイル形式が不正、破損したファイル、Content-Typeと中身の不一致などが
    /// 原因となります。
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// JSONシリアライズ中に発生したエラー
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `EndpointBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。
    ///
    /// # 例
    ///
    /// ```rust
    /// use xlsxjson::{EndpointBuilder, XlsxToJsonError};
    ///
    /// let result = EndpointBuilder::new().with_max_upload_size(0).build();
    ///
    /// match result {
    ///     Err(XlsxToJsonError::Config(msg)) => {
    ///         println!("設定エラー: {}", msg);
    ///     }
    ///     _ => panic!("expected a configuration error"),
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// デコーダーに渡された入力がデコーダー自身の上限を超えた場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),

    /// デコーダーがパニックしたエラー
    ///
    /// パニックは`Endpoint`の境界で捕捉され、他の処理エラーと同じく500になります。
    /// 値はパニックメッセージ（取得できない場合は固定文字列）です。
    #[error("Decoder panicked: {0}")]
    DecoderPanic(String),
}
