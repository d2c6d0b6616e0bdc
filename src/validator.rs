//! Validator Module
//!
//! デコード前にアップロードリクエストを検査し、クライアント起因の不備を
//! 分類済みの拒否として返すモジュール。
//!
//! 検査は次の固定順で行い、最初に失敗した検査の結果を返します。
//!
//! 1. メソッドが`POST`であること
//! 2. `file`フィールドが存在し、中身のあるファイルであること
//! 3. ファイルサイズが上限以下であること
//! 4. 申告されたContent-Typeが受け付け対象であること

use thiserror::Error;

use crate::api::SpreadsheetFormat;
use crate::response::StatusCode;
use crate::types::{FormField, UploadRequest, UploadedFile};

/// 1MiB（バイト）
pub(crate) const MIB: u64 = 1024 * 1024;

/// デフォルトのアップロード上限: 5MiB
pub(crate) const DEFAULT_MAX_UPLOAD_SIZE: u64 = 5 * MIB;

/// 拒否レスポンスのステータスと本文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionText {
    /// ステータスコード
    pub status: StatusCode,

    /// レスポンス本文
    pub message: String,
}

impl RejectionText {
    /// 新しい拒否テキストを生成
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// 検証設定
///
/// 構築時に一度だけ与えられる不変の設定です。プロセス全体の状態には依存しません。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidatorConfig {
    /// アップロードファイルの最大サイズ（バイト）
    /// デフォルト: 5MiB (5_242_880 bytes)
    pub max_upload_size: u64,

    /// 受け付ける形式（この順序でエラーメッセージに列挙される）
    pub accepted_formats: Vec<SpreadsheetFormat>,

    /// POST以外のメソッドに対する応答
    pub method_rejection: RejectionText,

    /// `file`フィールドが不正な場合の本文
    pub invalid_upload_message: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            accepted_formats: vec![SpreadsheetFormat::Xlsx, SpreadsheetFormat::Xls],
            method_rejection: RejectionText::new(
                StatusCode::METHOD_NOT_ALLOWED,
                "Method Not Allowed",
            ),
            invalid_upload_message: "Invalid file upload".to_string(),
        }
    }
}

/// クライアント起因の拒否
///
/// 想定内の入力ばらつきであり、処理エラーとしては記録しません。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// POST以外のメソッド
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// `file`フィールドが存在しない、ファイルではない、または空
    #[error("invalid or missing upload")]
    InvalidUpload,

    /// ファイルサイズが上限を超えている
    #[error("payload too large: {size} bytes (max: {limit_bytes} bytes)")]
    PayloadTooLarge {
        /// 実際のサイズ
        size: u64,
        /// 設定された上限
        limit_bytes: u64,
    },

    /// 受け付け対象外のContent-Type
    #[error("unsupported media type: '{content_type}'")]
    UnsupportedMediaType {
        /// クライアントが申告したContent-Type
        content_type: String,
        /// 受け付け対象の形式
        accepted: Vec<SpreadsheetFormat>,
    },
}

impl Rejection {
    /// 拒否に対応するステータスコード
    pub(crate) fn status(&self, config: &ValidatorConfig) -> StatusCode {
        match self {
            Rejection::MethodNotAllowed(_) => config.method_rejection.status,
            Rejection::InvalidUpload => StatusCode::BAD_REQUEST,
            Rejection::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Rejection::UnsupportedMediaType { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// レスポンス本文（互換性のため文言は固定）
    pub(crate) fn message(&self, config: &ValidatorConfig) -> String {
        match self {
            Rejection::MethodNotAllowed(_) => config.method_rejection.message.clone(),
            Rejection::InvalidUpload => config.invalid_upload_message.clone(),
            Rejection::PayloadTooLarge { limit_bytes, .. } => {
                format!("File exceeds {}MB limit", format_mib(*limit_bytes))
            }
            Rejection::UnsupportedMediaType { accepted, .. } => {
                let labels: Vec<&str> = accepted.iter().map(|f| f.label()).collect();
                format!(
                    "Invalid file type. Please upload an Excel file ({})",
                    labels.join(" or ")
                )
            }
        }
    }
}

/// バイト数をMiB表記に変換（整数になる場合は小数点なし）
fn format_mib(bytes: u64) -> String {
    if bytes % MIB == 0 {
        (bytes / MIB).to_string()
    } else {
        (bytes as f64 / MIB as f64).to_string()
    }
}

/// リクエストバリデーター
#[derive(Debug, Clone)]
pub(crate) struct RequestValidator {
    config: ValidatorConfig,
}

impl RequestValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// リクエストを検証し、デコード対象のファイルと形式を返す
    ///
    /// # 戻り値
    ///
    /// * `Ok((&UploadedFile, SpreadsheetFormat))` - すべての検査に合格した場合
    /// * `Err(Rejection)` - 最初に失敗した検査の拒否
    pub fn validate<'a>(
        &self,
        request: &'a UploadRequest,
    ) -> Result<(&'a UploadedFile, SpreadsheetFormat), Rejection> {
        // 1. メソッド
        if request.method != "POST" {
            return Err(Rejection::MethodNotAllowed(request.method.clone()));
        }

        // 2. fileフィールド
        let file = match &request.file {
            Some(FormField::File(file)) if !file.is_empty() => file,
            _ => return Err(Rejection::InvalidUpload),
        };

        // 3. サイズ上限
        let size = file.len() as u64;
        if size > self.config.max_upload_size {
            return Err(Rejection::PayloadTooLarge {
                size,
                limit_bytes: self.config.max_upload_size,
            });
        }

        // 4. Content-Type
        match SpreadsheetFormat::from_mime(&file.content_type) {
            Some(format) if self.config.accepted_formats.contains(&format) => Ok((file, format)),
            _ => Err(Rejection::UnsupportedMediaType {
                content_type: file.content_type.clone(),
                accepted: self.config.accepted_formats.clone(),
            }),
        }
    }
}
