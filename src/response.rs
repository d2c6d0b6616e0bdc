//! Response Module
//!
//! プロジェクション結果や拒否をトランスポート非依存のレスポンスに組み立てるモジュール。
//! 実際のHTTPサーバーへの受け渡しは呼び出し側の責務です。

use std::fmt;
use std::time::Duration;

use crate::error::XlsxToJsonError;
use crate::projector::ProjectedResult;

/// 処理時間を示す診断ヘッダー
pub const PROCESSING_TIME_HEADER: &str = "X-Processing-Time";

/// アップロードされたファイルの申告Content-Typeを返す診断ヘッダー
pub const FILE_TYPE_HEADER: &str = "X-File-Type";

/// 405応答で許可メソッドを示すヘッダー
pub const ALLOW_HEADER: &str = "Allow";

/// HTTPステータスコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const METHOD_NOT_ALLOWED: StatusCode = StatusCode(405);
    pub const PAYLOAD_TOO_LARGE: StatusCode = StatusCode(413);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    /// 任意のステータスコードを生成
    ///
    /// 100〜599の範囲外の場合は`Config`エラーを返します。
    pub fn from_u16(code: u16) -> Result<Self, XlsxToJsonError> {
        if (100..600).contains(&code) {
            Ok(StatusCode(code))
        } else {
            Err(XlsxToJsonError::Config(format!(
                "Invalid status code: {}",
                code
            )))
        }
    }

    /// 数値としてのステータスコード
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// 4xxかどうか
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.0)
    }

    /// 2xxかどうか
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// トランスポート非依存のレスポンス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// ステータスコード
    pub status: StatusCode,

    /// レスポンスヘッダー（挿入順）
    pub headers: Vec<(String, String)>,

    /// レスポンス本文
    pub body: Vec<u8>,
}

impl Response {
    /// JSONレスポンスを生成（ステータス200）
    ///
    /// # 戻り値
    ///
    /// * `Ok(Response)` - シリアライズに成功した場合
    /// * `Err(XlsxToJsonError::Json)` - シリアライズに失敗した場合
    pub fn json(result: &ProjectedResult) -> Result<Self, XlsxToJsonError> {
        Ok(Self {
            status: StatusCode::OK,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: result.to_json_bytes()?,
        })
    }

    /// プレーンテキストのレスポンスを生成
    pub fn text(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            headers: vec![(
                "Content-Type".to_string(),
                "text/plain; charset=utf-8".to_string(),
            )],
            body: message.into().into_bytes(),
        }
    }

    /// ヘッダーを追加
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 処理時間ヘッダーを追加（ミリ秒単位）
    pub(crate) fn with_processing_time(self, elapsed: Duration) -> Self {
        let millis = elapsed.as_secs_f64() * 1000.0;
        self.with_header(PROCESSING_TIME_HEADER, format!("{:.3}ms", millis))
    }

    /// ヘッダー値を取得（名前は大文字小文字を区別しない）
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// 本文をUTF-8文字列として取得（不正なバイト列は置換される）
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
