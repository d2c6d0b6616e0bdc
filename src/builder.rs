//! Builder Module
//!
//! Fluent Builder APIを提供し、`Endpoint`インスタンスを段階的に構築する。

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use thiserror::Error;

use crate::api::{ProjectionMode, SpreadsheetFormat};
use crate::decoder::{CalamineDecoder, SpreadsheetDecoder};
use crate::error::XlsxToJsonError;
use crate::projector::{ProjectedResult, SheetProjector};
use crate::response::{Response, StatusCode, ALLOW_HEADER, FILE_TYPE_HEADER};
use crate::types::{FormField, UploadRequest};
use crate::validator::{Rejection, RejectionText, RequestValidator, ValidatorConfig};

/// 処理エラー時のレスポンス本文（原因は含めない）
pub(crate) const PROCESSING_ERROR_MESSAGE: &str = "Error processing Excel file";

/// エンドポイントの設定を保持する内部構造体
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EndpointConfig {
    /// リクエスト検証の設定
    pub validator: ValidatorConfig,

    /// 出力形状
    pub projection_mode: ProjectionMode,

    /// 診断ヘッダー（処理時間・ファイル種別）を付与するか
    pub diagnostic_headers: bool,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            validator: ValidatorConfig::default(),
            projection_mode: ProjectionMode::RowsAsObjects,
            diagnostic_headers: false,
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust
/// use xlsxjson::{EndpointBuilder, ProjectionMode, SpreadsheetFormat};
///
/// # fn main() -> Result<(), xlsxjson::XlsxToJsonError> {
/// let endpoint = EndpointBuilder::new()
///     .with_max_upload_size(10 * 1024 * 1024)
///     .with_accepted_formats(vec![SpreadsheetFormat::Xlsx])
///     .with_projection_mode(ProjectionMode::RowsAsArrays)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct EndpointBuilder {
    /// 内部設定（構築中）
    config: EndpointConfig,
}

impl EndpointBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - アップロード上限: 5MiB
    /// - 受け付ける形式: XLSX, XLS
    /// - 出力形状: ヘッダー付きオブジェクト
    /// - POST以外: 405 `Method Not Allowed`
    /// - `file`フィールド不正: 400 `Invalid file upload`
    /// - 診断ヘッダー: なし
    pub fn new() -> Self {
        Self::default()
    }

    /// アップロードファイルの最大サイズ（バイト）を指定する
    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.config.validator.max_upload_size = bytes;
        self
    }

    /// 受け付ける形式を指定する
    ///
    /// 指定した順序が、拒否メッセージ中の形式名の順序になります。
    ///
    /// ```rust
    /// use xlsxjson::{EndpointBuilder, SpreadsheetFormat};
    ///
    /// // XLSXのみを受け付ける
    /// let builder = EndpointBuilder::new()
    ///     .with_accepted_formats(vec![SpreadsheetFormat::Xlsx]);
    /// ```
    pub fn with_accepted_formats(mut self, formats: Vec<SpreadsheetFormat>) -> Self {
        self.config.validator.accepted_formats = formats;
        self
    }

    /// 出力形状を指定する
    pub fn with_projection_mode(mut self, mode: ProjectionMode) -> Self {
        self.config.projection_mode = mode;
        self
    }

    /// POST以外のメソッドに対するステータスと本文を指定する
    ///
    /// ```rust
    /// use xlsxjson::{EndpointBuilder, StatusCode};
    ///
    /// let builder = EndpointBuilder::new()
    ///     .with_method_rejection(StatusCode::BAD_REQUEST, "Send an XLSX file via POST");
    /// ```
    pub fn with_method_rejection(mut self, status: StatusCode, message: impl Into<String>) -> Self {
        self.config.validator.method_rejection = RejectionText::new(status, message);
        self
    }

    /// `file`フィールドが不正な場合の本文を指定する
    pub fn with_invalid_upload_message(mut self, message: impl Into<String>) -> Self {
        self.config.validator.invalid_upload_message = message.into();
        self
    }

    /// 診断ヘッダー（`X-Processing-Time`, `X-File-Type`）を付与するかを指定する
    ///
    /// 診断ヘッダーはステータスや本文には影響しません。
    pub fn with_diagnostic_headers(mut self, enabled: bool) -> Self {
        self.config.diagnostic_headers = enabled;
        self
    }

    /// 設定を検証し、デフォルトのデコーダーで`Endpoint`を生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsxToJsonError::Config(String)`: 設定の検証に失敗した場合
    ///   * アップロード上限が0
    ///   * 受け付ける形式が空
    ///   * メソッド拒否のステータスが4xxではない
    pub fn build(self) -> Result<Endpoint, XlsxToJsonError> {
        self.build_with_decoder(CalamineDecoder::new())
    }

    /// 設定を検証し、指定したデコーダーで`Endpoint`を生成する
    pub fn build_with_decoder<D: SpreadsheetDecoder>(
        self,
        decoder: D,
    ) -> Result<Endpoint<D>, XlsxToJsonError> {
        let validator = &self.config.validator;

        // 1. アップロード上限の検証
        if validator.max_upload_size == 0 {
            return Err(XlsxToJsonError::Config(
                "Maximum upload size must be greater than 0".to_string(),
            ));
        }

        // 2. 受け付ける形式の検証
        if validator.accepted_formats.is_empty() {
            return Err(XlsxToJsonError::Config(
                "At least one accepted format is required".to_string(),
            ));
        }

        // 3. メソッド拒否ステータスの検証
        if !validator.method_rejection.status.is_client_error() {
            return Err(XlsxToJsonError::Config(format!(
                "Method rejection status must be 4xx: {}",
                validator.method_rejection.status
            )));
        }

        // 4. Endpointインスタンス生成
        Ok(Endpoint::new(self.config, decoder))
    }
}

/// 境界で区別される2種類の失敗
#[derive(Error, Debug)]
pub enum HandlerError {
    /// クライアント起因の拒否（4xx）
    #[error("request rejected: {0}")]
    Rejected(#[from] Rejection),

    /// デコード・変換中の処理エラー（500）
    #[error("processing failed: {0}")]
    Processing(#[from] XlsxToJsonError),
}

/// アップロード処理のファサード
///
/// 検証 → デコード → プロジェクション → JSONの順に処理します。
/// リクエスト間で共有される可変状態は持たず、各リクエストは独立して処理されます。
///
/// # 使用例
///
/// ```rust
/// use xlsxjson::{EndpointBuilder, UploadRequest};
///
/// # fn main() -> Result<(), xlsxjson::XlsxToJsonError> {
/// let endpoint = EndpointBuilder::new().build()?;
/// let response = endpoint.handle(&UploadRequest::new("GET", None));
/// assert_eq!(response.status.as_u16(), 405);
/// assert_eq!(response.body_text(), "Method Not Allowed");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Endpoint<D = CalamineDecoder> {
    /// エンドポイント設定
    config: EndpointConfig,

    /// リクエストバリデーター
    validator: RequestValidator,

    /// シートプロジェクター
    projector: SheetProjector,

    /// スプレッドシートデコーダー
    decoder: D,
}

impl<D: SpreadsheetDecoder> Endpoint<D> {
    pub(crate) fn new(config: EndpointConfig, decoder: D) -> Self {
        Self {
            validator: RequestValidator::new(config.validator.clone()),
            projector: SheetProjector::new(config.projection_mode),
            config,
            decoder,
        }
    }

    /// 出力形状
    pub fn projection_mode(&self) -> ProjectionMode {
        self.config.projection_mode
    }

    /// アップロード上限（バイト）
    pub fn max_upload_size(&self) -> u64 {
        self.config.validator.max_upload_size
    }

    /// リクエストを処理し、型付きの結果を返す
    ///
    /// レスポンスを独自に組み立てたい呼び出し側向けです。
    ///
    /// # 戻り値
    ///
    /// * `Ok(ProjectedResult)` - 処理に成功した場合
    /// * `Err(HandlerError::Rejected)` - 検証で拒否された場合
    /// * `Err(HandlerError::Processing)` - デコードに失敗した場合（デコーダーのパニックを含む）
    pub fn process(&self, request: &UploadRequest) -> Result<ProjectedResult, HandlerError> {
        let (file, format) = self.validator.validate(request)?;
        let sheet = panic::catch_unwind(AssertUnwindSafe(|| {
            self.decoder.decode(&file.bytes, format)
        }))
        .map_err(|payload| XlsxToJsonError::DecoderPanic(panic_message(payload.as_ref())))??;
        Ok(self.projector.project(&sheet))
    }

    /// リクエストを処理し、レスポンスを返す
    ///
    /// # 処理フロー
    ///
    /// 1. RequestValidatorによる検証（失敗時は4xx、ログは`debug`のみ）
    /// 2. SpreadsheetDecoderによるデコード
    /// 3. SheetProjectorによるプロジェクション
    /// 4. JSONへのシリアライズ
    ///
    /// 2〜4の失敗は`error`でログに記録し、固定文言の500を返します。
    /// 失敗の原因はレスポンス本文に含めません。
    pub fn handle(&self, request: &UploadRequest) -> Response {
        let started = Instant::now();

        let response = match self.process(request) {
            Ok(result) => match Response::json(&result) {
                Ok(response) => response,
                Err(e) => self.processing_failure(&e),
            },
            Err(HandlerError::Rejected(rejection)) => {
                log::debug!("rejected upload: {}", rejection);
                self.rejection_response(&rejection)
            }
            Err(HandlerError::Processing(e)) => self.processing_failure(&e),
        };

        if !self.config.diagnostic_headers {
            return response;
        }

        let response = response.with_processing_time(started.elapsed());
        match request.file.as_ref() {
            Some(FormField::File(file)) => {
                response.with_header(FILE_TYPE_HEADER, file.content_type.clone())
            }
            _ => response,
        }
    }

    /// 拒否を固定文言のレスポンスに変換する
    ///
    /// `process()`の結果から独自にレスポンスを組み立てる場合に使用します。
    /// 405で拒否する場合は`Allow: POST`を付与します。
    pub fn rejection_response(&self, rejection: &Rejection) -> Response {
        let config = self.validator.config();
        let status = rejection.status(config);
        let response = Response::text(status, rejection.message(config));

        match rejection {
            Rejection::MethodNotAllowed(_) if status == StatusCode::METHOD_NOT_ALLOWED => {
                response.with_header(ALLOW_HEADER, "POST")
            }
            _ => response,
        }
    }

    fn processing_failure(&self, error: &XlsxToJsonError) -> Response {
        log::error!("{}: {}", PROCESSING_ERROR_MESSAGE, error);
        Response::text(StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_ERROR_MESSAGE)
    }
}

/// パニックのペイロードからメッセージを取り出す
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
