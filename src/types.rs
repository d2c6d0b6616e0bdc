//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。
//! セル値・シート・アップロードリクエストはいずれも1リクエストの間だけ存在します。

use serde::{Serialize, Serializer};

/// セルの値を表す列挙型
///
/// 書式やスタイルの情報は保持しません。
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 文字列
    String(String),

    /// 論理値
    Bool(bool),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// ヘッダー文字列への変換（トリム前）
    ///
    /// 整数値の数値は小数点なしで出力します（`30.0` -> `"30"`）。
    /// 1e21以上や1e-6未満の絶対値は指数表記（`"1e+21"`）になります。
    /// 空セルは空文字列になります。
    pub fn to_header_string(&self) -> String {
        match self {
            CellValue::Number(n) => number_to_header(*n),
            CellValue::String(s) => s.clone(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

/// 数値のヘッダー文字列表現
///
/// ECMAScriptの`Number::toString`と同じ表記にそろえる。
fn number_to_header(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let abs = n.abs();
    if (1e-6..1e21).contains(&abs) {
        return n.to_string();
    }

    // `{:e}`は最短表現の仮数部を返す（`1e21`, `1.5e-7`）
    let exp = format!("{:e}", n);
    match exp.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => exp,
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

// 2^53: これを超える整数はf64で正確に表現できない
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::String(s) => serializer.serialize_str(s),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Empty => serializer.serialize_none(),
        }
    }
}

impl From<&CellValue> for serde_json::Value {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                serde_json::Value::from(*n as i64)
            }
            // 非有限値（NaN, ±∞）はnullになる
            CellValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            CellValue::String(s) => serde_json::Value::String(s.clone()),
            CellValue::Bool(b) => serde_json::Value::Bool(*b),
            CellValue::Empty => serde_json::Value::Null,
        }
    }
}

/// デコード済みシート
///
/// 行の並び。各行はセルの並びで、行ごとの長さは揃っていなくてもよい。
/// ヘッダー付きプロジェクションでは0行目がヘッダー行になります。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Sheet {
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// 行データからシートを生成
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// 行数（ヘッダー行を含む）
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 行がひとつもないかどうか
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// すべての行
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }
}

impl From<Vec<Vec<CellValue>>> for Sheet {
    fn from(rows: Vec<Vec<CellValue>>) -> Self {
        Self::new(rows)
    }
}

/// アップロードされたファイル
///
/// トランスポート層がマルチパートボディを展開した後の状態です。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// クライアントが申告したファイル名
    pub file_name: Option<String>,

    /// クライアントが申告したContent-Type
    pub content_type: String,

    /// ファイル本体
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// 新しいアップロードファイルを生成
    pub fn new(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: None,
            content_type: content_type.into(),
            bytes,
        }
    }

    /// ファイル名を設定
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// バイト長
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// 中身が空かどうか
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// マルチパートフォームの`file`フィールドの値
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    /// ファイルパート
    File(UploadedFile),

    /// テキストパート（ファイルではない）
    Text(String),
}

/// トランスポート非依存のアップロードリクエスト
///
/// # 使用例
///
/// ```rust
/// use xlsxjson::{UploadRequest, UploadedFile};
///
/// let request = UploadRequest::post(UploadedFile::new("application/vnd.ms-excel", vec![0xD0, 0xCF]));
/// assert_eq!(request.method, "POST");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// HTTPメソッド
    pub method: String,

    /// `file`フィールド（存在しない場合は`None`）
    pub file: Option<FormField>,
}

impl UploadRequest {
    /// 任意のメソッドとフィールドからリクエストを生成
    pub fn new(method: impl Into<String>, file: Option<FormField>) -> Self {
        Self {
            method: method.into(),
            file,
        }
    }

    /// ファイル付きのPOSTリクエストを生成
    pub fn post(file: UploadedFile) -> Self {
        Self::new("POST", Some(FormField::File(file)))
    }
}
