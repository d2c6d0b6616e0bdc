//! Decoder Module
//!
//! calamineを使用してスプレッドシートのバイト列を稠密なグリッドに変換するモジュール。
//! コンテナ形式の解析自体はcalamineに委ね、ここでは形式の選択・先頭シートの選択・
//! セル型の対応付けだけを行います。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Xls, Xlsx};
use std::io::{Cursor, Read, Seek};

use crate::api::SpreadsheetFormat;
use crate::error::XlsxToJsonError;
use crate::types::{CellValue, Sheet};

/// デコーダーが受け付ける入力の上限: 2GiB
const DEFAULT_MAX_INPUT_SIZE: u64 = 2_147_483_648;

/// スプレッドシートデコーダー
///
/// 生のバイト列と形式のヒントから、先頭シートを稠密な2次元配列として返します。
/// 失敗は例外ではなく`Result`で表現し、境界で500レスポンスに変換されます。
///
/// クロージャもデコーダーとして使用できます。
///
/// ```rust
/// use xlsxjson::{CellValue, Sheet, SpreadsheetDecoder, SpreadsheetFormat, XlsxToJsonError};
///
/// let fixed = |_: &[u8], _: SpreadsheetFormat| -> Result<Sheet, XlsxToJsonError> {
///     Ok(Sheet::new(vec![vec![CellValue::from("only")]]))
/// };
/// let sheet = fixed.decode(b"ignored", SpreadsheetFormat::Xlsx).unwrap();
/// assert_eq!(sheet.row_count(), 1);
/// ```
pub trait SpreadsheetDecoder {
    /// バイト列をデコードする
    ///
    /// # 引数
    ///
    /// * `bytes` - スプレッドシート本体
    /// * `format` - クライアントが申告したContent-Typeから判定した形式
    ///
    /// # 戻り値
    ///
    /// * `Ok(Sheet)` - 先頭シート（シートが存在しない場合は空のシート）
    /// * `Err(XlsxToJsonError)` - デコードに失敗した場合
    fn decode(&self, bytes: &[u8], format: SpreadsheetFormat) -> Result<Sheet, XlsxToJsonError>;
}

impl<F> SpreadsheetDecoder for F
where
    F: Fn(&[u8], SpreadsheetFormat) -> Result<Sheet, XlsxToJsonError>,
{
    fn decode(&self, bytes: &[u8], format: SpreadsheetFormat) -> Result<Sheet, XlsxToJsonError> {
        self(bytes, format)
    }
}

/// calamineによるデフォルトのデコーダー
///
/// まずヒントの形式で開き、失敗した場合は内容から形式を自動判定して再試行します。
/// 両方失敗した場合はヒントの形式でのエラーを返します。
#[derive(Debug, Clone)]
pub struct CalamineDecoder {
    /// 入力の最大サイズ（バイト）
    max_input_size: u64,
}

impl Default for CalamineDecoder {
    fn default() -> Self {
        Self {
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
        }
    }
}

impl CalamineDecoder {
    /// デフォルト設定のデコーダーを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// 入力の最大サイズを指定する
    pub fn with_max_input_size(mut self, max_input_size: u64) -> Self {
        self.max_input_size = max_input_size;
        self
    }

    fn decode_as(bytes: &[u8], format: SpreadsheetFormat) -> Result<Sheet, XlsxToJsonError> {
        match format {
            SpreadsheetFormat::Xlsx => {
                let mut workbook: Xlsx<_> =
                    Xlsx::new(Cursor::new(bytes)).map_err(calamine::Error::from)?;
                first_sheet(&mut workbook)
            }
            SpreadsheetFormat::Xls => {
                let mut workbook: Xls<_> =
                    Xls::new(Cursor::new(bytes)).map_err(calamine::Error::from)?;
                first_sheet(&mut workbook)
            }
        }
    }

    fn decode_auto(bytes: &[u8]) -> Result<Sheet, XlsxToJsonError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        first_sheet(&mut workbook)
    }
}

impl SpreadsheetDecoder for CalamineDecoder {
    fn decode(&self, bytes: &[u8], format: SpreadsheetFormat) -> Result<Sheet, XlsxToJsonError> {
        if bytes.len() as u64 > self.max_input_size {
            return Err(XlsxToJsonError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                bytes.len(),
                self.max_input_size
            )));
        }

        match Self::decode_as(bytes, format) {
            Ok(sheet) => Ok(sheet),
            Err(hinted) => {
                log::warn!(
                    "could not open upload as {}: {}; retrying with format detection",
                    format.label(),
                    hinted
                );
                Self::decode_auto(bytes).map_err(|_| hinted)
            }
        }
    }
}

/// 先頭シートを取り出す（シートが存在しない場合は空のシート）
fn first_sheet<RS, R>(workbook: &mut R) -> Result<Sheet, XlsxToJsonError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: Into<calamine::Error>,
{
    match workbook.worksheet_range_at(0) {
        Some(range) => {
            let range = range.map_err(|e| -> calamine::Error { e.into() })?;
            Ok(range_to_sheet(&range))
        }
        None => Ok(Sheet::default()),
    }
}

/// calamineの範囲をシートに変換する
///
/// グリッドの起点はcalamineが報告する使用範囲の左上で、先頭の空行・空列は含まない。
/// calamineの範囲は矩形のため、各行の末尾の空セルは取り除き、行ごとの長さを
/// 実際に値のある最後の列までに揃える。
fn range_to_sheet(range: &Range<Data>) -> Sheet {
    let rows: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| {
            let used = row
                .iter()
                .rposition(|cell| !matches!(cell, Data::Empty))
                .map_or(0, |last| last + 1);
            row[..used].iter().map(convert_cell).collect()
        })
        .collect();

    log::debug!(
        "decoded first sheet: {} rows x {} columns",
        rows.len(),
        range.width()
    );

    Sheet::new(rows)
}

/// セル型の対応付け
///
/// 日付はExcelのシリアル値（数値）のまま、エラー値は`#DIV/0!`などの文字列になる。
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(e.to_string()),
        Data::Empty => CellValue::Empty,
    }
}
