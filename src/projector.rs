//! Projector Module
//!
//! デコード済みシートをJSON形状の出力に変換するモジュール。
//! I/Oを持たない純粋な変換で、どの入力に対しても失敗しません。

use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::ProjectionMode;
use crate::error::XlsxToJsonError;
use crate::types::{CellValue, Sheet};

/// ヘッダー付きプロジェクションの1行分
///
/// キー順はヘッダー列の順序に従います。
pub type RowObject = Map<String, Value>;

/// ヘッダー付きプロジェクションの結果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResult {
    /// データ行（ヘッダー行を除く）
    pub data: Vec<RowObject>,

    /// データ行数（元の行数 - 1）
    pub total_rows: usize,

    /// ヘッダー列数
    pub total_columns: usize,
}

/// プロジェクション結果
///
/// 一度構築された後は変更されない、レスポンス用の最終成果物です。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProjectedResult {
    /// 行を配列のまま出力した結果
    Rows(Sheet),

    /// 行がひとつもないシートのヘッダー付きプロジェクション（`{}`）
    Empty {},

    /// ヘッダー付きプロジェクションの結果
    Table(TableResult),
}

impl ProjectedResult {
    /// JSONバイト列に変換
    ///
    /// 同じ結果からは常に同じバイト列が得られます。
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, XlsxToJsonError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// シートプロジェクター
#[derive(Debug, Clone, Copy, Default)]
pub struct SheetProjector {
    mode: ProjectionMode,
}

impl SheetProjector {
    /// 指定したモードのプロジェクターを生成
    pub fn new(mode: ProjectionMode) -> Self {
        Self { mode }
    }

    /// 現在のモード
    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    /// シートを出力形状に変換する
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxjson::{CellValue, ProjectionMode, Sheet, SheetProjector};
    ///
    /// let sheet = Sheet::new(vec![
    ///     vec![CellValue::from("Name"), CellValue::from("Age")],
    ///     vec![CellValue::from("John Doe"), CellValue::Number(30.0)],
    /// ]);
    ///
    /// let result = SheetProjector::new(ProjectionMode::RowsAsObjects).project(&sheet);
    /// let json = String::from_utf8(result.to_json_bytes().unwrap()).unwrap();
    /// assert_eq!(
    ///     json,
    ///     r#"{"data":[{"Name":"John Doe","Age":30}],"totalRows":1,"totalColumns":2}"#
    /// );
    /// ```
    pub fn project(&self, sheet: &Sheet) -> ProjectedResult {
        match self.mode {
            ProjectionMode::RowsAsArrays => ProjectedResult::Rows(sheet.clone()),
            ProjectionMode::RowsAsObjects => Self::project_objects(sheet),
        }
    }

    fn project_objects(sheet: &Sheet) -> ProjectedResult {
        let Some((header_row, data_rows)) = sheet.rows().split_first() else {
            return ProjectedResult::Empty {};
        };

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_header_string().trim().to_string())
            .collect();

        let data = data_rows
            .iter()
            .map(|row| Self::row_object(&headers, row))
            .collect();

        ProjectedResult::Table(TableResult {
            data,
            total_rows: data_rows.len(),
            total_columns: headers.len(),
        })
    }

    /// 1行をヘッダーキーのオブジェクトに変換する
    ///
    /// ヘッダー幅を超えるセルは捨て、足りないセルは`null`で埋める。
    /// 同じヘッダーが複数ある場合は後の列の値で上書きする（キー位置は最初の列のまま）。
    fn row_object(headers: &[String], row: &[CellValue]) -> RowObject {
        let mut object = Map::with_capacity(headers.len());
        for (col, header) in headers.iter().enumerate() {
            let value = row.get(col).map(Value::from).unwrap_or(Value::Null);
            object.insert(header.clone(), value);
        }
        object
    }
}
