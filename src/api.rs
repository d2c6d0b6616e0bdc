//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

use serde::{Deserialize, Serialize};

/// 出力形状（プロジェクションモード）
///
/// デコード済みシートをJSONに変換する際の出力形状を指定します。
/// リクエストごとではなく、エンドポイントの設定として選択します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum ProjectionMode {
    /// 行を配列のまま出力
    ///
    /// ヘッダー抽出を行わず、シートをそのまま配列の配列として出力します。
    ///
    /// # 出力例
    ///
    /// ```json
    /// [["Name", "Age"], ["John Doe", 30]]
    /// ```
    RowsAsArrays,

    /// 1行目をヘッダーとして、各行をオブジェクトとして出力（デフォルト）
    ///
    /// # 出力例
    ///
    /// ```json
    /// {
    ///   "data": [{"Name": "John Doe", "Age": 30}],
    ///   "totalRows": 1,
    ///   "totalColumns": 2
    /// }
    /// ```
    #[default]
    RowsAsObjects,
}

/// 受け付けるスプレッドシート形式
///
/// 各形式は正規のMIMEタイプと1対1で対応します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum SpreadsheetFormat {
    /// Office Open XML形式（.xlsx）
    Xlsx,

    /// レガシーなバイナリ形式（.xls, BIFF8）
    Xls,
}

impl SpreadsheetFormat {
    /// 正規のMIMEタイプ
    pub fn mime_type(&self) -> &'static str {
        match self {
            SpreadsheetFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            SpreadsheetFormat::Xls => "application/vnd.ms-excel",
        }
    }

    /// エラーメッセージ用の表示名（例: `XLSX`）
    pub fn label(&self) -> &'static str {
        match self {
            SpreadsheetFormat::Xlsx => "XLSX",
            SpreadsheetFormat::Xls => "XLS",
        }
    }

    /// Content-Type文字列から形式を判定する
    ///
    /// `; charset=...`などのパラメータ部は無視し、大文字小文字を区別せずに比較します。
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxjson::SpreadsheetFormat;
    ///
    /// assert_eq!(
    ///     SpreadsheetFormat::from_mime("application/vnd.ms-excel; charset=binary"),
    ///     Some(SpreadsheetFormat::Xls)
    /// );
    /// assert_eq!(SpreadsheetFormat::from_mime("text/csv"), None);
    /// ```
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        [SpreadsheetFormat::Xlsx, SpreadsheetFormat::Xls]
            .into_iter()
            .find(|format| format.mime_type().eq_ignore_ascii_case(essence))
    }
}
