//! XLS (BIFF8) fixture builder
//!
//! `rust_xlsxwriter`はXLSを書けないため、CFBコンテナとBIFF8レコードを直接組み立てます。
//! 完全なXLSライターではなく、calamineが先頭シートを読める最小限の構成です。

use std::io::{Cursor, Write};

const RECORD_BOF: u16 = 0x0809;
const RECORD_EOF: u16 = 0x000A;
const RECORD_CODEPAGE: u16 = 0x0042;
const RECORD_WINDOW1: u16 = 0x003D;
const RECORD_FONT: u16 = 0x0031;
const RECORD_XF: u16 = 0x00E0;
const RECORD_BOUNDSHEET: u16 = 0x0085;
const RECORD_SST: u16 = 0x00FC;
const RECORD_DIMENSIONS: u16 = 0x0200;
const RECORD_NUMBER: u16 = 0x0203;
const RECORD_LABELSST: u16 = 0x00FD;

const BOF_VERSION_BIFF8: u16 = 0x0600;
const BOF_DT_WORKBOOK_GLOBALS: u16 = 0x0005;
const BOF_DT_WORKSHEET: u16 = 0x0010;

/// 既定のセルXF（General）
const XF_GENERAL: u16 = 16;

/// XLSのセル値
pub enum XlsCell<'a> {
    Text(&'a str),
    Number(f64),
}

/// 1シートのみのXLSファイルを生成
///
/// `rows`の各セルは(行, 列)の位置にそのまま書き込まれます。
pub fn build_single_sheet_xls(sheet_name: &str, rows: &[Vec<XlsCell<'_>>]) -> Vec<u8> {
    let workbook_stream = build_workbook_stream(sheet_name, rows);

    let cursor = Cursor::new(Vec::new());
    let mut ole = cfb::CompoundFile::create(cursor).unwrap();
    {
        let mut stream = ole.create_stream("Workbook").unwrap();
        stream.write_all(&workbook_stream).unwrap();
    }
    ole.into_inner().into_inner()
}

fn build_workbook_stream(sheet_name: &str, rows: &[Vec<XlsCell<'_>>]) -> Vec<u8> {
    // 共有文字列テーブル（出現順、重複なし）
    let mut strings: Vec<&str> = Vec::new();
    for row in rows {
        for cell in row {
            if let XlsCell::Text(s) = cell {
                if !strings.contains(s) {
                    strings.push(s);
                }
            }
        }
    }

    let mut globals = Vec::<u8>::new();
    push_record(&mut globals, RECORD_BOF, &bof(BOF_DT_WORKBOOK_GLOBALS));
    push_record(&mut globals, RECORD_CODEPAGE, &1252u16.to_le_bytes());
    push_record(&mut globals, RECORD_WINDOW1, &window1());
    push_record(&mut globals, RECORD_FONT, &font("Arial"));

    // スタイルXF 16個の後にセルXFを1つ
    for _ in 0..XF_GENERAL {
        push_record(&mut globals, RECORD_XF, &xf_record(true));
    }
    push_record(&mut globals, RECORD_XF, &xf_record(false));

    let boundsheet_offset_pos = globals.len() + 4;
    let mut boundsheet = Vec::<u8>::new();
    boundsheet.extend_from_slice(&0u32.to_le_bytes()); // lbPlyPos（後で書き換える）
    boundsheet.extend_from_slice(&0u16.to_le_bytes()); // 表示中のワークシート
    write_short_unicode_string(&mut boundsheet, sheet_name);
    push_record(&mut globals, RECORD_BOUNDSHEET, &boundsheet);

    push_record(&mut globals, RECORD_SST, &sst(&strings));
    push_record(&mut globals, RECORD_EOF, &[]);

    let sheet_offset = globals.len() as u32;
    globals[boundsheet_offset_pos..boundsheet_offset_pos + 4]
        .copy_from_slice(&sheet_offset.to_le_bytes());

    globals.extend_from_slice(&build_sheet_stream(rows, &strings));
    globals
}

fn build_sheet_stream(rows: &[Vec<XlsCell<'_>>], strings: &[&str]) -> Vec<u8> {
    let mut sheet = Vec::<u8>::new();
    push_record(&mut sheet, RECORD_BOF, &bof(BOF_DT_WORKSHEET));

    let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u16;
    let mut dims = Vec::<u8>::new();
    dims.extend_from_slice(&0u32.to_le_bytes()); // 先頭行
    dims.extend_from_slice(&(rows.len() as u32).to_le_bytes()); // 最終行 + 1
    dims.extend_from_slice(&0u16.to_le_bytes()); // 先頭列
    dims.extend_from_slice(&width.to_le_bytes()); // 最終列 + 1
    dims.extend_from_slice(&0u16.to_le_bytes()); // 予約
    push_record(&mut sheet, RECORD_DIMENSIONS, &dims);

    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let mut data = Vec::<u8>::new();
            data.extend_from_slice(&(r as u16).to_le_bytes());
            data.extend_from_slice(&(c as u16).to_le_bytes());
            data.extend_from_slice(&XF_GENERAL.to_le_bytes());
            match cell {
                XlsCell::Text(s) => {
                    let isst = strings.iter().position(|x| x == s).unwrap() as u32;
                    data.extend_from_slice(&isst.to_le_bytes());
                    push_record(&mut sheet, RECORD_LABELSST, &data);
                }
                XlsCell::Number(v) => {
                    data.extend_from_slice(&v.to_le_bytes());
                    push_record(&mut sheet, RECORD_NUMBER, &data);
                }
            }
        }
    }

    push_record(&mut sheet, RECORD_EOF, &[]);
    sheet
}

fn push_record(out: &mut Vec<u8>, id: u16, data: &[u8]) {
    out.extend_from_slice(&id.to_le_bytes());
    out.extend_from_slice(&(data.len() as u16).to_le_bytes());
    out.extend_from_slice(data);
}

fn bof(dt: u16) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[0..2].copy_from_slice(&BOF_VERSION_BIFF8.to_le_bytes());
    out[2..4].copy_from_slice(&dt.to_le_bytes());
    out[4..6].copy_from_slice(&0x0DBBu16.to_le_bytes()); // build
    out[6..8].copy_from_slice(&0x07CCu16.to_le_bytes()); // year
    out
}

fn window1() -> [u8; 18] {
    let mut out = [0u8; 18];
    out[14..16].copy_from_slice(&1u16.to_le_bytes()); // cTabSel
    out[16..18].copy_from_slice(&600u16.to_le_bytes()); // wTabRatio
    out
}

fn font(name: &str) -> Vec<u8> {
    let mut out = Vec::<u8>::new();
    out.extend_from_slice(&200u16.to_le_bytes()); // 10pt
    out.extend_from_slice(&0u16.to_le_bytes()); // grbit
    out.extend_from_slice(&0x7FFFu16.to_le_bytes()); // 自動色
    out.extend_from_slice(&400u16.to_le_bytes()); // 標準の太さ
    out.extend_from_slice(&0u16.to_le_bytes()); // 上付き・下付きなし
    out.push(0); // 下線なし
    out.push(0); // family
    out.push(0); // charset
    out.push(0); // 予約
    write_short_unicode_string(&mut out, name);
    out
}

fn xf_record(is_style_xf: bool) -> [u8; 20] {
    let mut out = [0u8; 20];
    // フォント0、表示形式0（General）
    let flags: u16 = 0x0001 | if is_style_xf { 0x0004 } else { 0 };
    out[4..6].copy_from_slice(&flags.to_le_bytes());
    out[6] = 0x20; // General + Bottom
    out[9] = 0x3F;
    out
}

fn sst(strings: &[&str]) -> Vec<u8> {
    let mut out = Vec::<u8>::new();
    let count = strings.len() as u32;
    out.extend_from_slice(&count.to_le_bytes()); // cstTotal
    out.extend_from_slice(&count.to_le_bytes()); // cstUnique
    for s in strings {
        // XLUnicodeRichExtendedString: [cch: u16][flags: u8][chars]
        out.extend_from_slice(&(s.len() as u16).to_le_bytes());
        out.push(0); // 8ビット圧縮
        out.extend_from_slice(s.as_bytes());
    }
    out
}

fn write_short_unicode_string(out: &mut Vec<u8>, s: &str) {
    // ShortXLUnicodeString: [cch: u8][flags: u8][chars]
    out.push(s.len() as u8);
    out.push(0);
    out.extend_from_slice(s.as_bytes());
}
