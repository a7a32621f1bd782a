//! 表格读取
//!
//! 通过 calamine 读取第一个工作表，不解析表头，第一行即第0行。

use std::{
    io::{Cursor, Read, Seek},
    path::Path,
};

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs};
use chrono::{Duration, NaiveDate, NaiveTime};

use crate::{Cell, Error, Grid, Result};

/// 从文件路径读取表格
pub fn load_grid<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("spreadsheet not found: {}", path.display()),
        )));
    }

    let mut workbook = open_workbook_auto(path)?;
    let range = first_sheet(&mut workbook)?;
    let grid = range_to_grid(&range);
    tracing::debug!("Loaded {} rows from {}", grid.height(), path.display());
    Ok(grid)
}

/// 从内存中的文件内容读取表格
pub fn load_grid_from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Grid> {
    load_grid_from_reader(Cursor::new(bytes.into()))
}

/// 从读取器中读取表格，格式自动识别
pub fn load_grid_from_reader<R: Read + Seek + Clone>(reader: R) -> Result<Grid> {
    let mut workbook = open_workbook_auto_from_rs(reader)?;
    let range = first_sheet(&mut workbook)?;
    Ok(range_to_grid(&range))
}

fn first_sheet<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<Range<Data>> {
    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(Error::Spreadsheet(calamine::Error::Msg(
            "Workbook contains no worksheets",
        )))?;
    Ok(workbook.worksheet_range(&name)?)
}

/// 将 calamine 的区域转换为从 A1 开始的表格
///
/// 已用区域可能不从 A1 开始，这里补齐前面的空行空列以保持绝对位置。
fn range_to_grid(range: &Range<Data>) -> Grid {
    let Some((start_row, start_col)) = range.start() else {
        return Grid::default();
    };
    let (start_row, start_col) = (start_row as usize, start_col as usize);

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col];
        cells.extend(row.iter().map(convert_cell));
        rows.push(cells);
    }
    Grid::new(rows)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::from(s.as_str()),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Text(excel_serial_text(dt.as_f64())),
        Data::Error(_) | Data::Empty => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

/// 把 Excel 日期序列值转换为显示文本
///
/// 纯时间（小于1天）显示为 `9:00` 或 `9:00:30`，带日期的显示为
/// `2024-10-14` 或 `2024-10-14 9:00`。
fn excel_serial_text(serial: f64) -> String {
    if !serial.is_finite() || serial < 0.0 {
        return serial.to_string();
    }

    let total_secs = (serial * 86_400.0).round() as i64;
    let (days, secs) = (total_secs / 86_400, total_secs % 86_400);
    let time = NaiveTime::from_num_seconds_from_midnight_opt(secs as u32, 0)
        .unwrap_or(NaiveTime::MIN);
    let time_text = if secs % 60 == 0 {
        time.format("%-H:%M").to_string()
    } else {
        time.format("%-H:%M:%S").to_string()
    };

    if days == 0 {
        return time_text;
    }

    // 1900 日期系统把 1900-02-29 当作存在的日子
    let days = if days < 60 { days + 1 } else { days };
    let date = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|epoch| epoch.checked_add_signed(Duration::days(days)));
    match date {
        Some(date) if secs == 0 => date.format("%Y-%m-%d").to_string(),
        Some(date) => format!("{} {}", date.format("%Y-%m-%d"), time_text),
        None => serial.to_string(),
    }
}
