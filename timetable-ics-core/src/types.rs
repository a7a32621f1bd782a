use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveTime};
use serde::{Deserialize, Serialize};

/// 单元格取值
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// 空单元格或缺失值
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// 单元格的文本形式，去除首尾空白；空白单元格返回 `None`
    pub fn text(&self) -> Option<String> {
        let rendered = match self {
            Cell::Empty => return None,
            Cell::Text(s) => s.trim().to_string(),
            other => other.to_string(),
        };
        if rendered.is_empty() {
            None
        } else {
            Some(rendered)
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text().is_none()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            // 整数值不带小数部分
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// 从表格读入的二维单元格表，行列均从0开始
///
/// 表格读入后只读。越界访问返回空单元格，不会 panic。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// 由字符串行构建表格，空字符串视为空单元格
    pub fn from_text_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|s| Cell::from(s.as_ref())).collect())
            .collect();
        Self { rows }
    }

    /// 行数
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn text(&self, row: usize, col: usize) -> Option<String> {
        self.cell(row, col).text()
    }
}

/// 课程块：同一列中连续若干行描述的一节课
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassBlock {
    /// 课程名所在行（锚点行）
    pub anchor_row: usize,
    /// 所在列
    pub column: usize,
    /// 课程名称
    pub subject: String,
    /// 教师姓名
    pub teacher: Option<String>,
    /// 教室/班级信息（目前不写入日历）
    pub class_info: Option<String>,
    /// 块内非空的时间段标签，保持原顺序
    pub time_labels: Vec<String>,
}

impl ClassBlock {
    /// 构建事件标题：有教师时追加 ` (by 教师)`
    pub fn title(&self) -> String {
        match self.teacher.as_deref() {
            Some(teacher) if !teacher.is_empty() => format!("{} (by {})", self.subject, teacher),
            _ => self.subject.clone(),
        }
    }
}

/// 已解析出上下课时间的课程块，与具体周次无关
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledBlock {
    pub block: ClassBlock,
    /// 在 `day_columns` 中的位置，即相对周一的天数
    pub day_offset: u32,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// 课前提醒
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// 提前分钟数
    pub minutes_before: u32,
    /// 提醒显示内容
    pub message: String,
}

impl Reminder {
    pub fn new(minutes_before: u32, title: &str, location: &str) -> Self {
        Self {
            minutes_before,
            message: format!(
                "Reminder: {} at {} in {} minutes",
                title, location, minutes_before
            ),
        }
    }
}

/// 日历事件：一个课程块在某一天的一次上课
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassEvent {
    pub title: String,
    pub location: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// 生成时间
    pub stamp: DateTime<FixedOffset>,
    pub reminders: Vec<Reminder>,
}

/// 待写出的日历
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub prod_id: String,
    pub version: String,
    /// 日历名称
    pub name: Option<String>,
    pub events: Vec<ClassEvent>,
}
