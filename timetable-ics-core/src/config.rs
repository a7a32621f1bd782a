use std::path::Path;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Error, Result};

/// 固定时区名称
pub const TIMEZONE_NAME: &str = "Asia/Kolkata";

/// 固定时区偏移（UTC+05:30，无夏令时）
const TIMEZONE_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

pub const DEFAULT_PROD_ID: &str = "-//Class Timetable//mxm.dk//";

/// 所有时间都落在这个固定时区
pub fn fixed_timezone() -> FixedOffset {
    FixedOffset::east_opt(TIMEZONE_OFFSET_SECS).expect("constant offset is within range")
}

/// 课程表在表格中的位置布局
///
/// 默认值对应常见的课表模板：A2 为上课地点，B-F 列为周一到周五，
/// 第4行到第25行为课程区域，每节课占4行，A 列为时间段标签。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    /// 地点所在行
    pub location_row: usize,
    /// 地点所在列
    pub location_column: usize,
    /// 时间段标签所在列
    pub time_column: usize,
    /// 周一到周五对应的列，位置即相对周一的天数
    pub day_columns: Vec<usize>,
    /// 扫描起始行（含）
    pub first_row: usize,
    /// 扫描结束行（不含）
    pub end_row: usize,
    /// 每个课程块的行数
    pub block_height: usize,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            location_row: 1,
            location_column: 0,
            time_column: 0,
            day_columns: vec![1, 2, 3, 4, 5],
            first_row: 3,
            end_row: 25,
            block_height: 4,
        }
    }
}

impl GridLayout {
    pub fn from_json(json: &str) -> Result<Self> {
        load_json(json)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_height == 0 {
            return Err(Error::Config("block_height must be at least 1".to_string()));
        }
        if self.day_columns.is_empty() {
            return Err(Error::Config("day_columns must not be empty".to_string()));
        }
        if self.day_columns.len() > 7 {
            return Err(Error::Config(format!(
                "day_columns has {} entries, a week has at most 7 days",
                self.day_columns.len()
            )));
        }
        if self.first_row >= self.end_row {
            return Err(Error::Config(format!(
                "first_row ({}) must be below end_row ({})",
                self.first_row, self.end_row
            )));
        }
        if self.block_height > self.end_row - self.first_row {
            return Err(Error::Config(format!(
                "block_height ({}) exceeds the scan window of {} rows",
                self.block_height,
                self.end_row - self.first_row
            )));
        }
        Ok(())
    }
}

/// 生成哪几周的课程
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekSpan {
    /// 仅本周
    #[default]
    Current,
    /// 本周和下周
    CurrentAndNext,
}

impl WeekSpan {
    pub fn week_count(self) -> u32 {
        match self {
            WeekSpan::Current => 1,
            WeekSpan::CurrentAndNext => 2,
        }
    }
}

/// 提醒设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderOptions {
    pub enabled: bool,
    /// 提前提醒的分钟数，按顺序生成
    pub minutes_before: Vec<u32>,
}

impl Default for ReminderOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            minutes_before: vec![30, 15],
        }
    }
}

impl ReminderOptions {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// 实际生效的提醒分钟数
    pub fn active_minutes(&self) -> &[u32] {
        if self.enabled {
            self.minutes_before.as_slice()
        } else {
            &[]
        }
    }
}

/// 课程提取选项
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    pub layout: GridLayout,
    pub weeks: WeekSpan,
    pub reminders: ReminderOptions,
}

/// ICS生成选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcsOptions {
    pub prod_id: String,
    /// 日历名称
    pub calendar_name: Option<String>,
}

impl Default for IcsOptions {
    fn default() -> Self {
        Self {
            prod_id: DEFAULT_PROD_ID.to_string(),
            calendar_name: None,
        }
    }
}

/// 完整转换选项，可从JSON文件加载
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub extract: ExtractOptions,
    pub ics: IcsOptions,
}

impl ConvertOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        load_json(json)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

fn load_json<T: DeserializeOwned>(json: &str) -> Result<T> {
    Ok(serde_json::from_str(json)?)
}
