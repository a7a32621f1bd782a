//! 课程提取
//!
//! 按列（星期）逐行扫描课程区域，识别课程块并解析时间段标签，
//! 结合每周的星期一日期生成日历事件。单个课程块解析失败时直接跳过，
//! 不会中断整个提取过程。

use std::sync::LazyLock;

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use regex::Regex;

use crate::{
    ClassBlock, ClassEvent, Error, Grid, Reminder, Result, ScheduledBlock,
    config::{ExtractOptions, GridLayout, ReminderOptions, fixed_timezone},
};

/// 第一个标签开头的 `H:MM` / `HH:MM`
static START_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})").expect("valid start time regex"));

/// 最后一个标签结尾的 `H:MM` / `HH:MM`
static END_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}):(\d{2})$").expect("valid end time regex"));

/// 时间段解析失败的原因
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeRangeError {
    #[error("no time labels in block")]
    NoLabels,
    #[error("time label does not match H:MM: {0}")]
    PatternMismatch(String),
    #[error("time out of range: {0}")]
    InvalidTime(String),
}

/// 从课程块的时间段标签中解析上下课时间
///
/// 上课时间取第一个标签中第一个 `-` 之前部分开头的 `H:MM`，
/// 下课时间取最后一个标签中最后一个 `-` 之后部分结尾的 `H:MM`。
pub fn parse_time_range(
    labels: &[String],
) -> std::result::Result<(NaiveTime, NaiveTime), TimeRangeError> {
    let (Some(first), Some(last)) = (labels.first(), labels.last()) else {
        return Err(TimeRangeError::NoLabels);
    };

    let head = first.split('-').next().unwrap_or_default();
    let start = START_TIME
        .captures(head)
        .ok_or_else(|| TimeRangeError::PatternMismatch(first.clone()))?;

    let tail = last.rsplit('-').next().unwrap_or_default();
    let end = END_TIME
        .captures(tail)
        .ok_or_else(|| TimeRangeError::PatternMismatch(last.clone()))?;

    let start = strict_time(&start[1], &start[2])?;
    let end = strict_time(&end[1], &end[2])?;
    Ok((start, end))
}

fn strict_time(hour: &str, minute: &str) -> std::result::Result<NaiveTime, TimeRangeError> {
    let invalid = || TimeRangeError::InvalidTime(format!("{}:{}", hour, minute));
    let hour: u32 = hour.parse().map_err(|_| invalid())?;
    let minute: u32 = minute.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// 读取表格中唯一的上课地点，缺失时为空字符串
pub fn extract_location(grid: &Grid, layout: &GridLayout) -> String {
    grid.text(layout.location_row, layout.location_column)
        .unwrap_or_default()
}

/// 课程提取器
#[derive(Debug, Clone)]
pub struct TimetableExtractor {
    layout: GridLayout,
    reminders: ReminderOptions,
}

impl TimetableExtractor {
    pub fn new(options: ExtractOptions) -> Result<Self> {
        options.layout.validate()?;
        Ok(Self {
            layout: options.layout,
            reminders: options.reminders,
        })
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// 扫描所有星期列，返回按星期、行排序的课程块
    pub fn scan_blocks(&self, grid: &Grid) -> Vec<ScheduledBlock> {
        self.layout
            .day_columns
            .iter()
            .enumerate()
            .flat_map(|(day_offset, &column)| self.scan_column(grid, day_offset as u32, column))
            .collect()
    }

    fn scan_column(&self, grid: &Grid, day_offset: u32, column: usize) -> Vec<ScheduledBlock> {
        let height = self.layout.block_height;
        let mut blocks = Vec::new();
        let mut row = self.layout.first_row;
        // 表格之外的行都是空的
        let end_row = self.layout.end_row.min(grid.height());

        while row < end_row {
            let Some(subject) = grid.text(row, column) else {
                row += 1;
                continue;
            };

            let block = ClassBlock {
                anchor_row: row,
                column,
                subject,
                teacher: grid.text(row + 1, column),
                class_info: grid.text(row + 2, column),
                time_labels: (row..row.saturating_add(height).min(grid.height()))
                    .filter_map(|r| grid.text(r, self.layout.time_column))
                    .collect(),
            };

            match parse_time_range(&block.time_labels) {
                Ok((start, end)) => {
                    blocks.push(ScheduledBlock {
                        block,
                        day_offset,
                        start,
                        end,
                    });
                    row = row.saturating_add(height);
                }
                Err(err @ TimeRangeError::InvalidTime(_)) => {
                    tracing::debug!("Skipping block at ({}, {}): {}", row, column, err);
                    row = row.saturating_add(height);
                }
                Err(err) => {
                    tracing::debug!("Not a class block at ({}, {}): {}", row, column, err);
                    row += 1;
                }
            }
        }

        blocks
    }

    /// 为每个目标周生成日历事件
    ///
    /// 事件顺序：周 → 星期列 → 行。表格没有任何行时返回 [`Error::EmptyGrid`]。
    pub fn extract(
        &self,
        grid: &Grid,
        week_starts: &[NaiveDate],
        stamp: DateTime<FixedOffset>,
    ) -> Result<Vec<ClassEvent>> {
        if grid.is_empty() {
            return Err(Error::EmptyGrid);
        }

        let location = extract_location(grid, &self.layout);
        let blocks = self.scan_blocks(grid);
        tracing::info!(
            "Found {} class blocks, generating {} week(s)",
            blocks.len(),
            week_starts.len()
        );

        let mut events = Vec::with_capacity(blocks.len() * week_starts.len());
        for &week_start in week_starts {
            for scheduled in &blocks {
                events.push(self.build_event(scheduled, week_start, &location, stamp)?);
            }
        }
        Ok(events)
    }

    fn build_event(
        &self,
        scheduled: &ScheduledBlock,
        week_start: NaiveDate,
        location: &str,
        stamp: DateTime<FixedOffset>,
    ) -> Result<ClassEvent> {
        let date = week_start
            .checked_add_days(Days::new(u64::from(scheduled.day_offset)))
            .ok_or_else(|| Error::Internal(format!("Date out of range: {}", week_start)))?;

        let title = scheduled.block.title();
        let reminders = self
            .reminders
            .active_minutes()
            .iter()
            .map(|&minutes| Reminder::new(minutes, &title, location))
            .collect();

        Ok(ClassEvent {
            start: localize(date, scheduled.start)?,
            end: localize(date, scheduled.end)?,
            title,
            location: location.to_string(),
            stamp,
            reminders,
        })
    }
}

impl Default for TimetableExtractor {
    fn default() -> Self {
        Self {
            layout: GridLayout::default(),
            reminders: ReminderOptions::default(),
        }
    }
}

fn localize(date: NaiveDate, time: NaiveTime) -> Result<DateTime<FixedOffset>> {
    fixed_timezone()
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(|| Error::Internal(format!("Failed to localize {} {}", date, time)))
}
