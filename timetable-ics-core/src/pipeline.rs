use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use crate::{
    ClassEvent, Result,
    config::{ConvertOptions, ExtractOptions, fixed_timezone},
    extractor::TimetableExtractor,
    grid::load_grid,
    ics::IcsGenerator,
    week::current_week_starts,
};

/// 一次转换的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    /// 写出的事件数
    pub events: usize,
    /// 生成的周数
    pub weeks: usize,
    pub output: PathBuf,
}

/// 读取表格并提取本周（或两周）的课程事件
pub fn extract_events<P: AsRef<Path>>(
    input: P,
    options: &ExtractOptions,
) -> Result<Vec<ClassEvent>> {
    let extractor = TimetableExtractor::new(options.clone())?;
    let grid = load_grid(input)?;
    let week_starts = current_week_starts(options.weeks);
    let stamp = Utc::now().with_timezone(&fixed_timezone());
    extractor.extract(&grid, &week_starts, stamp)
}

/// 表格 → 课程事件 → ICS文件
pub fn convert<P, Q>(input: P, output: Q, options: &ConvertOptions) -> Result<ConversionSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let input = input.as_ref();
    let output = output.as_ref();
    tracing::info!("Converting {} -> {}", input.display(), output.display());

    let events = extract_events(input, &options.extract)?;
    let generator = IcsGenerator::new(options.ics.clone());
    let calendar = generator.build_calendar(events);
    generator.write_to_path(&calendar, output)?;

    Ok(ConversionSummary {
        events: calendar.events.len(),
        weeks: options.extract.weeks.week_count() as usize,
        output: output.to_path_buf(),
    })
}

/// 使用默认布局和选项完成转换
pub fn create_ics_from_spreadsheet<P, Q>(input: P, output: Q) -> Result<ConversionSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    convert(input, output, &ConvertOptions::default())
}
