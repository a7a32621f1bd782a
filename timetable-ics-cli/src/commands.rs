use anyhow::Result;
use timetable_ics_core::{
    config::{ConvertOptions, ReminderOptions, TIMEZONE_NAME, WeekSpan, fixed_timezone},
    ics::reader::read_events_from_path,
    pipeline::{convert, extract_events},
};

/// 生成ICS命令参数
pub struct GenerateParams {
    pub input: String,
    pub output: String,
    pub two_weeks: bool,
    pub no_reminders: bool,
    pub config: Option<String>,
    pub calendar_name: Option<String>,
}

/// 加载选项文件，没有时使用默认值
fn load_options(config: Option<&str>) -> Result<ConvertOptions> {
    match config {
        Some(path) => {
            tracing::info!("使用选项文件: {}", path);
            ConvertOptions::from_path(path)
                .map_err(|e| anyhow::anyhow!("读取选项文件 {} 失败: {}", path, e))
        }
        None => Ok(ConvertOptions::default()),
    }
}

/// 生成ICS命令
pub fn generate_command(params: GenerateParams) -> Result<()> {
    let mut options = load_options(params.config.as_deref())?;

    // 命令行参数优先于选项文件
    if params.two_weeks {
        options.extract.weeks = WeekSpan::CurrentAndNext;
    }
    if params.no_reminders {
        options.extract.reminders = ReminderOptions::disabled();
    }
    if params.calendar_name.is_some() {
        options.ics.calendar_name = params.calendar_name;
    }

    tracing::info!(
        "开始生成课程表: 输入={}, 输出={}, 周数={}",
        params.input,
        params.output,
        options.extract.weeks.week_count()
    );

    let summary = convert(&params.input, &params.output, &options)?;
    tracing::debug!("写出 {} 个事件", summary.events);
    println!("✓ ICS文件已保存到: {}", summary.output.display());

    Ok(())
}

/// 预览命令
pub fn preview_command(input: String, two_weeks: bool, config: Option<String>) -> Result<()> {
    let mut options = load_options(config.as_deref())?;
    if two_weeks {
        options.extract.weeks = WeekSpan::CurrentAndNext;
    }

    let events = extract_events(&input, &options.extract)?;
    println!("{}", serde_json::to_string_pretty(&events)?);

    Ok(())
}

/// 查看ICS文件命令
pub fn inspect_command(file: String) -> Result<()> {
    let events = read_events_from_path(&file)?;
    let tz = fixed_timezone();

    println!("{} 中共有 {} 个事件 ({}):", file, events.len(), TIMEZONE_NAME);
    for event in &events {
        let start = event.start.with_timezone(&tz);
        let end = event.end.with_timezone(&tz);
        println!(
            "  {} {}-{}  {}",
            start.format("%Y-%m-%d %a"),
            start.format("%H:%M"),
            end.format("%H:%M"),
            event.title
        );
        if !event.location.is_empty() {
            println!("    地点: {}", event.location);
        }
        for reminder in &event.reminders {
            println!("    提醒: {} {}", reminder.trigger, reminder.description);
        }
    }

    Ok(())
}

/// 输出默认选项命令
pub fn defaults_command() -> Result<()> {
    let options = ConvertOptions::default();
    println!("{}", serde_json::to_string_pretty(&options)?);
    Ok(())
}
