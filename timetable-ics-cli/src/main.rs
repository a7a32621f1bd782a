mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "timetable-ics")]
#[command(about = "课程表表格转ICS日历工具")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 启用详细日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 读取课程表并生成ICS文件
    Generate {
        /// 课程表文件路径 (xlsx/xls/ods)
        #[arg(short, long, default_value = "timetable.xlsx")]
        input: String,

        /// 输出文件路径
        #[arg(short, long, default_value = "class_schedule.ics")]
        output: String,

        /// 同时生成下周的课程
        #[arg(long)]
        two_weeks: bool,

        /// 不添加课前提醒
        #[arg(long)]
        no_reminders: bool,

        /// 选项文件 (JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// 日历名称
        #[arg(long)]
        calendar_name: Option<String>,
    },

    /// 预览提取出的课程（JSON）
    Preview {
        /// 课程表文件路径
        #[arg(short, long, default_value = "timetable.xlsx")]
        input: String,

        /// 同时生成下周的课程
        #[arg(long)]
        two_weeks: bool,

        /// 选项文件 (JSON)
        #[arg(short, long)]
        config: Option<String>,
    },

    /// 列出ICS文件中的事件
    Inspect {
        /// ICS文件路径
        file: String,
    },

    /// 输出默认选项（可作为选项文件模板）
    Defaults,
}

/// 未设置 RUST_LOG 时的日志过滤规则
///
/// 二进制的 target 是 `timetable_ics`，库的是 `timetable_ics_core`。
fn default_filter(verbose: bool) -> String {
    let log_level = if verbose { "debug" } else { "info" };
    format!("timetable_ics={},timetable_ics_core={}", log_level, log_level)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(cli.verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Generate {
            input,
            output,
            two_weeks,
            no_reminders,
            config,
            calendar_name,
        } => commands::generate_command(commands::GenerateParams {
            input,
            output,
            two_weeks,
            no_reminders,
            config,
            calendar_name,
        }),

        Commands::Preview {
            input,
            two_weeks,
            config,
        } => commands::preview_command(input, two_weeks, config),

        Commands::Inspect { file } => commands::inspect_command(file),

        Commands::Defaults => commands::defaults_command(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_targets_binary() {
        assert_eq!(
            default_filter(false),
            "timetable_ics=info,timetable_ics_core=info"
        );
        assert_eq!(
            default_filter(true),
            "timetable_ics=debug,timetable_ics_core=debug"
        );
        assert!(default_filter(false).parse::<tracing_subscriber::EnvFilter>().is_ok());
    }

    #[test]
    fn test_cli_parses_generate_defaults() {
        let cli = Cli::try_parse_from(["timetable-ics", "-v", "generate"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Generate { ref input, ref output, two_weeks: false, .. }
                if input == "timetable.xlsx" && output == "class_schedule.ics"
        ));
    }
}
