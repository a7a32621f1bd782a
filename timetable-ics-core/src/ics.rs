pub mod reader;

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    Calendar, ClassEvent, Error, Reminder, Result,
    config::{IcsOptions, TIMEZONE_NAME},
};

/// RFC 5545 建议的单行最大字节数
const MAX_LINE_OCTETS: usize = 75;

/// ICS日历生成器
pub struct IcsGenerator {
    options: IcsOptions,
}

impl IcsGenerator {
    pub fn new(options: IcsOptions) -> Self {
        Self { options }
    }

    /// 用当前选项包装事件列表
    pub fn build_calendar(&self, events: Vec<ClassEvent>) -> Calendar {
        Calendar {
            prod_id: self.options.prod_id.clone(),
            version: "2.0".to_string(),
            name: self.options.calendar_name.clone(),
            events,
        }
    }

    /// 生成ICS日历内容
    pub fn generate(&self, calendar: &Calendar) -> Result<String> {
        if calendar.prod_id.trim().is_empty() {
            return Err(Error::IcsGeneration("PRODID must not be empty".to_string()));
        }

        let mut ics_content = String::new();

        // ICS文件头部
        push_line(&mut ics_content, "BEGIN:VCALENDAR");
        push_line(&mut ics_content, &format!("VERSION:{}", calendar.version));
        push_line(&mut ics_content, &format!("PRODID:{}", calendar.prod_id));
        push_line(&mut ics_content, "CALSCALE:GREGORIAN");

        if let Some(ref name) = calendar.name {
            push_line(&mut ics_content, &format!("X-WR-CALNAME:{}", escape_text(name)));
        }
        push_line(&mut ics_content, &format!("X-WR-TIMEZONE:{}", TIMEZONE_NAME));

        for event in &calendar.events {
            self.add_class_event(&mut ics_content, event);
        }

        // ICS文件尾部
        push_line(&mut ics_content, "END:VCALENDAR");

        Ok(ics_content)
    }

    /// 生成并写入文件
    pub fn write_to_path<P: AsRef<Path>>(&self, calendar: &Calendar, path: P) -> Result<()> {
        let content = self.generate(calendar)?;
        std::fs::write(path.as_ref(), content)?;
        tracing::debug!(
            "Wrote {} events to {}",
            calendar.events.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// 添加单个课程事件
    fn add_class_event(&self, ics_content: &mut String, event: &ClassEvent) {
        let uid = Uuid::new_v4().to_string();

        push_line(ics_content, "BEGIN:VEVENT");
        push_line(ics_content, &format!("UID:{}", uid));
        push_line(ics_content, &format!("DTSTAMP:{}", format_utc(&event.stamp)));
        push_line(ics_content, &format!("DTSTART:{}", format_utc(&event.start)));
        push_line(ics_content, &format!("DTEND:{}", format_utc(&event.end)));
        push_line(ics_content, &format!("SUMMARY:{}", escape_text(&event.title)));
        push_line(ics_content, &format!("LOCATION:{}", escape_text(&event.location)));

        for reminder in &event.reminders {
            self.add_reminder(ics_content, reminder);
        }

        push_line(ics_content, "END:VEVENT");
    }

    /// 添加提醒
    fn add_reminder(&self, ics_content: &mut String, reminder: &Reminder) {
        push_line(ics_content, "BEGIN:VALARM");
        push_line(ics_content, "ACTION:DISPLAY");
        push_line(
            ics_content,
            &format!("DESCRIPTION:{}", escape_text(&reminder.message)),
        );
        push_line(
            ics_content,
            &format!("TRIGGER:-PT{}M", reminder.minutes_before),
        );
        push_line(ics_content, "END:VALARM");
    }
}

impl Default for IcsGenerator {
    fn default() -> Self {
        Self::new(IcsOptions::default())
    }
}

fn format_utc<Tz: TimeZone>(time: &DateTime<Tz>) -> String {
    time.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ").to_string()
}

/// 转义ICS文本内容
fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
        .replace('\r', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}

/// 写入一行内容，超过75字节时折行，不拆分UTF-8字符
fn push_line(ics_content: &mut String, line: &str) {
    let mut budget = MAX_LINE_OCTETS;
    let mut used = 0;
    for ch in line.chars() {
        let width = ch.len_utf8();
        if used + width > budget {
            ics_content.push_str("\r\n ");
            // 续行开头的空格占一个字节
            budget = MAX_LINE_OCTETS - 1;
            used = 0;
        }
        ics_content.push(ch);
        used += width;
    }
    ics_content.push_str("\r\n");
}
