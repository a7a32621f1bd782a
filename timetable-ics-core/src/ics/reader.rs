//! 读取ICS文件中的事件，用于校验生成结果和命令行查看

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use ical::parser::ical::{
    IcalParser,
    component::{IcalAlarm, IcalEvent},
};
use ical::property::Property;
use serde::Serialize;

use crate::{Error, Result, config::fixed_timezone};

/// 从ICS中解析出的事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedEvent {
    pub title: String,
    pub location: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub reminders: Vec<ParsedReminder>,
}

/// 从ICS中解析出的提醒
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedReminder {
    pub action: String,
    pub description: String,
    pub trigger: String,
}

/// 从文件路径读取事件
pub fn read_events_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ParsedEvent>> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref)?;
    tracing::debug!("Reading events from {}", path_ref.display());
    read_events(file)
}

/// 从读取器中读取所有日历的事件
pub fn read_events<R: Read>(reader: R) -> Result<Vec<ParsedEvent>> {
    let parser = IcalParser::new(BufReader::new(reader));
    let mut events = Vec::new();

    for calendar in parser {
        let calendar = calendar.map_err(|err| Error::IcsParse(err.to_string()))?;
        for event in &calendar.events {
            events.push(parse_event(event)?);
        }
    }

    Ok(events)
}

fn parse_event(event: &IcalEvent) -> Result<ParsedEvent> {
    let props = &event.properties;
    let start = property_value(props, "DTSTART")
        .ok_or_else(|| Error::IcsParse("VEVENT without DTSTART".to_string()))?;
    let end = property_value(props, "DTEND")
        .ok_or_else(|| Error::IcsParse("VEVENT without DTEND".to_string()))?;

    Ok(ParsedEvent {
        title: property_text(props, "SUMMARY"),
        location: property_text(props, "LOCATION"),
        start: parse_datetime(start)?,
        end: parse_datetime(end)?,
        reminders: event.alarms.iter().map(parse_alarm).collect(),
    })
}

fn parse_alarm(alarm: &IcalAlarm) -> ParsedReminder {
    let props = &alarm.properties;
    ParsedReminder {
        action: property_text(props, "ACTION"),
        description: property_text(props, "DESCRIPTION"),
        trigger: property_text(props, "TRIGGER"),
    }
}

fn property_value<'a>(props: &'a [Property], name: &str) -> Option<&'a str> {
    props
        .iter()
        .find(|prop| prop.name.eq_ignore_ascii_case(name))
        .and_then(|prop| prop.value.as_deref())
}

fn property_text(props: &[Property], name: &str) -> String {
    property_value(props, name)
        .map(unescape_text)
        .unwrap_or_default()
}

/// UTC时间（`Z`结尾）直接解析，浮动时间按固定时区解释
fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    let invalid = |err: chrono::ParseError| {
        Error::IcsParse(format!("Invalid date-time '{}': {}", value, err))
    };

    if let Some(utc) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S").map_err(invalid)?;
        return Ok(Utc.from_utc_datetime(&naive));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").map_err(invalid)?;
    fixed_timezone()
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| Error::IcsParse(format!("Ambiguous local time '{}'", value)))
}

fn unescape_text(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => result.push('\n'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:1\r\n\
DTSTART:20241014T033000Z\r\n\
DTEND;TZID=Asia/Kolkata:20241014T095000\r\n\
SUMMARY:Maths\\, Applied (by Dr. Iyer)\r\n\
LOCATION:Block A\\; Room 2\r\n\
BEGIN:VALARM\r\n\
ACTION:DISPLAY\r\n\
DESCRIPTION:Reminder\r\n\
TRIGGER:-PT30M\r\n\
END:VALARM\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn test_read_sample() {
        let events = read_events(SAMPLE.as_bytes()).unwrap();
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(event.title, "Maths, Applied (by Dr. Iyer)");
        assert_eq!(event.location, "Block A; Room 2");
        assert_eq!(
            event.start,
            Utc.with_ymd_and_hms(2024, 10, 14, 3, 30, 0).unwrap()
        );
        // 09:50 IST = 04:20 UTC
        assert_eq!(event.end, Utc.with_ymd_and_hms(2024, 10, 14, 4, 20, 0).unwrap());
        assert_eq!(event.reminders.len(), 1);
        assert_eq!(event.reminders[0].action, "DISPLAY");
        assert_eq!(event.reminders[0].trigger, "-PT30M");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape_text(r"a\,b\;c\\d\ne"), "a,b;c\\d\ne");
    }

    #[test]
    fn test_missing_dtstart() {
        let broken = SAMPLE.replace("DTSTART:20241014T033000Z\r\n", "");
        assert!(matches!(read_events(broken.as_bytes()), Err(Error::IcsParse(_))));
    }
}
