use chrono::{Datelike, Duration, NaiveDate, Utc};

use crate::config::{WeekSpan, fixed_timezone};

/// 指定日期所在周的星期一
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    let days_since_monday = date.weekday().num_days_from_monday();
    date - Duration::days(i64::from(days_since_monday))
}

/// 根据给定的"今天"计算需要生成的各周星期一
pub fn week_starts(today: NaiveDate, span: WeekSpan) -> Vec<NaiveDate> {
    let monday = monday_of(today);
    (0..span.week_count())
        .map(|week| monday + Duration::weeks(i64::from(week)))
        .collect()
}

/// 固定时区下的今天
pub fn today() -> NaiveDate {
    Utc::now().with_timezone(&fixed_timezone()).date_naive()
}

/// 以固定时区的当前日期计算各周星期一
pub fn current_week_starts(span: WeekSpan) -> Vec<NaiveDate> {
    week_starts(today(), span)
}
