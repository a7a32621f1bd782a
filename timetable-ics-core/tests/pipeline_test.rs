//! Integration tests: real xlsx files through the whole pipeline.

use chrono::{Datelike, Duration, Weekday};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, XlsxError};
use std::path::Path;
use timetable_ics_core::{
    Error,
    config::{ConvertOptions, ReminderOptions, WeekSpan},
    extractor::TimetableExtractor,
    grid::{load_grid, load_grid_from_bytes},
    ics::reader::read_events_from_path,
    pipeline::{convert, create_ics_from_spreadsheet},
};

mod fixtures {
    use super::*;

    /// A timetable in the default layout: location in A2, Monday..Friday in
    /// B..F, class rows from row 4, four rows per class.
    pub fn build_timetable() -> Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        sheet.write_string(0, 0, "Timetable - Semester 3")?;
        sheet.write_string(1, 0, "Science Block")?;
        sheet.write_string(2, 1, "Monday")?;
        sheet.write_string(2, 2, "Tuesday")?;

        let slots = [
            (3, "9:00-9:50"),
            (4, "9:50-10:40"),
            (7, "11:00-11:50"),
            (8, "11:50-12:40"),
            (11, "14:00-14:50"),
        ];
        for (row, label) in slots {
            sheet.write_string(row, 0, label)?;
        }

        // Monday
        sheet.write_string(3, 1, "Mathematics")?;
        sheet.write_string(4, 1, "Dr. Iyer")?;
        sheet.write_string(5, 1, "Room 101")?;
        sheet.write_string(7, 1, "Chemistry")?;
        // Tuesday
        sheet.write_string(11, 2, "Physics Lab")?;
        sheet.write_string(12, 2, "Ms. Das")?;
        // Friday
        sheet.write_string(7, 5, "English")?;

        Ok(workbook)
    }

    pub fn save_timetable(path: &Path) -> Result<(), XlsxError> {
        build_timetable()?.save(path)
    }
}

#[test]
fn test_load_grid_from_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timetable.xlsx");
    fixtures::save_timetable(&path).unwrap();

    let grid = load_grid(&path).unwrap();
    assert_eq!(grid.text(1, 0).as_deref(), Some("Science Block"));
    assert_eq!(grid.text(3, 0).as_deref(), Some("9:00-9:50"));
    assert_eq!(grid.text(3, 1).as_deref(), Some("Mathematics"));
    assert_eq!(grid.text(7, 5).as_deref(), Some("English"));
    assert_eq!(grid.text(0, 5), None);
}

#[test]
fn test_grid_keeps_position_when_first_rows_empty() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(3, 2, "Anchor").unwrap();
    sheet.write_number(4, 3, 42.0).unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let grid = load_grid_from_bytes(bytes).unwrap();
    assert_eq!(grid.text(3, 2).as_deref(), Some("Anchor"));
    assert_eq!(grid.text(4, 3).as_deref(), Some("42"));
    assert_eq!(grid.text(0, 0), None);
}

#[test]
fn test_time_formatted_label_cells() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let clock = Format::new().set_num_format("h:mm");
    sheet.write_string(1, 0, "Science Block").unwrap();
    sheet
        .write_datetime_with_format(3, 0, &ExcelDateTime::from_hms(9, 0, 0).unwrap(), &clock)
        .unwrap();
    sheet
        .write_datetime_with_format(6, 0, &ExcelDateTime::from_hms(10, 40, 0).unwrap(), &clock)
        .unwrap();
    sheet.write_string(3, 1, "Mathematics").unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let grid = load_grid_from_bytes(bytes).unwrap();
    assert_eq!(grid.text(3, 0).as_deref(), Some("9:00"));
    assert_eq!(grid.text(6, 0).as_deref(), Some("10:40"));

    let blocks = TimetableExtractor::default().scan_blocks(&grid);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].start.format("%H:%M").to_string(), "09:00");
    assert_eq!(blocks[0].end.format("%H:%M").to_string(), "10:40");
}

#[test]
fn test_convert_single_week() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("timetable.xlsx");
    let output = dir.path().join("class_schedule.ics");
    fixtures::save_timetable(&input).unwrap();

    let summary = create_ics_from_spreadsheet(&input, &output).unwrap();
    assert_eq!(summary.events, 4);
    assert_eq!(summary.weeks, 1);
    assert_eq!(summary.output, output);

    let events = read_events_from_path(&output).unwrap();
    let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Mathematics (by Dr. Iyer)",
            "Chemistry",
            "Physics Lab (by Ms. Das)",
            "English",
        ]
    );
    assert!(events.iter().all(|e| e.location == "Science Block"));
    assert!(events.iter().all(|e| e.reminders.len() == 2));

    // Class dates are Monday..Friday of one week, in the fixed zone
    let tz = timetable_ics_core::config::fixed_timezone();
    let maths_day = events[0].start.with_timezone(&tz);
    assert_eq!(maths_day.weekday(), Weekday::Mon);
    assert_eq!(events[2].start.with_timezone(&tz).weekday(), Weekday::Tue);
    assert_eq!(events[3].start.with_timezone(&tz).weekday(), Weekday::Fri);
    assert_eq!(
        events[3].start.with_timezone(&tz).date_naive() - maths_day.date_naive(),
        Duration::days(4)
    );

    // Mathematics spans two labelled rows: 9:00 to 10:40
    assert_eq!(events[0].end - events[0].start, Duration::minutes(100));
}

#[test]
fn test_convert_two_weeks_without_reminders() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("timetable.xlsx");
    let output = dir.path().join("two_weeks.ics");
    fixtures::save_timetable(&input).unwrap();

    let mut options = ConvertOptions::default();
    options.extract.weeks = WeekSpan::CurrentAndNext;
    options.extract.reminders = ReminderOptions::disabled();
    options.ics.calendar_name = Some("My Classes".to_string());

    let summary = convert(&input, &output, &options).unwrap();
    assert_eq!(summary.events, 8);
    assert_eq!(summary.weeks, 2);

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.contains("X-WR-CALNAME:My Classes\r\n"));
    assert!(!content.contains("VALARM"));

    let events = read_events_from_path(&output).unwrap();
    let (first, second) = events.split_at(4);
    for (a, b) in first.iter().zip(second) {
        assert_eq!(a.title, b.title);
        assert_eq!(b.start - a.start, Duration::days(7));
        assert_eq!(b.end - a.end, Duration::days(7));
    }
}

#[test]
fn test_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = create_ics_from_spreadsheet(
        dir.path().join("nope.xlsx"),
        dir.path().join("out.ics"),
    );
    assert!(matches!(result, Err(Error::Io(_))));
    assert!(!dir.path().join("out.ics").exists());
}

#[test]
fn test_corrupt_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.xlsx");
    std::fs::write(&input, b"this is not a workbook").unwrap();

    let result = create_ics_from_spreadsheet(&input, dir.path().join("out.ics"));
    assert!(matches!(result, Err(Error::Spreadsheet(_))));
}

#[test]
fn test_unwritable_output_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("timetable.xlsx");
    fixtures::save_timetable(&input).unwrap();

    let result = create_ics_from_spreadsheet(&input, dir.path().join("missing/dir/out.ics"));
    assert!(matches!(result, Err(Error::Io(_))));
}
