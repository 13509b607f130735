use crate::model::checkbox_value;
use crate::store::Record;
use serde::Serialize;
use serde_json::Value;

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn weekday_index(abbrev: &str) -> Option<usize> {
    match abbrev {
        "M" => Some(0),
        "T" => Some(1),
        "W" => Some(2),
        "Th" => Some(3),
        "F" => Some(4),
        "S" => Some(5),
        "Su" => Some(6),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledClass {
    pub id: String,
    pub class_name: String,
    pub class_code: String,
    pub start_time: String,
    pub end_time: String,
    pub class_location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDay {
    pub day: &'static str,
    pub classes: Vec<ScheduledClass>,
}

struct Meeting {
    first_day: Option<usize>,
    days: Vec<usize>,
    class: ScheduledClass,
}

fn text(record: &Record, field: &str) -> String {
    record
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn meeting(record: &Record) -> Option<Meeting> {
    if !record.get("isCurrentSchedule").map(checkbox_value).unwrap_or(false) {
        return None;
    }
    let abbrevs: Vec<&str> = record
        .get("days")
        .and_then(Value::as_array)
        .map(|days| days.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let start_time = text(record, "startTime");
    let end_time = text(record, "endTime");
    if abbrevs.is_empty() || start_time.is_empty() || end_time.is_empty() {
        return None;
    }

    Some(Meeting {
        first_day: weekday_index(abbrevs[0]),
        days: abbrevs.iter().filter_map(|d| weekday_index(d)).collect(),
        class: ScheduledClass {
            id: text(record, "id"),
            class_name: text(record, "className"),
            class_code: text(record, "classCode"),
            start_time,
            end_time,
            class_location: text(record, "classLocation"),
        },
    })
}

/// Timetable of current-schedule classes that have meeting days and times,
/// ordered by first meeting day then start time within each weekday.
pub fn weekly_schedule(classes: &[Record]) -> Vec<ScheduleDay> {
    let mut meetings: Vec<Meeting> = classes.iter().filter_map(meeting).collect();
    // Stable: ties keep their collection order.
    meetings.sort_by(|a, b| {
        a.first_day
            .cmp(&b.first_day)
            .then_with(|| a.class.start_time.cmp(&b.class.start_time))
    });

    let mut week: Vec<ScheduleDay> = WEEKDAYS
        .iter()
        .map(|&day| ScheduleDay {
            day,
            classes: Vec::new(),
        })
        .collect();
    for m in &meetings {
        for &d in &m.days {
            week[d].classes.push(m.class.clone());
        }
    }
    week
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn class(v: Value) -> Record {
        v.as_object().cloned().expect("object")
    }

    #[test]
    fn classes_land_under_each_meeting_day_in_order() {
        let classes = vec![
            class(json!({
                "id": "chem", "className": "Chemistry", "days": ["T", "Th"],
                "startTime": "10:00", "endTime": "11:15", "isCurrentSchedule": true
            })),
            class(json!({
                "id": "calc", "className": "Calculus", "days": ["M", "W", "F"],
                "startTime": "09:00", "endTime": "09:50", "isCurrentSchedule": true
            })),
            class(json!({
                "id": "lit", "className": "Literature", "days": ["T"],
                "startTime": "08:30", "endTime": "09:45", "isCurrentSchedule": true
            })),
        ];
        let week = weekly_schedule(&classes);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].day, "Monday");

        let ids = |i: usize| week[i].classes.iter().map(|c| c.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids(0), vec!["calc"]);
        assert_eq!(ids(1), vec!["lit", "chem"]);
        assert_eq!(ids(3), vec!["chem"]);
        assert_eq!(ids(4), vec!["calc"]);
        assert!(week[6].classes.is_empty());
    }

    #[test]
    fn incomplete_or_unscheduled_classes_are_left_out() {
        let classes = vec![
            class(json!({ "id": "a", "days": ["M"], "startTime": "09:00", "endTime": "10:00" })),
            class(json!({ "id": "b", "days": [], "startTime": "09:00", "endTime": "10:00", "isCurrentSchedule": true })),
            class(json!({ "id": "c", "days": ["M"], "startTime": "", "endTime": "10:00", "isCurrentSchedule": true })),
            class(json!({ "id": "d", "days": ["Xy", "W"], "startTime": "13:00", "endTime": "14:00", "isCurrentSchedule": "on" })),
        ];
        let week = weekly_schedule(&classes);
        let total: usize = week.iter().map(|d| d.classes.len()).sum();
        assert_eq!(total, 1);
        assert_eq!(week[2].classes[0].id, "d");
    }
}
