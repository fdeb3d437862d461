use chrono::{NaiveDate, NaiveDateTime};
use taskcoach_core::{Item, ItemKind, Recurrence, RecurrenceError, RecurrenceUnit, Task};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
    date(year, month, day).and_hms_opt(9, 30, 0).unwrap()
}

#[test]
fn completing_a_monthly_task_walks_back_to_a_valid_day() {
    let monthly = Recurrence::new(RecurrenceUnit::Monthly, 1).unwrap();
    let task = Item::builder(ItemKind::Task)
        .planned_start(at(2020, 1, 31))
        .recurrence(monthly)
        .build_task()
        .unwrap();

    task.set_completion_date_time(Some(at(2020, 1, 31)));
    assert_eq!(task.planned_start_date_time(), Some(at(2020, 2, 29)));
    assert!(!task.completed());

    task.set_completion_date_time(Some(at(2020, 2, 29)));
    assert_eq!(task.planned_start_date_time(), Some(at(2020, 3, 29)));
    assert_eq!(task.recurrence().count, 2);
}

#[test]
fn yearly_same_weekday_lands_in_next_year() {
    let yearly = Recurrence::new(RecurrenceUnit::Yearly, 1)
        .unwrap()
        .with_same_weekday(true);
    assert_eq!(yearly.next_date(date(2020, 2, 29)), date(2021, 2, 27));
}

#[test]
fn weekly_and_daily_steps_keep_time_of_day() {
    let weekly = Recurrence::new(RecurrenceUnit::Weekly, 2).unwrap();
    assert_eq!(weekly.next_date(at(2024, 1, 1)), at(2024, 1, 15));
    let daily = Recurrence::new(RecurrenceUnit::Daily, 3).unwrap();
    assert_eq!(daily.next_date(at(2024, 2, 27)), at(2024, 3, 1));
}

#[test]
fn max_expires_the_rule() {
    let mut limited = Recurrence::new(RecurrenceUnit::Daily, 1).unwrap().with_max(1);
    assert!(limited.is_active());
    assert!(limited.occurrences(&[Some(at(2024, 1, 1))], true).is_some());
    assert!(!limited.is_active());
    assert!(limited.occurrences(&[Some(at(2024, 1, 2))], true).is_none());
}

#[test]
fn copy_equals_original_and_resets_count() {
    let mut rule = Recurrence::new(RecurrenceUnit::Monthly, 2).unwrap();
    rule.count = 3;
    let copy = rule.copy();
    assert_eq!(copy, rule);
    assert_eq!(copy.count, 0);
}

#[test]
fn labels_parse_and_reject_unknown_units() {
    assert_eq!(RecurrenceUnit::parse("weekly"), Ok(Some(RecurrenceUnit::Weekly)));
    assert_eq!(RecurrenceUnit::parse(""), Ok(None));
    assert_eq!(
        RecurrenceUnit::parse("hourly"),
        Err(RecurrenceError::UnknownUnit("hourly".to_string()))
    );
    assert_eq!(
        Recurrence::new(RecurrenceUnit::Daily, 0),
        Err(RecurrenceError::ZeroAmount)
    );
}

#[test]
fn recurring_parent_reopens_subtasks() {
    let daily = Recurrence::new(RecurrenceUnit::Daily, 1).unwrap();
    let child = Item::builder(ItemKind::Task)
        .due(at(2024, 5, 1))
        .completion(at(2024, 4, 30))
        .build();
    let parent = Item::builder(ItemKind::Task)
        .due(at(2024, 5, 1))
        .recurrence(daily)
        .children([child.clone()])
        .build_task()
        .unwrap();

    parent.set_completion_date_time(Some(at(2024, 5, 1)));

    let child = Task::try_from(child).unwrap();
    assert!(!child.completed());
    assert_eq!(child.due_date_time(), Some(at(2024, 5, 2)));
    assert_eq!(parent.due_date_time(), Some(at(2024, 5, 2)));
}

#[test]
fn completing_a_plain_task_completes_open_subtasks() {
    let child = Item::builder(ItemKind::Task).build();
    let parent = Item::builder(ItemKind::Task)
        .children([child.clone()])
        .build_task()
        .unwrap();

    parent.set_completion_date_time(Some(at(2024, 6, 1)));
    let child = Task::try_from(child).unwrap();
    assert_eq!(child.completion_date_time(), Some(at(2024, 6, 1)));

    parent.set_completion_date_time(None);
    assert!(!parent.completed());
    assert!(child.completed());
}
