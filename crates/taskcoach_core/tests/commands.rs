use std::cell::RefCell;
use std::rc::Rc;
use taskcoach_core::{
    Clipboard, CommandError, CommandHistory, CutCommand, DeleteCommand, DragAndDropCommand, Edit,
    EditCommand, Event, EventType, InstanceId, Item, ItemCollection, ItemKind, NewItemCommand,
    Observer, PasteCommand, Publisher, SyncStatus, Task, ToggleCompletionCommand,
};

fn record(event_types: &[EventType]) -> Rc<RefCell<Vec<Event>>> {
    let received = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);
    let observer = Observer::new(InstanceId::next(), "record", move |event: &Event| {
        sink.borrow_mut().push(event.clone())
    });
    for event_type in event_types {
        Publisher::register_observer(observer.clone(), event_type.clone(), None);
    }
    received
}

#[test]
fn multi_attribute_edit_undoes_and_redoes_in_one_event_each() {
    Publisher::clear();
    let task = Item::builder(ItemKind::Task)
        .subject("draft")
        .description("old")
        .build();
    let received = record(&[
        ItemKind::Task.subject_changed_event_type(),
        ItemKind::Task.description_changed_event_type(),
    ]);
    let mut history = CommandHistory::new();

    history
        .execute(EditCommand::new(
            &[task.clone()],
            vec![
                Edit::Subject("final".to_string()),
                Edit::Description("new".to_string()),
            ],
        ))
        .unwrap();
    assert_eq!(received.borrow().len(), 1);
    assert_eq!(task.subject(false), "final");

    history.undo().unwrap();
    assert_eq!(received.borrow().len(), 2);
    assert_eq!(task.subject(false), "draft");
    assert_eq!(task.description(), "old");

    history.redo().unwrap();
    assert_eq!(received.borrow().len(), 3);
    assert_eq!(task.subject(false), "final");
    assert_eq!(task.description(), "new");
}

#[test]
fn editing_many_items_sends_one_event() {
    Publisher::clear();
    let notes: Vec<Item> = (0..3)
        .map(|index| Item::builder(ItemKind::Note).subject(format!("n{index}")).build())
        .collect();
    let received = record(&[ItemKind::Note.subject_changed_event_type()]);

    let mut history = CommandHistory::new();
    history
        .execute(EditCommand::new(&notes, vec![Edit::Subject("same".to_string())]))
        .unwrap();

    let received = received.borrow();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].sources(&[]).len(), 3);
}

#[test]
fn new_and_delete_round_trip_through_history() {
    Publisher::clear();
    let tasks = ItemCollection::new(ItemKind::Task);
    let command = NewItemCommand::with_subject(&tasks, "write report");
    let created = command.items()[0].clone();
    let mut history = CommandHistory::new();

    history.execute(command).unwrap();
    assert_eq!(history.undo_name(), Some("New task"));
    assert!(tasks.contains(&created));

    created.clean_dirty();
    history.execute(DeleteCommand::new(&tasks, &[created.clone()])).unwrap();
    assert!(tasks.is_empty());
    assert_eq!(created.status(), SyncStatus::Deleted);

    history.undo().unwrap();
    assert!(tasks.contains(&created));
    assert_eq!(created.status(), SyncStatus::Clean);

    history.undo().unwrap();
    assert!(tasks.is_empty());
    assert!(!history.can_undo());
}

#[test]
fn deleting_several_items_sends_one_remove_event() {
    Publisher::clear();
    let tasks = ItemCollection::new(ItemKind::Task);
    let items: Vec<Item> = (0..3).map(|_| Item::builder(ItemKind::Task).build()).collect();
    tasks.extend(&items);
    let received = record(&[tasks.remove_item_event_type()]);

    let mut history = CommandHistory::new();
    history.execute(DeleteCommand::new(&tasks, &items)).unwrap();

    let received = received.borrow();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].items(None, None).len(), 3);
}

#[test]
fn invalid_drop_is_rejected_by_history() {
    let child = Item::builder(ItemKind::Task).build();
    let parent = Item::builder(ItemKind::Task).children([child.clone()]).build();
    let mut history = CommandHistory::new();

    let result = history.execute(DragAndDropCommand::new(&[parent.clone()], Some(&child)));
    assert_eq!(
        result,
        Err(CommandError::Rejected {
            name: "Drag and drop".to_string()
        })
    );
    assert!(!history.can_undo());
    assert_eq!(child.parent(), Some(parent));
}

#[test]
fn drop_on_completed_task_reopens_it() {
    let done_at = chrono::NaiveDate::from_ymd_opt(2024, 2, 2)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let target = Item::builder(ItemKind::Task).completion(done_at).build();
    let dragged = Item::builder(ItemKind::Task).build();
    let mut history = CommandHistory::new();

    history
        .execute(DragAndDropCommand::new(&[dragged.clone()], Some(&target)))
        .unwrap();
    let target_task = Task::try_from(target.clone()).unwrap();
    assert_eq!(dragged.parent(), Some(target.clone()));
    assert!(!target_task.completed());

    history.undo().unwrap();
    assert_eq!(dragged.parent(), None);
    assert!(target.children(false).is_empty());
    assert!(target_task.completed());
}

#[test]
fn cut_and_paste_moves_an_item_between_parents() {
    let tasks = ItemCollection::new(ItemKind::Task);
    let moved = Item::builder(ItemKind::Task).subject("moved").build();
    let old_parent = Item::builder(ItemKind::Task).children([moved.clone()]).build();
    let new_parent = Item::builder(ItemKind::Task).build();
    tasks.extend(&[old_parent.clone(), new_parent.clone()]);
    let clipboard = Clipboard::new();
    let mut history = CommandHistory::new();

    history
        .execute(CutCommand::new(&tasks, &[moved.clone()], &clipboard))
        .unwrap();
    history
        .execute(PasteCommand::as_sub_item(&clipboard, &new_parent))
        .unwrap();
    assert_eq!(moved.parent(), Some(new_parent.clone()));
    assert!(!old_parent.has_child(&moved));
    assert!(tasks.contains(&moved));

    history.undo().unwrap();
    history.undo().unwrap();
    assert_eq!(moved.parent(), Some(old_parent.clone()));
    assert!(old_parent.has_child(&moved));
    assert!(!new_parent.has_child(&moved));
    assert!(clipboard.is_empty());
}

#[test]
fn toggle_completion_through_history() {
    let task = Task::new("chore");
    let mut history = CommandHistory::new();
    history
        .execute(ToggleCompletionCommand::new(&[task.clone()]))
        .unwrap();
    assert!(task.completed());
    history.undo().unwrap();
    assert!(!task.completed());
}
