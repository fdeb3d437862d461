use taskcoach_core::{Color, Item, ItemCollection, ItemKind, SyncStatus, DEFAULT_EXPANSION_CONTEXT};

fn task(subject: &str) -> Item {
    Item::builder(ItemKind::Task).subject(subject).build()
}

fn three_levels() -> (Item, Item, Item) {
    let leaf = task("leaf");
    let middle = Item::builder(ItemKind::Task)
        .subject("middle")
        .children([leaf.clone()])
        .build();
    let root = Item::builder(ItemKind::Task)
        .subject("root")
        .children([middle.clone()])
        .build();
    (root, middle, leaf)
}

#[test]
fn append_adds_whole_subtree_and_remove_drops_it() {
    let (root, middle, leaf) = three_levels();
    let tasks = ItemCollection::new(ItemKind::Task);

    tasks.append(&root);
    assert_eq!(tasks.len(), 3);
    assert!(tasks.contains(&middle) && tasks.contains(&leaf));
    assert_eq!(tasks.root_items(), vec![root.clone()]);
    assert_eq!(tasks.all_items_sorted(), vec![root.clone(), middle.clone(), leaf.clone()]);

    tasks.remove(&root);
    assert!(tasks.is_empty());
}

#[test]
fn removing_a_subtree_detaches_it_from_its_parent() {
    let (root, middle, leaf) = three_levels();
    let tasks = ItemCollection::new(ItemKind::Task);
    tasks.append(&root);

    tasks.remove(&middle);
    assert_eq!(tasks.items(), vec![root.clone()]);
    assert!(!root.has_child(&middle));
    assert!(!tasks.contains(&leaf));

    tasks.append(&middle);
    assert!(root.has_child(&middle));
    assert_eq!(tasks.len(), 3);
}

#[test]
fn subject_path_and_family() {
    let (root, middle, leaf) = three_levels();
    assert_eq!(leaf.subject(true), "root -> middle -> leaf");
    assert_eq!(leaf.ancestors(), vec![root.clone(), middle.clone()]);
    assert_eq!(middle.family(), vec![root, middle.clone(), leaf]);
}

#[test]
fn child_without_own_color_inherits_from_parent() {
    let child = task("child");
    let parent = Item::builder(ItemKind::Task)
        .subject("parent")
        .fg_color(Color::rgb(10, 20, 30))
        .children([child.clone()])
        .build();

    assert_eq!(child.fg_color(false), None);
    assert_eq!(child.fg_color(true), parent.fg_color(true));

    child.set_fg_color(Some(Color::rgb(1, 2, 3)));
    assert_eq!(child.fg_color(true), Some(Color::rgb(1, 2, 3)));
}

#[test]
fn copy_keeps_content_but_not_identity() {
    let (root, middle, _) = three_levels();
    root.clean_dirty();

    let copy = middle.copy();
    assert_ne!(copy.id(), middle.id());
    assert_eq!(copy.subject(false), middle.subject(false));
    assert_eq!(copy.parent(), None);
    assert_eq!(copy.status(), SyncStatus::New);
    let copied_leaf = copy.children(false);
    assert_eq!(copied_leaf.len(), 1);
    assert_ne!(copied_leaf[0].id(), middle.children(false)[0].id());
}

#[test]
fn lifecycle_marks_propagate_to_descendants() {
    let (root, middle, leaf) = three_levels();
    root.clean_dirty();
    assert_eq!(leaf.status(), SyncStatus::Clean);

    middle.mark_deleted();
    assert_eq!(root.status(), SyncStatus::Clean);
    assert_eq!(middle.status(), SyncStatus::Deleted);
    assert_eq!(leaf.status(), SyncStatus::Deleted);

    middle.mark_not_deleted();
    assert_eq!(leaf.status(), SyncStatus::Changed);
}

#[test]
fn editing_a_clean_item_marks_it_changed() {
    let note = Item::builder(ItemKind::Note).build();
    note.clean_dirty();
    note.set_description("edited");
    assert_eq!(note.status(), SyncStatus::Changed);
}

#[test]
fn expansion_is_tracked_per_context() {
    let root = task("root");
    assert!(!root.is_expanded(DEFAULT_EXPANSION_CONTEXT));
    assert!(root.expand(true, DEFAULT_EXPANSION_CONTEXT));
    assert!(root.expand(true, "sidebar"));
    assert!(!root.expand(true, "sidebar"));
    assert_eq!(root.expanded_contexts(), vec!["default".to_string(), "sidebar".to_string()]);
}
