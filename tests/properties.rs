//! Property tests for list operations, persistence and the grouped view

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use todo_cli::domain::{partition, Rejected, Todo, TodoList};
use todo_cli::storage::{decode, encode};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (-400i64..400).prop_map(|days| base_date() + Duration::days(days))
}

fn arb_text() -> impl Strategy<Value = String> {
    "[a-z][a-z ]{0,11}"
}

fn arb_list() -> impl Strategy<Value = TodoList> {
    prop::collection::vec(
        (arb_text(), any::<bool>(), prop::option::of(arb_date())),
        0..12,
    )
    .prop_map(|items| {
        let mut list = TodoList::new();
        for (text, done, due) in items {
            list.add(&text, due).unwrap();
            if done {
                list.toggle_at(list.len() - 1).unwrap();
            }
        }
        list
    })
}

fn texts(list: &TodoList) -> Vec<String> {
    list.iter().map(|t| t.text.clone()).collect()
}

proptest! {
    #[test]
    fn add_appends_one_open_todo(list in arb_list(), text in arb_text(), due in prop::option::of(arb_date())) {
        let mut after = list.clone();
        let id = after.add(&text, due).unwrap();

        prop_assert_eq!(after.len(), list.len() + 1);
        let last = after.get_at(list.len()).unwrap();
        prop_assert_eq!(&last.id, &id);
        prop_assert_eq!(&last.text, &text);
        prop_assert!(!last.done);
        prop_assert_eq!(last.due_date, due);
        prop_assert_eq!(&after.as_slice()[..list.len()], list.as_slice());
    }

    #[test]
    fn blank_add_is_noop(list in arb_list(), blank in "[ \t]{0,6}") {
        let mut after = list.clone();

        prop_assert_eq!(after.add(&blank, None), Err(Rejected::BlankText));
        prop_assert_eq!(after, list);
    }

    #[test]
    fn toggle_flips_exactly_one(list in arb_list(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!list.is_empty());
        let index = pick.index(list.len());
        let mut after = list.clone();

        after.toggle_at(index).unwrap();

        for (i, (before, now)) in list.iter().zip(after.iter()).enumerate() {
            if i == index {
                prop_assert_eq!(now.done, !before.done);
                prop_assert_eq!(&now.text, &before.text);
                prop_assert_eq!(now.due_date, before.due_date);
            } else {
                prop_assert_eq!(now, before);
            }
        }

        after.toggle_at(index).unwrap();
        prop_assert_eq!(after, list);
    }

    #[test]
    fn remove_shifts_later_todos(list in arb_list(), index in 0usize..16) {
        let mut after = list.clone();

        if index < list.len() {
            let removed = after.remove_at(index).unwrap();
            prop_assert_eq!(&removed, list.get_at(index).unwrap());

            let mut expected = texts(&list);
            expected.remove(index);
            prop_assert_eq!(texts(&after), expected);
        } else {
            prop_assert_eq!(after.remove_at(index), Err(Rejected::NotFound));
            prop_assert_eq!(after, list);
        }
    }

    #[test]
    fn decode_inverts_encode(list in arb_list()) {
        let bytes = encode(&list).unwrap();
        prop_assert_eq!(decode(&bytes).unwrap(), list);
    }

    #[test]
    fn partition_covers_each_todo_once(list in arb_list(), today in arb_date()) {
        let view = partition(&list, today);

        prop_assert_eq!(view.active.len() + view.completed.len(), list.len());
        prop_assert!(view.active.iter().all(|e| !e.todo.done));
        prop_assert!(view.completed.iter().all(|e| e.todo.done));

        // Each group keeps list order
        prop_assert!(view.active.windows(2).all(|w| w[0].position < w[1].position));
        prop_assert!(view.completed.windows(2).all(|w| w[0].position < w[1].position));

        let merged: Vec<Todo> = view.recombine().into_iter().cloned().collect();
        prop_assert_eq!(merged.as_slice(), list.as_slice());
    }

    #[test]
    fn overdue_truth_table(due in prop::option::of(arb_date()), done in any::<bool>(), today in arb_date()) {
        let mut todo = Todo::create("x", due);
        todo.done = done;

        let expected = match due {
            Some(due) => !done && due < today,
            None => false,
        };
        prop_assert_eq!(todo.is_overdue(today), expected);
    }
}

#[test]
fn overdue_is_strict() {
    let today = base_date();
    let due_today = Todo::create("x", Some(today));
    let due_yesterday = Todo::create("x", Some(today - Duration::days(1)));

    assert!(!due_today.is_overdue(today));
    assert!(due_yesterday.is_overdue(today));
}
