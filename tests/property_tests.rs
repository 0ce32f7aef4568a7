//! Property-based tests using proptest.
//!
//! Covers the task state machine, registry invariants under arbitrary
//! operation sequences, conversation ordering, and tolerance of arbitrary
//! JSON tool arguments.

use std::collections::HashSet;

use proptest::prelude::*;
use serde_json::Value;

use codex_mcp::server::{PollArgs, PromptArgs};
use codex_mcp::store::{ConversationStore, JobRegistry, RetentionPolicy};
use codex_mcp::types::preview;
use codex_mcp::{Role, TaskStatus};

// ─── Arbitrary Strategies ───────────────────────────────────────────────────

fn arb_task_status() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(vec![
        TaskStatus::Running,
        TaskStatus::Completed,
        TaskStatus::Error,
    ])
}

#[derive(Debug, Clone)]
enum Op {
    Create(String),
    Complete(usize),
    Fail(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z ]{0,40}".prop_map(Op::Create),
        (0usize..32).prop_map(Op::Complete),
        (0usize..32).prop_map(Op::Fail),
    ]
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        ".{0,20}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::hash_map("[a-z_]{1,16}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

// ─── Property Tests: State Machine ──────────────────────────────────────────

proptest! {
    /// Terminal states accept no further transition.
    #[test]
    fn terminal_states_reject_all_transitions(
        from in prop::sample::select(vec![TaskStatus::Completed, TaskStatus::Error]),
        to in arb_task_status(),
    ) {
        prop_assert!(!from.can_transition_to(&to));
        prop_assert!(from.validate_transition("t", &to).is_err());
    }

    /// Running only leaves to a terminal state.
    #[test]
    fn running_moves_only_to_terminal(to in arb_task_status()) {
        prop_assert_eq!(TaskStatus::Running.can_transition_to(&to), to.is_terminal());
    }
}

// ─── Property Tests: Registry ───────────────────────────────────────────────

proptest! {
    /// Arbitrary operation sequences keep ids unique, order stable, and
    /// every task transitions at most once.
    #[test]
    fn registry_invariants_hold(ops in prop::collection::vec(arb_op(), 1..60)) {
        let registry = JobRegistry::new();
        let mut created: Vec<String> = Vec::new();
        let mut finished: HashSet<String> = HashSet::new();

        for op in ops {
            match op {
                Op::Create(prompt) => {
                    let task = registry.create(prompt, "m");
                    prop_assert_eq!(task.status, TaskStatus::Running);
                    created.push(task.task_id);
                }
                Op::Complete(_) | Op::Fail(_) if created.is_empty() => {}
                Op::Complete(i) => {
                    let id = &created[i % created.len()];
                    let outcome = registry.complete(id, "r", None);
                    prop_assert_eq!(outcome.is_ok(), finished.insert(id.clone()));
                }
                Op::Fail(i) => {
                    let id = &created[i % created.len()];
                    let outcome = registry.fail(id, "e");
                    prop_assert_eq!(outcome.is_ok(), finished.insert(id.clone()));
                }
            }
        }

        let unique: HashSet<&String> = created.iter().collect();
        prop_assert_eq!(unique.len(), created.len());

        let listed: Vec<String> = registry.list_all().into_iter().map(|t| t.task_id).collect();
        prop_assert_eq!(&listed, &created);

        for id in &created {
            let record = registry.get(id).unwrap();
            prop_assert_eq!(record.status.is_terminal(), finished.contains(id));
        }
    }

    /// Finished-task retention never evicts a running task.
    #[test]
    fn retention_keeps_running_tasks(
        running in 0usize..10,
        finished in 0usize..20,
        limit in 0usize..8,
    ) {
        let registry = JobRegistry::new().with_retention(RetentionPolicy {
            max_finished_tasks: Some(limit),
            max_conversations: None,
        });
        let running_ids: Vec<String> =
            (0..running).map(|_| registry.create("r", "m").task_id).collect();
        for _ in 0..finished {
            let id = registry.create("f", "m").task_id;
            registry.complete(&id, "done", None).unwrap();
        }

        for id in &running_ids {
            prop_assert!(registry.get(id).is_ok());
        }
        prop_assert_eq!(registry.len(), running + finished.min(limit));
    }
}

// ─── Property Tests: Conversations ──────────────────────────────────────────

proptest! {
    /// Appended turns come back in insertion order behind the system turn.
    #[test]
    fn conversation_preserves_turn_order(
        turns in prop::collection::vec(("[a-z]{1,10}", any::<bool>()), 0..20),
    ) {
        let store = ConversationStore::new("sys");
        let id = store.resolve_or_create(None).conversation_id;
        for (content, is_user) in &turns {
            let role = if *is_user { Role::User } else { Role::Assistant };
            prop_assert!(store.append(&id, role, content.clone()));
        }

        let messages = store.messages(&id).unwrap();
        prop_assert_eq!(messages.len(), turns.len() + 1);
        prop_assert_eq!(messages[0].role, Role::System);
        for (message, (content, _)) in messages[1..].iter().zip(&turns) {
            prop_assert_eq!(&message.content, content);
        }
    }

    /// Previews never exceed the limit and are prefixes of the input.
    #[test]
    fn preview_is_bounded_prefix(text in "\\PC{0,300}", max in 0usize..150) {
        let shown = preview(&text, max);
        prop_assert!(shown.chars().count() <= max);
        prop_assert!(text.starts_with(&shown));
    }
}

// ─── Fuzz: Tool Arguments ───────────────────────────────────────────────────

proptest! {
    /// Arbitrary JSON never panics argument parsing.
    #[test]
    fn arbitrary_json_never_panics(value in arb_json()) {
        let _ = serde_json::from_value::<PromptArgs>(value.clone());
        let _ = serde_json::from_value::<PollArgs>(value);
    }
}
