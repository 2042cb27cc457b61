use std::path::Path;

use d2g::{
    assignment::AssignmentConfig,
    pipeline::{Stage, plan},
};

fn config(tasks: &str) -> AssignmentConfig {
    let text = format!(
        "due_date: 2024-06-01\ntemplate_repository: https://example.test/t.git\ntasks: {tasks}\n"
    );
    AssignmentConfig::parse(&text, Path::new("memory/assignment.yml")).expect("parse assignment")
}

fn position(stages: &[Stage], wanted: &Stage) -> usize {
    stages
        .iter()
        .position(|stage| stage == wanted)
        .unwrap_or_else(|| panic!("{wanted:?} missing from plan"))
}

#[test]
fn provisioning_always_comes_first() {
    let stages = plan(&config("task01 task02"));
    assert_eq!(stages.first(), Some(&Stage::Provision));
}

#[test]
fn stage_order_is_invariant() {
    let stages = plan(&config("task01 task02 task03"));

    let checkout = position(&stages, &Stage::Checkout);
    let overlay = position(&stages, &Stage::Override);
    let first_task = position(&stages, &Stage::Task("task01".into()));
    let last_task = position(&stages, &Stage::Task("task03".into()));
    let present = position(&stages, &Stage::Present);
    let revert = position(&stages, &Stage::Revert);

    assert!(position(&stages, &Stage::Provision) < checkout);
    assert!(checkout < overlay);
    assert!(overlay < first_task);
    assert!(last_task < present);
    assert!(present < revert);
    assert_eq!(revert, stages.len() - 1);
}

#[test]
fn tasks_keep_their_configured_order() {
    let stages = plan(&config("zeta alpha middle"));

    let tasks: Vec<_> = stages
        .iter()
        .filter_map(|stage| match stage {
            Stage::Task(name) => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(tasks, ["zeta", "alpha", "middle"]);
}

#[test]
fn every_configured_task_is_planned_exactly_once() {
    let stages = plan(&config("task01 task02"));

    let task_count = stages
        .iter()
        .filter(|stage| matches!(stage, Stage::Task(_)))
        .count();
    assert_eq!(task_count, 2);
    assert_eq!(stages.len(), 2 + 5);
}
