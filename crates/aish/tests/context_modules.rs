mod support;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;

use agent_provider::ChatRole;
use aish::context::ContextAggregator;
use aish::Conversation;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use support::{mock, session_with};

const FOOTER: &str = "\n\n-----------------------------------------\n";

fn write_module(config_dir: &Path, name: &str, script: &str) {
    let modules = config_dir.join("context_modules");
    fs::create_dir_all(&modules).expect("modules dir");
    let path = modules.join(name);
    fs::write(&path, format!("#!/bin/sh\n{script}\n")).expect("module script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
}

fn config_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    write_module(dir.path(), "hello.sh", "echo hello from module");
    write_module(dir.path(), "broken.sh", "echo nope >&2; exit 3");
    write_module(dir.path(), "slow.sh", "exec sleep 5");
    dir
}

#[test]
fn outputs_are_framed_in_declaration_order() {
    let dir = config_dir();
    write_module(dir.path(), "second.sh", "printf second");
    let aggregator = ContextAggregator::new(dir.path(), ["second.sh", "hello.sh"]);

    assert_eq!(
        aggregator.aggregate(),
        format!(
            "\n\n------- Context Module: second.sh -------\nsecond{FOOTER}\
             \n\n------- Context Module: hello.sh -------\nhello from module\n{FOOTER}"
        )
    );
}

#[test]
fn failing_module_does_not_abort_the_rest() {
    let dir = config_dir();
    let aggregator = ContextAggregator::new(dir.path(), ["broken.sh", "missing.sh", "hello.sh", ""]);

    let context = aggregator.aggregate();

    assert_eq!(context.matches("------- Context Module:").count(), 3);
    assert!(context.contains("[context module error]"));
    assert!(context.contains("exit_code=3: nope"));
    assert!(context.contains("module not found"));
    assert!(context.contains("hello from module"));
}

#[test]
fn slow_module_times_out() {
    let dir = config_dir();
    let aggregator =
        ContextAggregator::new(dir.path(), ["slow.sh"]).with_timeout(Duration::from_millis(200));

    let context = aggregator.aggregate();

    assert!(context.contains("[context module error]"));
    assert!(context.contains("timeout after 0s"));
}

#[test]
fn context_is_the_third_system_message() {
    let dir = config_dir();
    let provider = mock(Vec::<&str>::new());
    let session = session_with(&provider, ContextAggregator::new(dir.path(), ["hello.sh"]));

    let messages = session.build_messages(&Conversation::new());

    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2].role, ChatRole::System);
    assert!(messages[2].content.contains("hello from module"));
}
