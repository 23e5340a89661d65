/*!
 * Dispatch Tests
 * Script files driven through the dispatcher end to end
 */

use dqsched::process::{Accepted, Dispatched};
use dqsched::{Dispatcher, ItemClass, ItemState, Scheduler};
use pretty_assertions::assert_eq;
use std::io::Write;

const SCRIPT: &str = "\
# warm-up
echo hello world
&add 2 3
fib 10

sleep 1 2
&bogus
mul 4 5
";

fn load(dispatcher: &Dispatcher, script: &str) -> Vec<Accepted> {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(script.as_bytes()).unwrap();

    let text = std::fs::read_to_string(file.path()).unwrap();
    text.lines()
        .filter_map(|line| dispatcher.handle_line(line).unwrap())
        .collect()
}

#[test]
fn test_script_is_scheduled_in_order() {
    let dispatcher = Dispatcher::new(Scheduler::new());
    let accepted = load(&dispatcher, SCRIPT);

    assert_eq!(
        accepted,
        vec![
            Accepted::Submitted { id: 0, class: ItemClass::Foreground },
            Accepted::Submitted { id: 1, class: ItemClass::Background },
            Accepted::Submitted { id: 2, class: ItemClass::Foreground },
            Accepted::Slept { id: 1, ticks: 2 },
            Accepted::Submitted { id: 3, class: ItemClass::Background },
            Accepted::Submitted { id: 4, class: ItemClass::Foreground },
        ]
    );
    assert_eq!(dispatcher.scheduler().state(1), Some(ItemState::Sleeping));
}

#[test]
fn test_script_drains_foreground_first() {
    let dispatcher = Dispatcher::new(Scheduler::new());
    load(&dispatcher, SCRIPT);

    let mut outputs = Vec::new();
    let mut detached = Vec::new();
    loop {
        match dispatcher.dispatch_next().unwrap() {
            Dispatched::Idle => break,
            Dispatched::Completed { id, output } => outputs.push((id, output.unwrap())),
            Dispatched::Detached { id, handle } => {
                handle.join().unwrap();
                detached.push(id);
            }
        }
    }

    assert_eq!(
        outputs,
        vec![
            (0, "hello world".to_string()),
            (2, "55".to_string()),
            (4, "20".to_string()),
        ]
    );
    // The unknown command still completes and leaves the books balanced
    assert_eq!(detached, vec![3]);

    let scheduler = dispatcher.scheduler();
    assert!(!scheduler.is_idle());
    scheduler.tick();
    scheduler.tick();
    assert_eq!(scheduler.state(1), Some(ItemState::Ready));

    match dispatcher.dispatch_next().unwrap() {
        Dispatched::Detached { id, handle } => {
            assert_eq!(id, 1);
            handle.join().unwrap();
        }
        other => panic!("expected detached dispatch, got {:?}", other),
    }

    assert!(scheduler.is_idle());
    let stats = scheduler.stats();
    assert_eq!(stats.submitted, 5);
    assert_eq!(stats.completed, 5);
}

#[test]
fn test_bad_lines_are_rejected_without_side_effects() {
    let dispatcher = Dispatcher::new(Scheduler::new());
    load(&dispatcher, "echo a\n");
    let before = dispatcher.scheduler().snapshot();

    assert!(dispatcher.handle_line("sleep").is_err());
    assert!(dispatcher.handle_line("sleep 0 zero").is_err());
    assert!(dispatcher.handle_line("sleep 0 0").is_err());
    assert!(dispatcher.handle_line("sleep 9 1").is_err());
    assert!(dispatcher.handle_line("&sleep 0 1").is_err());
    assert!(dispatcher.handle_line("&").is_err());

    assert_eq!(dispatcher.scheduler().snapshot(), before);
}
