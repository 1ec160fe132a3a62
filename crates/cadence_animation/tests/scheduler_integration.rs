//! Integration tests for the scheduler, driven through a manual clock
//!
//! These tests verify that:
//! - Leaf animations map timer ticks onto loops and directions
//! - Groups drive their children from the shared timer
//! - Callbacks may start, stop and remove animations mid-tick
//! - Configuration loaded from disk changes tick behaviour

use cadence_animation::{
    AnimationEvent, AnimationId, AnimationScheduler, AnimationState, DeletionPolicy, Direction,
    EasingType, ManualClock, SchedulerConfig,
};
use std::cell::RefCell;
use std::rc::Rc;

fn scheduler() -> (AnimationScheduler, ManualClock) {
    let clock = ManualClock::new();
    let sched = AnimationScheduler::with_clock(SchedulerConfig::default(), clock.clone());
    (sched, clock)
}

/// Record every event of `id` tagged with `tag`
fn record(
    sched: &mut AnimationScheduler,
    id: AnimationId,
    tag: &'static str,
    log: &Rc<RefCell<Vec<(&'static str, AnimationEvent)>>>,
) {
    let sink = log.clone();
    sched.connect(id, move |_, event| sink.borrow_mut().push((tag, *event)));
}

fn finished_tags(log: &Rc<RefCell<Vec<(&'static str, AnimationEvent)>>>) -> Vec<&'static str> {
    log.borrow()
        .iter()
        .filter(|(_, event)| *event == AnimationEvent::Finished)
        .map(|(tag, _)| *tag)
        .collect()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("cadence_animation=trace"))
        .with_test_writer()
        .try_init();
}

#[test]
fn test_loops_follow_the_timer() {
    init_tracing();
    let (mut sched, clock) = scheduler();
    let id = sched.add_pause(1000);
    sched.set_loop_count(id, 3);
    let log = Rc::new(RefCell::new(Vec::new()));
    record(&mut sched, id, "pause", &log);

    sched.start(id);
    sched.pump();

    clock.advance_ms(1000);
    sched.pump();
    let anim = sched.get(id).unwrap();
    assert_eq!((anim.current_loop(), anim.current_loop_time()), (0, 1000));

    clock.advance_ms(1);
    sched.pump();
    let anim = sched.get(id).unwrap();
    assert_eq!((anim.current_loop(), anim.current_loop_time()), (1, 1));

    clock.advance_ms(2000);
    sched.pump();
    assert_eq!(sched.state(id), Some(AnimationState::Stopped));
    assert_eq!(sched.get(id).unwrap().current_time(), 3000);

    let loops: Vec<i32> = log
        .borrow()
        .iter()
        .filter_map(|(_, event)| match event {
            AnimationEvent::CurrentLoopChanged(n) => Some(*n),
            _ => None,
        })
        .collect();
    assert_eq!(loops, vec![1, 2]);
    assert_eq!(finished_tags(&log), vec!["pause"]);
    assert!(!sched.is_clock_active());
}

#[test]
fn test_backward_mirrors_forward() {
    let (mut sched, clock) = scheduler();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let id = sched.add_animation(100, EasingType::Linear, move |_, frame| {
        sink.borrow_mut().push(frame.progress);
    });
    sched.set_direction(id, Direction::Backward);
    assert_eq!(sched.get(id).unwrap().current_time(), 100);

    sched.start(id);
    sched.pump();
    for _ in 0..4 {
        clock.advance_ms(25);
        sched.pump();
    }

    assert_eq!(*seen.borrow(), vec![1.0, 0.75, 0.5, 0.25, 0.0]);
    assert_eq!(sched.state(id), Some(AnimationState::Stopped));
}

#[test]
fn test_reversing_midway_keeps_position() {
    let (mut sched, clock) = scheduler();
    let id = sched.add_pause(100);
    sched.start(id);
    sched.pump();

    clock.advance_ms(40);
    sched.pump();
    sched.set_direction(id, Direction::Backward);
    assert_eq!(sched.get(id).unwrap().current_time(), 40);

    clock.advance_ms(10);
    sched.pump();
    assert_eq!(sched.get(id).unwrap().current_time(), 30);
}

#[test]
fn test_start_twice_is_a_no_op() {
    let (mut sched, _clock) = scheduler();
    let id = sched.add_pause(100);
    let log = Rc::new(RefCell::new(Vec::new()));
    record(&mut sched, id, "pause", &log);

    sched.start(id);
    sched.start(id);
    assert_eq!(sched.pending_count(), 1);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn test_sequence_with_open_ended_tail() {
    let (mut sched, _clock) = scheduler();
    let group = sched.add_sequential_group();
    let first = sched.add_pause(100);
    let second = sched.add_pause(200);
    let tail = sched.add_uncontrolled(|_, _| {});
    for child in [first, second, tail] {
        sched.add_to_group(group, child).unwrap();
    }
    assert_eq!(sched.duration(group), None);

    sched.start(group);
    sched.set_current_time(group, 250);
    assert_eq!(sched.current_animation(group), Some(second));
    assert_eq!(sched.get(second).unwrap().current_time(), 150);

    sched.set_current_time(group, 400);
    assert_eq!(sched.current_animation(group), Some(tail));
    assert_eq!(sched.state(second), Some(AnimationState::Stopped));
    assert_eq!(sched.get(tail).unwrap().current_time(), 100);

    sched.stop(tail);
    assert_eq!(sched.state(group), Some(AnimationState::Stopped));
}

#[test]
fn test_seek_finishes_skipped_children_in_order() {
    let (mut sched, _clock) = scheduler();
    let group = sched.add_sequential_group();
    let log = Rc::new(RefCell::new(Vec::new()));
    for tag in ["a", "b", "c"] {
        let child = sched.add_pause(100);
        record(&mut sched, child, tag, &log);
        sched.add_to_group(group, child).unwrap();
    }
    record(&mut sched, group, "group", &log);

    sched.start(group);
    sched.set_current_time(group, 300);

    assert_eq!(finished_tags(&log), vec!["a", "b", "c", "group"]);
    assert_eq!(sched.state(group), Some(AnimationState::Stopped));
}

#[test]
fn test_callback_stops_a_later_animation() {
    let (mut sched, clock) = scheduler();
    let victim = sched.add_pause(1000);
    let killer = sched.add_animation(1000, EasingType::Linear, move |sched, frame| {
        if frame.local_time >= 100 {
            sched.stop(victim);
        }
    });

    sched.start(killer);
    sched.start(victim);
    sched.pump();
    assert_eq!(sched.running_count(), 2);

    clock.advance_ms(100);
    sched.pump();
    assert_eq!(sched.state(victim), Some(AnimationState::Stopped));
    assert_eq!(sched.get(victim).unwrap().current_time(), 0);
    assert_eq!(sched.running_count(), 1);
}

#[test]
fn test_callback_stops_itself() {
    let (mut sched, clock) = scheduler();
    let id = sched.add_animation(1000, EasingType::OutCubic, |sched, frame| {
        if frame.local_time >= 300 {
            sched.stop(frame.id);
        }
    });

    sched.start(id);
    sched.pump();
    clock.advance_ms(400);
    sched.pump();

    assert_eq!(sched.state(id), Some(AnimationState::Stopped));
    assert_eq!(sched.get(id).unwrap().current_time(), 400);
    assert!(!sched.is_clock_active());
}

#[test]
fn test_delete_when_stopped() {
    let (mut sched, clock) = scheduler();
    let id = sched.add_pause(50);
    sched.start_with_policy(id, DeletionPolicy::DeleteWhenStopped);
    assert!(sched.get(id).unwrap().deletes_when_stopped());
    sched.pump();

    let log = Rc::new(RefCell::new(Vec::new()));
    record(&mut sched, id, "pause", &log);

    clock.advance_ms(60);
    sched.pump();
    // Stopped by the tick, deleted by the admission pass that follows it
    assert_eq!(finished_tags(&log), vec!["pause"]);
    assert!(!sched.contains(id));
    assert!(sched.is_empty());
}

#[test]
fn test_nested_groups_run_to_completion() {
    init_tracing();
    let (mut sched, clock) = scheduler();
    let outer = sched.add_parallel_group();
    let seq = sched.add_sequential_group();
    let a = sched.add_pause(100);
    let b = sched.add_pause(200);
    let side = sched.add_pause(250);
    sched.add_to_group(seq, a).unwrap();
    sched.add_to_group(seq, b).unwrap();
    sched.add_to_group(outer, seq).unwrap();
    sched.add_to_group(outer, side).unwrap();
    assert_eq!(sched.duration(outer), Some(300));

    sched.start(outer);
    sched.pump();
    // Only the top-level group is driven by the timer
    assert_eq!(sched.running_count(), 1);

    clock.advance_ms(150);
    sched.pump();
    assert_eq!(sched.current_animation(seq), Some(b));
    assert_eq!(sched.get(b).unwrap().current_time(), 50);
    assert_eq!(sched.get(side).unwrap().current_time(), 150);

    clock.advance_ms(150);
    sched.pump();
    for id in [outer, seq, a, b, side] {
        assert_eq!(sched.state(id), Some(AnimationState::Stopped));
    }
    assert!(!sched.is_clock_active());
}

#[test]
fn test_config_file_drives_consistent_timing() {
    let path = std::env::temp_dir().join(format!("cadence-{}.toml", std::process::id()));
    std::fs::write(&path, "timer_interval_ms = 20\nconsistent_timing = true\n").unwrap();
    let config = SchedulerConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config.timer_interval_ms, 20);

    let clock = ManualClock::new();
    let mut sched = AnimationScheduler::with_clock(config, clock.clone());
    let id = sched.add_pause(1000);
    sched.start(id);
    sched.pump();

    for _ in 0..3 {
        clock.advance_ms(7);
        sched.pump();
    }
    assert_eq!(sched.get(id).unwrap().current_time(), 60);
}

#[test]
fn test_config_serializes_to_json() {
    let config = SchedulerConfig::default().with_consistent_timing(true);
    let value = serde_json::to_value(&config).unwrap();
    assert_eq!(value["timer_interval_ms"], 16);
    assert_eq!(value["consistent_timing"], true);
}
