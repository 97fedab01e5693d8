//! Integration test: demo and verify commands
//!
//! Runs the scripted demo on the null backend in both execution modes
//! with a fully queued event script, and the built-in verification checks.

use easel_cli::demo::{self, DemoOptions};
use easel_cli::verify::{run_checks, CheckStatus};
use easel_cli::window::ScriptedWindow;
use easel_core::Settings;
use easel_protocol::desc::Size;
use easel_protocol::Event;

fn run_demo(defer: bool, events: Vec<Event>, frames: u32) -> demo::DemoSummary {
    let settings = Settings {
        defer_api_calls: defer,
        ..Settings::default()
    };
    let ctx = easel_null::new_context(settings).expect("null context");
    let mut window = ScriptedWindow::from_events(events);
    let options = DemoOptions {
        frames,
        ..DemoOptions::default()
    };
    demo::run(ctx, &mut window, &options)
}

#[test]
fn test_demo_runs_all_frames_without_leaks() {
    for defer in [false, true] {
        let summary = run_demo(defer, Vec::new(), 5);
        assert_eq!(summary.frames_rendered, 5);
        assert!(!summary.closed_by_window);
        assert_eq!(summary.final_size, Size::new(640, 480));
        assert!(summary.leaks.is_empty(), "leaks: {:?}", summary.leaks);
    }
}

#[test]
fn test_demo_forwards_resize_and_stops_on_close() {
    for defer in [false, true] {
        let events = vec![
            Event::Resize {
                width: 1024,
                height: 768,
            },
            Event::Rune('x'),
            Event::WindowClose,
        ];
        let summary = run_demo(defer, events, 10);
        assert_eq!(summary.frames_rendered, 0);
        assert!(summary.closed_by_window);
        assert_eq!(summary.resizes, 1);
        assert_eq!(summary.final_size, Size::new(1024, 768));
        assert!(summary.leaks.is_empty());
    }
}

#[test]
fn test_verify_checks_pass() {
    let results = run_checks("/nonexistent/easel.toml");
    assert_eq!(results[0].status, CheckStatus::Warn);
    let failures: Vec<_> = results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .map(|r| r.name.as_str())
        .collect();
    assert!(failures.is_empty(), "failed checks: {:?}", failures);
    assert!(results.len() >= 8);
}
