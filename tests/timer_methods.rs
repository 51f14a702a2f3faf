//! Dialog timers driven by the real clock and the commands they schedule.

use bubbletea_dialog::prelude::*;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test]
async fn dialog_closes_when_expiry_command_completes() {
    init_tracing();
    let mut host = DialogHost::new();
    host.fire(&[with_text("bye"), with_timer(ms(50))]).unwrap();

    let cmd = host.take_cmd().expect("expiry command");
    let msg = cmd.await.expect("expiry message");
    assert!(msg.downcast_ref::<ExpireMsg>().is_some());

    host.update(msg);
    assert!(!host.is_visible());
    assert_eq!(host.outcome(), Some(Outcome::Dismissed(DismissReason::Timer)));
}

#[tokio::test]
async fn stopped_dialog_outlives_its_deadline() {
    init_tracing();
    let mut host = DialogHost::new();
    host.fire(&[with_text("stay"), with_timer(ms(100))]).unwrap();
    let cmd = host.take_cmd().expect("expiry command");

    tokio::time::sleep(ms(20)).await;
    let left = host.stop_timer().unwrap();
    assert!(left > Duration::ZERO && left <= ms(80));
    assert_eq!(host.is_timer_running(), Some(false));

    let msg = cmd.await.expect("expiry message");
    host.update(msg);
    assert!(host.is_visible());
    assert_eq!(host.stop_timer(), Some(left));
}

#[tokio::test]
async fn extended_dialog_closes_after_new_deadline() {
    init_tracing();
    let mut host = DialogHost::new();
    host.fire(&[with_timer(ms(40))]).unwrap();
    let stale = host.take_cmd().expect("expiry command");

    let left = host.increase_timer(ms(60)).unwrap();
    assert!(left > ms(60) && left <= ms(100));
    let extended = host.take_cmd().expect("rescheduled expiry");

    host.update(stale.await.expect("expiry message"));
    assert!(host.is_visible());

    host.update(extended.await.expect("expiry message"));
    assert!(!host.is_visible());
}

#[tokio::test]
async fn nanosecond_timer_closes_dialog() {
    init_tracing();
    let mut host = DialogHost::new();
    host.fire(&[with_timer(Duration::from_nanos(1))]).unwrap();
    std::thread::sleep(ms(1));

    let msg = host.take_cmd().expect("expiry command").await.expect("expiry message");
    host.update(msg);
    assert!(!host.is_visible());
    assert_eq!(host.outcome(), Some(Outcome::Dismissed(DismissReason::Timer)));
}
