use super::*;

#[cfg(unix)]
fn spawn_group_leader(script: &str) -> std::process::Child {
    use std::os::unix::process::CommandExt;
    std::process::Command::new("/bin/sh")
        .arg("-c")
        .arg(script)
        .process_group(0)
        .spawn()
        .expect("spawn")
}

#[cfg(unix)]
#[test]
fn test_terminate_reaches_group_and_reports_not_running_after_exit() {
    let mut child = spawn_group_leader("sleep 30");
    let pid = child.id();
    assert!(is_process_alive(pid));

    let outcome = signal_process_group(pid, ProcessSignal::Terminate).expect("signal");
    assert_eq!(outcome, SignalOutcome::Delivered);

    let status = child.wait().expect("wait");
    assert_eq!(exit_parts(status), (None, Some(libc::SIGTERM)));
    assert!(!is_process_alive(pid));

    let again = signal_process_group(pid, ProcessSignal::Kill).expect("signal");
    assert_eq!(again, SignalOutcome::NotRunning);
}

#[cfg(unix)]
#[test]
fn test_exit_parts_for_normal_exit() {
    let mut child = spawn_group_leader("exit 3");
    let status = child.wait().expect("wait");
    assert_eq!(exit_parts(status), (Some(3), None));
}
