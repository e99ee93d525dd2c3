use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_detect_shell_type_simple() {
    assert_eq!(detect_shell_type(Path::new("zsh")), Some(ShellType::Zsh));
    assert_eq!(detect_shell_type(Path::new("bash")), Some(ShellType::Bash));
    assert_eq!(detect_shell_type(Path::new("dash")), Some(ShellType::Sh));
    assert_eq!(detect_shell_type(Path::new("pwsh")), Some(ShellType::PowerShell));
    assert_eq!(detect_shell_type(Path::new("fish")), None);
}

#[test]
fn test_detect_shell_type_full_path_and_extension() {
    assert_eq!(detect_shell_type(Path::new("/bin/sh")), Some(ShellType::Sh));
    assert_eq!(
        detect_shell_type(Path::new("/usr/local/bin/bash")),
        Some(ShellType::Bash)
    );
    assert_eq!(
        detect_shell_type(Path::new("powershell.exe")),
        Some(ShellType::PowerShell)
    );
    assert_eq!(detect_shell_type(Path::new("CMD.EXE")), Some(ShellType::Cmd));
}

#[test]
fn test_shell_name() {
    let shells = [
        (ShellType::Zsh, "zsh"),
        (ShellType::Bash, "bash"),
        (ShellType::Sh, "sh"),
        (ShellType::PowerShell, "powershell"),
        (ShellType::Cmd, "cmd"),
    ];
    for (shell_type, expected) in shells {
        assert_eq!(Shell::new(shell_type, "/bin/test").name(), expected);
    }
}

#[test]
fn test_derive_exec_args_posix() {
    let shell = Shell::new(ShellType::Bash, "/bin/bash");
    assert_eq!(
        shell.derive_exec_args("echo hello", false),
        vec!["/bin/bash", "-c", "echo hello"]
    );
    assert_eq!(
        shell.derive_exec_args("echo hello", true),
        vec!["/bin/bash", "-lc", "echo hello"]
    );
}

#[test]
fn test_derive_exec_args_windows_shells() {
    let pwsh = Shell::new(ShellType::PowerShell, "pwsh");
    assert_eq!(
        pwsh.derive_exec_args("ls", false),
        vec!["pwsh", "-NoProfile", "-Command", "ls"]
    );
    let cmd = Shell::new(ShellType::Cmd, "cmd.exe");
    assert_eq!(cmd.derive_exec_args("dir", false), vec!["cmd.exe", "/c", "dir"]);
}

#[test]
fn test_join_command_quotes_args() {
    assert_eq!(join_command("ls", &[]).expect("join"), "ls");
    let joined = join_command("echo", &["a b".to_string(), "it's".to_string()]).expect("join");
    assert_eq!(
        shlex::split(&joined).expect("split"),
        vec!["echo", "a b", "it's"]
    );
    assert!(join_command("echo", &["nul\0byte".to_string()]).is_err());
}

#[cfg(unix)]
#[test]
fn test_default_user_shell_is_posix() {
    let shell = default_user_shell();
    assert!(matches!(
        shell.shell_type,
        ShellType::Bash | ShellType::Zsh | ShellType::Sh
    ));
}
