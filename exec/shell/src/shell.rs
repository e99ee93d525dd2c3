//! Host shell detection and argument building.

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// Shells that commands can be delegated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellType {
    Zsh,
    Bash,
    Sh,
    PowerShell,
    Cmd,
}

/// A resolved shell executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    pub shell_type: ShellType,
    pub shell_path: PathBuf,
}

impl Shell {
    pub fn new(shell_type: ShellType, shell_path: impl Into<PathBuf>) -> Self {
        Self {
            shell_type,
            shell_path: shell_path.into(),
        }
    }

    /// Builds a shell from an executable path, if its type is recognized.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        detect_shell_type(&path).map(|shell_type| Self::new(shell_type, path))
    }

    pub fn name(&self) -> &'static str {
        match self.shell_type {
            ShellType::Zsh => "zsh",
            ShellType::Bash => "bash",
            ShellType::Sh => "sh",
            ShellType::PowerShell => "powershell",
            ShellType::Cmd => "cmd",
        }
    }

    /// Full argv (program first) that runs `script` in this shell.
    pub fn derive_exec_args(&self, script: &str, use_login_shell: bool) -> Vec<String> {
        let program = self.shell_path.to_string_lossy().to_string();
        match self.shell_type {
            ShellType::Zsh | ShellType::Bash | ShellType::Sh => {
                let flag = if use_login_shell { "-lc" } else { "-c" };
                vec![program, flag.to_string(), script.to_string()]
            }
            ShellType::PowerShell => {
                let mut args = vec![program];
                if !use_login_shell {
                    args.push("-NoProfile".to_string());
                }
                args.push("-Command".to_string());
                args.push(script.to_string());
                args
            }
            ShellType::Cmd => vec![program, "/c".to_string(), script.to_string()],
        }
    }
}

/// Recognizes a shell from its executable name, with or without directory
/// or `.exe` suffix.
pub fn detect_shell_type(path: &Path) -> Option<ShellType> {
    let stem = path.file_stem()?.to_string_lossy().to_ascii_lowercase();
    match stem.as_str() {
        "zsh" => Some(ShellType::Zsh),
        "bash" => Some(ShellType::Bash),
        "sh" | "dash" => Some(ShellType::Sh),
        "pwsh" | "powershell" => Some(ShellType::PowerShell),
        "cmd" => Some(ShellType::Cmd),
        _ => None,
    }
}

/// Shell used when none is configured.
///
/// On Unix this is `$SHELL` when it names a recognized POSIX shell, then
/// `bash` from `PATH`, then `/bin/sh`. On Windows it is PowerShell when
/// available, else `cmd`.
pub fn default_user_shell() -> Shell {
    #[cfg(unix)]
    {
        let from_env = std::env::var_os("SHELL")
            .map(PathBuf::from)
            .and_then(Shell::from_path)
            .filter(|shell| {
                matches!(
                    shell.shell_type,
                    ShellType::Zsh | ShellType::Bash | ShellType::Sh
                ) && shell.shell_path.exists()
            });
        from_env
            .or_else(|| which::which("bash").ok().map(|p| Shell::new(ShellType::Bash, p)))
            .unwrap_or_else(|| Shell::new(ShellType::Sh, "/bin/sh"))
    }
    #[cfg(not(unix))]
    {
        which::which("pwsh")
            .or_else(|_| which::which("powershell"))
            .map(|p| Shell::new(ShellType::PowerShell, p))
            .unwrap_or_else(|_| Shell::new(ShellType::Cmd, "cmd.exe"))
    }
}

/// Joins a command and its arguments into one shell script.
///
/// `command` is passed through untouched so it may still contain shell
/// syntax; each argument is POSIX-quoted. Fails only for arguments holding
/// a NUL byte.
pub fn join_command(command: &str, args: &[String]) -> Result<String, shlex::QuoteError> {
    if args.is_empty() {
        return Ok(command.to_string());
    }
    let quoted = shlex::try_join(args.iter().map(String::as_str))?;
    Ok(format!("{command} {quoted}"))
}

#[cfg(test)]
#[path = "shell.test.rs"]
mod tests;
