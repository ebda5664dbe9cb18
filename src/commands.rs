use crate::output::OutputRecord;
use crate::search_path::SearchPath;
use bytes::BytesMut;
use std::env;
use std::path::Path;
use std::process::Command;

/// List of builtin commands
pub const BUILTINS: &[&str] = &["echo", "exit", "type", "pwd", "cd"];

/// Result of running one command.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Dispatch {
    pub records: Vec<OutputRecord>,
    /// Set by `exit`; the caller terminates once output has been written.
    pub exit: Option<i32>,
}

impl From<Vec<OutputRecord>> for Dispatch {
    fn from(records: Vec<OutputRecord>) -> Self {
        Self {
            records,
            exit: None,
        }
    }
}

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// Runs `cmd` with `args` (not including the command name itself).
pub fn dispatch(cmd: &str, args: &[String]) -> Dispatch {
    log::debug!("dispatching {} {:?}", cmd, args);
    match cmd {
        "exit" => Dispatch {
            records: Vec::new(),
            exit: Some(exit_code(args)),
        },
        "echo" => vec![OutputRecord::stdout(args.join(" ") + "\n")].into(),
        "type" => execute_type(args).into(),
        "pwd" => execute_pwd(args).into(),
        "cd" => execute_cd(args).into(),
        _ => execute_external(cmd, args).into(),
    }
}

fn exit_code(args: &[String]) -> i32 {
    args.first().map_or(0, |code| code.parse().unwrap_or(1))
}

fn execute_type(args: &[String]) -> Vec<OutputRecord> {
    args.iter()
        .map(|name| {
            if is_builtin(name) {
                OutputRecord::stdout(format!("{} is a shell builtin\n", name))
            } else {
                match SearchPath::from_env().find(name) {
                    Some(path) => OutputRecord::stdout(format!("{}\n", path.display())),
                    None => OutputRecord::stdout(format!("{}: not found\n", name)),
                }
            }
        })
        .collect()
}

fn execute_pwd(args: &[String]) -> Vec<OutputRecord> {
    if !args.is_empty() {
        return vec![OutputRecord::stderr("pwd: too many arguments\n")];
    }
    let record = match env::current_dir() {
        Ok(dir) => OutputRecord::stdout(format!("{}\n", dir.display())),
        Err(e) => OutputRecord::stderr(format!("pwd: {}\n", e)),
    };
    vec![record]
}

fn execute_cd(args: &[String]) -> Vec<OutputRecord> {
    let home = env::var("HOME").unwrap_or_default();
    // Errors report the directory as typed, before `~` is replaced.
    let (typed, dir) = match args {
        [] => (home.clone(), home),
        [dir] => match dir.strip_prefix('~') {
            Some(rest) => (dir.clone(), format!("{}{}", home, rest)),
            None => (dir.clone(), dir.clone()),
        },
        [first, ..] => {
            return vec![OutputRecord::stderr(format!(
                "cd: string not in pwd: {}\n",
                first
            ))];
        }
    };
    match env::set_current_dir(&dir) {
        Ok(()) => Vec::new(),
        Err(e) => {
            log::debug!("cd to {} failed: {}", dir, e);
            vec![OutputRecord::stderr(format!(
                "cd: {}: No such file or directory\n",
                typed
            ))]
        }
    }
}

/// Looks `cmd` up on the search path and runs it once per argument.
fn execute_external(cmd: &str, args: &[String]) -> Vec<OutputRecord> {
    let Some(program) = SearchPath::from_env().find(cmd) else {
        return vec![OutputRecord::stderr(format!("{}: command not found\n", cmd))];
    };

    let mut invocations: Vec<Option<String>> = args.iter().cloned().map(Some).collect();
    if invocations.is_empty() {
        let cwd = (cmd == "ls")
            .then(|| env::current_dir().ok())
            .flatten()
            .map(|dir| dir.display().to_string());
        invocations.push(cwd);
    }

    invocations
        .into_iter()
        .map(|arg| run_program(cmd, &program, arg.as_deref()))
        .collect()
}

/// Runs one invocation and captures its stdout followed by its stderr.
fn run_program(cmd: &str, program: &Path, arg: Option<&str>) -> OutputRecord {
    let mut command = Command::new(program);
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.arg0(cmd);
    }
    command.args(arg);
    log::debug!("running {:?}", command);

    match command.output() {
        Ok(output) => {
            let mut combined = BytesMut::with_capacity(output.stdout.len() + output.stderr.len());
            combined.extend_from_slice(&output.stdout);
            combined.extend_from_slice(&output.stderr);
            let text = String::from_utf8_lossy(&combined).into_owned();
            if output.status.success() {
                OutputRecord::stdout(text)
            } else {
                OutputRecord::stderr(text)
            }
        }
        Err(e) => OutputRecord::stderr(format!("{}: {}\n", cmd, e)),
    }
}
