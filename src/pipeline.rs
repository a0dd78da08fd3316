//! The docopts run: own arguments first, then the target script's.

use crate::config::{Action, Cli, ConfigError, StoreFormat};
use crate::help::{generate_version, resolve_usage, usage_from_file};
use crate::output::{
    render, write_error_script, write_help_script, RenderError, ShellExit,
};
use crate::parser::{DocoptEngine, ParseOutcome, ParseRequest, UsageEngine};
use crate::store::{print_keys, print_value, JsonStore};
use anyhow::{anyhow, Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::fs;
use std::io::{Read, Write};
use tracing::{debug, warn};

/// Token separating docopts' own arguments from the target arguments.
pub const COLON: &str = ":";

/// Message used when docopts is called without the arguments it needs.
const NO_ARGUMENT: &str = "no argument";

/// Default message for the `fail` action.
const DEFAULT_FAIL_MESSAGE: &str = "invalid arguments";

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Output is parsed data, or docopts' own help.
    Success,
    /// Output is shell code reporting an error, or nothing.
    Failure,
    /// Output is shell code printing the target's help or version.
    HelpShown,
}

impl Exit {
    pub fn code(self) -> u8 {
        match self {
            Exit::Success => 0,
            Exit::Failure => 1,
            Exit::HelpShown => 2,
        }
    }
}

/// The process streams, injectable for tests.
pub struct Streams<'a> {
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
    pub stdin: &'a mut dyn Read,
}

/// docopts' own arguments, parsed and paired with the target argv.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub cli: Cli,
    pub target_argv: Vec<String>,
}

/// Result of parsing docopts' own arguments.
#[derive(Debug)]
pub enum SelfParse {
    /// Go on with the target arguments.
    Ready(Invocation),
    /// Everything has been written; exit with this status.
    Done(Exit),
}

/// Split arguments at the first `:` token.
///
/// Returns the arguments before it and, when the token is present, the
/// arguments after it. The token itself belongs to neither. A `:` after the
/// first `--` is a target argument and never splits.
pub fn split_at_colon(args: &[String]) -> (Vec<String>, Option<Vec<String>>) {
    let colon = args
        .iter()
        .take_while(|arg| arg.as_str() != "--")
        .position(|arg| arg == COLON);
    match colon {
        Some(index) => (args[..index].to_vec(), Some(args[index + 1..].to_vec())),
        None => (args.to_vec(), None),
    }
}

/// Run docopts on `args` (without the program name).
///
/// `store` is the raw `DOCOPTS_JSON` value. `on_ready` is called once docopts'
/// own arguments are known, before any target parsing.
pub fn run(
    args: &[String],
    store: Option<&str>,
    streams: &mut Streams<'_>,
    on_ready: impl FnOnce(&Invocation),
) -> Result<Exit> {
    if args.first().map(String::as_str) == Some("get") {
        let key = shortcut_key(&args[1..]).ok_or_else(|| anyhow!("get: missing <arg_name>"))?;
        return get_value(store, key, streams.stdout);
    }

    match parse_self(args, streams)? {
        SelfParse::Done(exit) => Ok(exit),
        SelfParse::Ready(invocation) => {
            on_ready(&invocation);
            debug!(
                cli = ?invocation.cli,
                target_argv = ?invocation.target_argv,
                "parsed docopts arguments"
            );
            execute(&invocation, &DocoptEngine, store, streams)
        }
    }
}

/// Key argument of `get`, skipping an optional `--`.
fn shortcut_key(rest: &[String]) -> Option<&str> {
    match rest.first().map(String::as_str) {
        Some("--") => rest.get(1).map(String::as_str),
        other => other,
    }
}

/// Parse docopts' own arguments.
///
/// `-h` or `-V` without a value print docopts' own help or version. A missing
/// required argument is reported as shell code for the caller to eval; any
/// other mistake is reported on stderr.
pub fn parse_self(args: &[String], streams: &mut Streams<'_>) -> Result<SelfParse> {
    if args.is_empty() {
        write_error_script(streams.stdout, NO_ARGUMENT, &short_usage(), ShellExit::Exit)?;
        return Ok(SelfParse::Done(Exit::Failure));
    }

    let (own_args, colon_argv) = split_at_colon(args);
    let program = std::iter::once("docopts".to_string());
    let cli = match Cli::try_parse_from(program.chain(own_args)) {
        Ok(cli) => cli,
        Err(err) => return handle_self_error(err, streams),
    };

    if cli.wants_own_help() {
        write!(streams.stdout, "{}", Cli::command().render_help())?;
        return Ok(SelfParse::Done(Exit::Success));
    }
    if cli.wants_own_version() {
        writeln!(streams.stdout, "{}", generate_version())?;
        return Ok(SelfParse::Done(Exit::Success));
    }

    let target_argv = match (colon_argv, &cli.action) {
        (Some(argv), _) => argv,
        (None, Some(Action::Parse { argv, .. })) | (None, Some(Action::AutoParse { argv, .. })) => {
            argv.clone()
        }
        (None, Some(_)) => Vec::new(),
        (None, None) => return Err(ConfigError::MissingColon.into()),
    };

    Ok(SelfParse::Ready(Invocation { cli, target_argv }))
}

fn handle_self_error(err: clap::Error, streams: &mut Streams<'_>) -> Result<SelfParse> {
    match err.kind() {
        ErrorKind::MissingRequiredArgument => {
            write_error_script(streams.stdout, NO_ARGUMENT, &short_usage(), ShellExit::Exit)?;
        }
        _ => {
            write!(streams.stderr, "{}", err.render())?;
        }
    }
    Ok(SelfParse::Done(Exit::Failure))
}

fn short_usage() -> String {
    Cli::command().render_usage().to_string().trim().to_string()
}

/// Carry out the action selected by docopts' own arguments.
pub fn execute(
    invocation: &Invocation,
    engine: &dyn UsageEngine,
    store: Option<&str>,
    streams: &mut Streams<'_>,
) -> Result<Exit> {
    let cli = &invocation.cli;

    match &cli.action {
        Some(Action::Get { arg_name }) => get_value(store, arg_name, streams.stdout),
        Some(Action::GetKeys) => {
            let store = JsonStore::load(store).context("get-keys")?;
            print_keys(streams.stdout, &store)?;
            Ok(Exit::Success)
        }
        Some(Action::Dump { format }) => {
            let store = JsonStore::load(store).context("dump")?;
            store.write(streams.stdout, *format).context("dump")?;
            Ok(Exit::Success)
        }
        Some(Action::Merge {
            format,
            config_file,
        }) => {
            let mut store = JsonStore::load(store).context("merge")?;
            if *format == StoreFormat::Ini {
                return Err(RenderError::NotSupported("ini")).context("merge");
            }
            let text = fs::read_to_string(config_file)
                .with_context(|| format!("merge: cannot read '{}'", config_file.display()))?;
            let file = JsonStore::from_json(&text)
                .with_context(|| format!("merge: '{}'", config_file.display()))?;
            store.merge(file);
            store
                .write_json(streams.stdout, false)
                .context("merge")?;
            Ok(Exit::Success)
        }
        Some(Action::Fail { message }) => {
            JsonStore::load(store).context("fail")?;
            let usage = match cli.usage_arg() {
                Some(usage) => {
                    resolve_usage(usage, None, &cli.separator, streams.stdin, cli.debug)?.usage
                }
                None => String::new(),
            };
            let message = message.as_deref().unwrap_or(DEFAULT_FAIL_MESSAGE);
            write_error_script(streams.stdout, message, &usage, cli.shell_exit())?;
            Ok(Exit::Failure)
        }
        Some(Action::Parse { .. }) | Some(Action::AutoParse { .. }) | None => {
            parse_target(invocation, engine, streams)
        }
    }
}

fn get_value(store: Option<&str>, key: &str, out: &mut dyn Write) -> Result<Exit> {
    let store = JsonStore::load(store).with_context(|| format!("get '{}'", key))?;
    print_value(out, &store, key).with_context(|| format!("get '{}'", key))?;
    Ok(Exit::Success)
}

/// Parse the target arguments and render them.
///
/// Every outcome leaves valid shell code on stdout: parsed values, help text
/// followed by `exit 0`, or an error message followed by `exit 64`.
fn parse_target(
    invocation: &Invocation,
    engine: &dyn UsageEngine,
    streams: &mut Streams<'_>,
) -> Result<Exit> {
    let cli = &invocation.cli;
    let mode = cli.output_mode()?;

    let usage = match &cli.action {
        Some(Action::AutoParse { filename, .. }) => usage_from_file(filename)?,
        Some(Action::Parse { msg, .. }) => cli.usage_arg().unwrap_or(msg).to_string(),
        _ => match cli.usage_arg() {
            Some(usage) => usage.to_string(),
            None => {
                write_error_script(streams.stdout, NO_ARGUMENT, &short_usage(), cli.shell_exit())?;
                return Ok(Exit::Failure);
            }
        },
    };
    let spec = resolve_usage(
        &usage,
        cli.version_arg(),
        &cli.separator,
        streams.stdin,
        cli.debug,
    )?;
    debug!(usage = %spec.usage, version = ?spec.version, ?mode, "resolved usage");
    if cli.version_arg().is_some() && spec.version.is_none() {
        warn!("version text is empty, --version is left to the usage grammar");
    }

    let request = ParseRequest {
        usage: &spec.usage,
        argv: &invocation.target_argv,
        version: spec.version.as_deref(),
        options_first: cli.options_first,
        skip_help_flags: cli.no_help,
    };

    match engine.parse(&request) {
        Ok(ParseOutcome::Success(parsed)) => {
            debug!(?parsed, "target arguments parsed");
            render(streams.stdout, &parsed, &mode).context("cannot output parsed arguments")?;
            Ok(Exit::Success)
        }
        Ok(ParseOutcome::Help(text)) | Ok(ParseOutcome::Version(text)) => {
            write_help_script(streams.stdout, &text, cli.shell_exit())?;
            Ok(Exit::HelpShown)
        }
        Err(err) => {
            debug!(error = %err, "target arguments rejected");
            write_error_script(streams.stdout, &err.message, &err.usage, cli.shell_exit())?;
            Ok(Exit::Failure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseError;
    use crate::value::{ParsedArguments, Value};
    use std::cell::RefCell;
    use std::io::Cursor;

    const USAGE: &str = "Usage: prog [--count=<n>] <file>...";

    #[derive(Debug)]
    struct Captured {
        exit: Exit,
        stdout: String,
        stderr: String,
    }

    fn args(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    fn run_with(argv: &[&str], store: Option<&str>, stdin: &str) -> Result<Captured> {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut input = Cursor::new(stdin.as_bytes().to_vec());
        let exit = {
            let mut streams = Streams {
                stdout: &mut stdout,
                stderr: &mut stderr,
                stdin: &mut input,
            };
            run(&args(argv), store, &mut streams, |_| {})?
        };
        Ok(Captured {
            exit,
            stdout: String::from_utf8(stdout).unwrap(),
            stderr: String::from_utf8(stderr).unwrap(),
        })
    }

    fn run_ok(argv: &[&str]) -> Captured {
        run_with(argv, None, "").unwrap()
    }

    /// Engine returning a fixed outcome and recording the request.
    struct FakeEngine {
        outcome: Result<ParseOutcome, ParseError>,
        seen: RefCell<Option<(String, Vec<String>, Option<String>, bool, bool)>>,
    }

    impl FakeEngine {
        fn new(outcome: Result<ParseOutcome, ParseError>) -> Self {
            Self {
                outcome,
                seen: RefCell::new(None),
            }
        }
    }

    impl UsageEngine for FakeEngine {
        fn parse(&self, request: &ParseRequest<'_>) -> Result<ParseOutcome, ParseError> {
            *self.seen.borrow_mut() = Some((
                request.usage.to_string(),
                request.argv.to_vec(),
                request.version.map(str::to_string),
                request.options_first,
                request.skip_help_flags,
            ));
            self.outcome.clone()
        }
    }

    fn execute_with(engine: &FakeEngine, argv: &[&str]) -> (Exit, String) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut input = Cursor::new(Vec::new());
        let mut streams = Streams {
            stdout: &mut stdout,
            stderr: &mut stderr,
            stdin: &mut input,
        };
        let invocation = match parse_self(&args(argv), &mut streams).unwrap() {
            SelfParse::Ready(invocation) => invocation,
            SelfParse::Done(exit) => panic!("Expected Ready, got {:?}", exit),
        };
        let exit = execute(&invocation, engine, None, &mut streams).unwrap();
        (exit, String::from_utf8(stdout).unwrap())
    }

    #[test]
    fn test_split_at_colon() {
        let (own, target) = split_at_colon(&args(&["-h", "msg", ":", "a", ":", "b"]));
        assert_eq!(own, args(&["-h", "msg"]));
        assert_eq!(target, Some(args(&["a", ":", "b"])));
    }

    #[test]
    fn test_split_without_colon() {
        let (own, target) = split_at_colon(&args(&["parse", "msg"]));
        assert_eq!(own, args(&["parse", "msg"]));
        assert_eq!(target, None);
    }

    #[test]
    fn test_split_colon_before_double_dash() {
        let (own, target) = split_at_colon(&args(&["-h", "msg", ":", "--", ":"]));
        assert_eq!(own, args(&["-h", "msg"]));
        assert_eq!(target, Some(args(&["--", ":"])));
    }

    #[test]
    fn test_split_colon_at_end() {
        let (_, target) = split_at_colon(&args(&["-h", "msg", ":"]));
        assert_eq!(target, Some(vec![]));
    }

    #[test]
    fn test_split_ignores_colon_after_double_dash() {
        let (own, target) = split_at_colon(&args(&["parse", "msg", "--", "x", ":", "y"]));
        assert_eq!(own, args(&["parse", "msg", "--", "x", ":", "y"]));
        assert_eq!(target, None);
    }

    #[test]
    fn test_parse_action_keeps_colon_argument() {
        let captured = run_ok(&["parse", "Usage: prog <args>...", "--", "x", ":", "y"]);
        assert_eq!(captured.exit, Exit::Success);
        assert_eq!(captured.stdout, r#"{"<args>":["x",":","y"]}"#);
    }

    #[test]
    fn test_legacy_without_usage_is_shell_code() {
        let captured = run_ok(&["-A", "args", ":", "x"]);
        assert_eq!(captured.exit, Exit::Failure);
        assert!(captured.stdout.starts_with("echo 'error: no argument\n"));
        assert!(captured.stdout.ends_with("' >&2\nexit 64\n"));
        assert!(captured.stderr.is_empty());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Exit::Success.code(), 0);
        assert_eq!(Exit::Failure.code(), 1);
        assert_eq!(Exit::HelpShown.code(), 2);
    }

    #[test]
    fn test_legacy_globals() {
        let captured = run_ok(&["-h", USAGE, ":", "--count=3", "a", "b"]);
        assert_eq!(captured.exit, Exit::Success);
        assert_eq!(captured.stdout, "count='3'\nfile=('a' 'b')\n");
    }

    #[test]
    fn test_legacy_assoc() {
        let captured = run_ok(&["-A", "args", "-h", USAGE, ":", "a"]);
        assert_eq!(
            captured.stdout,
            "declare -A args\nargs['--count']=\nargs['<file>,0']='a'\nargs['<file>,#']=1\n"
        );
    }

    #[test]
    fn test_legacy_prefix() {
        let captured = run_ok(&["-G", "ARGS", "-h", USAGE, ":", "a"]);
        assert_eq!(captured.stdout, "ARGS_count=\nARGS_file=('a')\n");
    }

    #[test]
    fn test_parse_action_json() {
        let captured = run_ok(&["parse", USAGE, "--", "--count", "2", "x"]);
        assert_eq!(captured.exit, Exit::Success);
        assert_eq!(captured.stdout, r#"{"--count":"2","<file>":["x"]}"#);
    }

    #[test]
    fn test_target_error_is_shell_code() {
        let captured = run_ok(&["-h", USAGE, ":"]);
        assert_eq!(captured.exit, Exit::Failure);
        assert!(captured.stdout.starts_with("echo 'error: "));
        assert!(captured.stdout.contains("Usage: prog"));
        assert!(captured.stdout.ends_with("' >&2\nexit 64\n"));
        assert!(captured.stderr.is_empty());
    }

    #[test]
    fn test_target_error_return_in_function_mode() {
        let captured = run_ok(&["--function", "-h", USAGE, ":"]);
        assert!(captured.stdout.ends_with("return 64\n"));
    }

    #[test]
    fn test_target_help_is_shell_code() {
        let usage = "Usage: prog [--help]\n\nOptions:\n  --help  Show help.";
        let captured = run_ok(&["-h", usage, ":", "--help"]);
        assert_eq!(captured.exit, Exit::HelpShown);
        assert!(captured.stdout.starts_with("echo 'Usage: prog [--help]"));
        assert!(captured.stdout.ends_with("'\nexit 0\n"));
    }

    #[test]
    fn test_target_version_is_shell_code() {
        let usage = "Usage: prog [--version]";
        let captured = run_ok(&["-V", "prog 1.2", "-h", usage, ":", "--version"]);
        assert_eq!(captured.exit, Exit::HelpShown);
        assert_eq!(captured.stdout, "echo 'prog 1.2'\nexit 0\n");
    }

    #[test]
    fn test_usage_and_version_from_stdin() {
        let stdin = "Usage: prog <x>\n       prog --version\n----\nprog 9.9\n";
        let captured = run_with(&["-h", "-", "-V", "-", ":", "--version"], None, stdin).unwrap();
        assert_eq!(captured.stdout, "echo 'prog 9.9'\nexit 0\n");
    }

    #[test]
    fn test_stdin_split_failure() {
        let err = run_with(&["-h", "-", "-V", "-", ":", "x"], None, "Usage: prog <x>").unwrap_err();
        assert!(format!("{:#}", err).contains("got 1"));
    }

    #[test]
    fn test_own_help() {
        let captured = run_ok(&["-h"]);
        assert_eq!(captured.exit, Exit::Success);
        assert!(captured.stdout.contains("docopts"));
        assert!(captured.stdout.contains("--separator"));
    }

    #[test]
    fn test_own_version() {
        let captured = run_ok(&["--version"]);
        assert_eq!(captured.exit, Exit::Success);
        assert!(captured.stdout.starts_with("docopts "));
    }

    #[test]
    fn test_no_arguments_is_shell_code() {
        let captured = run_ok(&[]);
        assert_eq!(captured.exit, Exit::Failure);
        assert!(captured.stdout.starts_with("echo 'error: no argument\n"));
        assert!(captured.stdout.ends_with("exit 64\n"));
    }

    #[test]
    fn test_missing_required_self_argument_is_shell_code() {
        let captured = run_ok(&["parse"]);
        assert_eq!(captured.exit, Exit::Failure);
        assert!(captured.stdout.starts_with("echo 'error: no argument\n"));
    }

    #[test]
    fn test_unknown_self_option_reports_on_stderr() {
        let captured = run_ok(&["--bogus", "-h", USAGE, ":"]);
        assert_eq!(captured.exit, Exit::Failure);
        assert!(captured.stdout.is_empty());
        assert!(captured.stderr.contains("--bogus"));
    }

    #[test]
    fn test_missing_colon() {
        let err = run_with(&["-h", USAGE], None, "").unwrap_err();
        assert!(err.to_string().contains("missing ':'"));
    }

    #[test]
    fn test_invalid_assoc_name() {
        let err = run_with(&["-A", "0bad", "-h", USAGE, ":", "a"], None, "").unwrap_err();
        assert!(err.to_string().contains("not a valid Bash identifier"));
    }

    #[test]
    fn test_mangle_failure_aborts_render() {
        let usage = "Usage: prog [-9]\n\nOptions:\n  -9  Nine.";
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut input = Cursor::new(Vec::new());
        let mut streams = Streams {
            stdout: &mut stdout,
            stderr: &mut stderr,
            stdin: &mut input,
        };
        let err = run(&args(&["-h", usage, ":"]), None, &mut streams, |_| {}).unwrap_err();
        assert!(format!("{:#}", err).contains("'-9' => '9'"));
        assert!(stdout.is_empty());
    }

    #[test]
    fn test_on_ready_sees_invocation() {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut input = Cursor::new(Vec::new());
        let mut streams = Streams {
            stdout: &mut stdout,
            stderr: &mut stderr,
            stdin: &mut input,
        };
        let mut debug = false;
        run(
            &args(&["--debug", "-h", USAGE, ":", "a"]),
            None,
            &mut streams,
            |invocation| debug = invocation.cli.debug,
        )
        .unwrap();
        assert!(debug);
    }

    #[test]
    fn test_get_shortcut() {
        let store = r#"{"--count":"3","<file>":["a","b"]}"#;
        let captured = run_with(&["get", "--count"], Some(store), "").unwrap();
        assert_eq!(captured.stdout, "'3'\n");
        let captured = run_with(&["get", "--", "<file>"], Some(store), "").unwrap();
        assert_eq!(captured.stdout, "a\nb\n");
    }

    #[test]
    fn test_get_shortcut_missing_store() {
        let err = run_with(&["get", "X"], None, "").unwrap_err();
        assert!(format!("{:#}", err).contains("DOCOPTS_JSON is not set"));
        let err = run_with(&["get", "X"], Some(""), "").unwrap_err();
        assert!(format!("{:#}", err).contains("DOCOPTS_JSON is empty"));
    }

    #[test]
    fn test_get_shortcut_missing_key() {
        let err = run_with(&["get", "X"], Some(r#"{"Y":1}"#), "").unwrap_err();
        assert!(format!("{:#}", err).contains("key 'X' not found"));
    }

    #[test]
    fn test_get_shortcut_without_key() {
        assert!(run_with(&["get"], Some("{}"), "").is_err());
    }

    #[test]
    fn test_get_action_after_options() {
        let captured = run_with(&["--debug", "get", "--", "-v"], Some(r#"{"-v":2}"#), "").unwrap();
        assert_eq!(captured.stdout, "2\n");
    }

    #[test]
    fn test_get_keys() {
        let captured = run_with(&["get-keys"], Some(r#"{"b":1,"a":2}"#), "").unwrap();
        assert_eq!(captured.stdout, "a b\n");
    }

    #[test]
    fn test_dump_json() {
        let captured = run_with(&["dump", "json"], Some(r#"{"a":true}"#), "").unwrap();
        assert_eq!(captured.stdout, "{\n  \"a\": true\n}");
    }

    #[test]
    fn test_dump_ini_not_supported() {
        let err = run_with(&["dump", "ini"], Some(r#"{"a":true}"#), "").unwrap_err();
        assert!(format!("{:#}", err).contains("not supported yet"));
    }

    #[test]
    fn test_merge_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"--out":"x.txt","--count":"9"}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let captured = run_with(
            &["merge", "json", &path],
            Some(r#"{"--count":"3","--out":null}"#),
            "",
        )
        .unwrap();
        assert_eq!(captured.stdout, r#"{"--count":"3","--out":"x.txt"}"#);
    }

    #[test]
    fn test_merge_ini_not_supported() {
        let err = run_with(&["merge", "ini", "conf.ini"], Some("{}"), "").unwrap_err();
        assert!(format!("{:#}", err).contains("not supported yet"));
    }

    #[test]
    fn test_merge_missing_file() {
        let err = run_with(&["merge", "json", "/nonexistent/docopts.json"], Some("{}"), "")
            .unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/docopts.json"));
    }

    #[test]
    fn test_fail_action() {
        let captured = run_with(
            &["-h", "Usage: prog <x>", "fail", "bad input"],
            Some("{}"),
            "",
        )
        .unwrap();
        assert_eq!(captured.exit, Exit::Failure);
        assert_eq!(
            captured.stdout,
            "echo 'error: bad input\nUsage: prog <x>' >&2\nexit 64\n"
        );
    }

    #[test]
    fn test_fail_requires_store() {
        assert!(run_with(&["fail"], None, "").is_err());
    }

    #[test]
    fn test_auto_parse() {
        let mut script = tempfile::NamedTempFile::new().unwrap();
        write!(
            script,
            "#!/bin/bash\n# Usage: prog [-v] <name>\n#\n# Options:\n#   -v  Verbose.\n\necho\n"
        )
        .unwrap();
        let path = script.path().to_str().unwrap().to_string();
        let captured = run_ok(&["auto-parse", &path, "--", "-v", "bob"]);
        assert_eq!(captured.stdout, r#"{"-v":true,"<name>":"bob"}"#);

        let captured = run_ok(&["auto-parse", "-G", "P", &path, "--", "bob"]);
        assert_eq!(captured.stdout, "P_v=false\nP_name='bob'\n");
    }

    #[test]
    fn test_execute_passes_flags_to_engine() {
        let mut parsed = ParsedArguments::new();
        parsed.insert("<x>".into(), Value::String("1".into()));
        let engine = FakeEngine::new(Ok(ParseOutcome::Success(parsed)));
        let (exit, stdout) = execute_with(
            &engine,
            &["-O", "-H", "-V", "v1", "-h", "  Usage: prog <x>  ", ":", "1"],
        );
        assert_eq!(exit, Exit::Success);
        assert_eq!(stdout, "x='1'\n");
        let seen = engine.seen.borrow().clone().unwrap();
        assert_eq!(seen.0, "Usage: prog <x>");
        assert_eq!(seen.1, args(&["1"]));
        assert_eq!(seen.2.as_deref(), Some("v1"));
        assert!(seen.3, "options_first");
        assert!(seen.4, "skip_help_flags");
    }

    #[test]
    fn test_execute_error_outcome() {
        let engine = FakeEngine::new(Err(ParseError {
            message: "it's wrong".into(),
            usage: "Usage: prog".into(),
        }));
        let (exit, stdout) = execute_with(&engine, &["-h", "Usage: prog", ":"]);
        assert_eq!(exit, Exit::Failure);
        assert_eq!(
            stdout,
            "echo 'error: it'\\''s wrong\nUsage: prog' >&2\nexit 64\n"
        );
    }

    #[test]
    fn test_execute_help_outcome() {
        let engine = FakeEngine::new(Ok(ParseOutcome::Help("Usage: prog".into())));
        let (exit, stdout) = execute_with(&engine, &["--function", "-h", "Usage: prog", ":"]);
        assert_eq!(exit, Exit::HelpShown);
        assert_eq!(stdout, "echo 'Usage: prog'\nreturn 0\n");
    }
}
