// SPDX-License-Identifier: MIT
//
// n-replay: feeds Vim key scripts to the n-modal engine.
//
// Two ways to run it:
//
//   n-replay [--config PATH] [--text FILE] KEYS...
//       load FILE (or an empty buffer), feed each KEYS argument in Vim
//       notation ("dw", "ihi<Esc>"), print the final snapshot as JSON
//
//   n-replay [--config PATH] --scenario FILE.toml
//       run every [[case]] in FILE, print one ok/FAIL line per case with
//       the mismatching fields, exit 1 if anything failed
//
// A scenario case:
//
//   [[case]]
//   name = "delete word"
//   text = "one two"
//   keys = "dw"
//   cursor = [0, 0]          # optional start position
//
//   [case.expect]            # every field optional
//   lines = ["two"]
//   cursor = [0, 0]
//   mode = "Normal"
//   status = ""
//
// Without --config, `n-replay.toml` in the working directory is used when
// present. Logging goes to stderr and is controlled by RUST_LOG
// (`RUST_LOG=engine.key=debug`).

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use n_modal::{Engine, EngineConfig, Position, Snapshot};

const DEFAULT_CONFIG: &str = "n-replay.toml";

// ─── Arguments ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    config: Option<PathBuf>,
    text: Option<PathBuf>,
    scenario: Option<PathBuf>,
    keys: Vec<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let slot = match arg.as_str() {
            "--config" => &mut parsed.config,
            "--text" => &mut parsed.text,
            "--scenario" => &mut parsed.scenario,
            "--" => {
                parsed.keys.extend(args.by_ref());
                break;
            }
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ => {
                parsed.keys.push(arg);
                continue;
            }
        };
        let value = args.next().with_context(|| format!("{arg} needs a value"))?;
        *slot = Some(PathBuf::from(value));
    }
    if parsed.scenario.is_some() && (parsed.text.is_some() || !parsed.keys.is_empty()) {
        bail!("--scenario takes no --text or keys");
    }
    Ok(parsed)
}

// ─── Configuration ──────────────────────────────────────────────────────────

/// An explicit path must exist; the default file is optional.
fn load_config(explicit: Option<&Path>) -> Result<EngineConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG);
            if !path.exists() {
                debug!(target: "replay", "no config file, using defaults");
                return Ok(EngineConfig::default());
            }
            path
        }
    };
    let text = fs::read_to_string(&path)
        .with_context(|| format!("reading config {}", path.display()))?;
    EngineConfig::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))
}

// ─── Scenarios ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(rename = "case", default)]
    cases: Vec<Case>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Case {
    name: String,
    #[serde(default)]
    text: String,
    keys: String,
    cursor: Option<[usize; 2]>,
    #[serde(default)]
    expect: Expect,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Expect {
    lines: Option<Vec<String>>,
    cursor: Option<[usize; 2]>,
    /// Variant name: `Normal`, `Insert`, `VisualLine`, ...
    mode: Option<String>,
    status: Option<String>,
}

/// One field that came out different.
#[derive(Debug, PartialEq, Eq)]
struct Mismatch {
    field: &'static str,
    expected: String,
    actual: String,
}

fn parse_scenario(text: &str) -> Result<Scenario> {
    Ok(toml::from_str(text)?)
}

fn run_keys(
    config: &EngineConfig,
    text: &str,
    start: Option<Position>,
    keys: &[String],
) -> Snapshot {
    let mut engine = Engine::with_config(config.clone());
    engine.load_file(text);
    if let Some(pos) = start {
        engine.set_cursor(pos);
    }
    for script in keys {
        engine.feed_keys(script);
    }
    for command in engine.take_host_commands() {
        info!(target: "replay", %command, "host command ignored");
    }
    engine.snapshot()
}

fn check(expect: &Expect, snap: &Snapshot) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();
    let mut compare = |field, expected: String, actual: String| {
        if expected != actual {
            mismatches.push(Mismatch {
                field,
                expected,
                actual,
            });
        }
    };
    if let Some(lines) = &expect.lines {
        compare("lines", format!("{lines:?}"), format!("{:?}", snap.lines));
    }
    if let Some([line, col]) = expect.cursor {
        compare(
            "cursor",
            format!("[{line}, {col}]"),
            format!("[{}, {}]", snap.cursor.line, snap.cursor.col),
        );
    }
    if let Some(mode) = &expect.mode {
        compare("mode", mode.clone(), format!("{:?}", snap.mode));
    }
    if let Some(status) = &expect.status {
        compare("status", format!("{status:?}"), format!("{:?}", snap.status));
    }
    mismatches
}

fn run_case(config: &EngineConfig, case: &Case) -> Vec<Mismatch> {
    let start = case.cursor.map(|[line, col]| Position::new(line, col));
    let snap = run_keys(config, &case.text, start, std::slice::from_ref(&case.keys));
    check(&case.expect, &snap)
}

/// Report lines for every case, and whether all of them passed.
fn run_scenario(config: &EngineConfig, scenario: &Scenario) -> (String, bool) {
    let mut out = String::new();
    let mut failed = 0;
    for case in &scenario.cases {
        let mismatches = run_case(config, case);
        if mismatches.is_empty() {
            let _ = writeln!(out, "ok   {}", case.name);
            continue;
        }
        failed += 1;
        let _ = writeln!(out, "FAIL {}", case.name);
        for m in &mismatches {
            let _ = writeln!(out, "     {}: expected {}, got {}", m.field, m.expected, m.actual);
        }
    }
    let total = scenario.cases.len();
    let _ = writeln!(out, "{} passed, {failed} failed", total - failed);
    (out, failed == 0)
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns false when a scenario case failed.
fn run(args: Args) -> Result<bool> {
    let config = load_config(args.config.as_deref())?;

    if let Some(path) = &args.scenario {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        let scenario =
            parse_scenario(&text).with_context(|| format!("parsing scenario {}", path.display()))?;
        info!(target: "replay", cases = scenario.cases.len(), "running scenario");
        let (report, passed) = run_scenario(&config, &scenario);
        print!("{report}");
        return Ok(passed);
    }

    let text = match &args.text {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => String::new(),
    };
    let snap = run_keys(&config, &text, None, &args.keys);
    println!("{}", serde_json::to_string_pretty(&snap)?);
    Ok(true)
}

fn main() {
    init_tracing();

    let result = parse_args(env::args().skip(1)).and_then(run);
    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("n-replay: {e:#}");
            process::exit(2);
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(ToString::to_string))
    }

    fn scenario(text: &str) -> Scenario {
        parse_scenario(text).expect("scenario parses")
    }

    // ── Arguments ─────────────────────────────────────────────────────────

    #[test]
    fn keys_and_flags() {
        let parsed = args(&["--text", "a.txt", "dw", "--config", "c.toml", "u"]).unwrap();
        assert_eq!(
            parsed,
            Args {
                config: Some(PathBuf::from("c.toml")),
                text: Some(PathBuf::from("a.txt")),
                scenario: None,
                keys: vec!["dw".to_string(), "u".to_string()],
            }
        );
    }

    #[test]
    fn double_dash_ends_flags() {
        let parsed = args(&["--", "--text"]).unwrap();
        assert_eq!(parsed.keys, vec!["--text".to_string()]);
        assert_eq!(parsed.text, None);
    }

    #[test]
    fn bad_arguments() {
        assert!(args(&["--text"]).is_err());
        assert!(args(&["--frob"]).is_err());
        assert!(args(&["--scenario", "s.toml", "dw"]).is_err());
    }

    // ── Running keys ──────────────────────────────────────────────────────

    #[test]
    fn keys_are_fed_in_order() {
        let config = EngineConfig::default();
        let keys = vec!["dw".to_string(), "ihi <Esc>".to_string()];
        let snap = run_keys(&config, "one two", None, &keys);
        assert_eq!(snap.lines, vec!["hi two"]);
        assert_eq!(snap.cursor, Position::new(0, 2));
    }

    #[test]
    fn start_cursor_is_applied() {
        let config = EngineConfig::default();
        let snap = run_keys(&config, "a\nb\nc", Some(Position::new(2, 0)), &["x".to_string()]);
        assert_eq!(snap.lines, vec!["a", "b", ""]);
    }

    #[test]
    fn config_reaches_the_engine() {
        let config =
            EngineConfig::from_toml("[options]\nshiftwidth = 2\nexpandtab = true").unwrap();
        let snap = run_keys(&config, "x", None, &[">>".to_string()]);
        assert_eq!(snap.lines, vec!["  x"]);
    }

    #[test]
    fn snapshot_serializes() {
        let snap = run_keys(&EngineConfig::default(), "ab", None, &["l".to_string()]);
        let json: serde_json::Value = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["lines"][0], "ab");
        assert_eq!(json["cursor"]["col"], 1);
        assert_eq!(json["mode"], "Normal");
    }

    // ── Scenarios ─────────────────────────────────────────────────────────

    #[test]
    fn passing_case() {
        let s = scenario(
            r#"
            [[case]]
            name = "delete word"
            text = "one two"
            keys = "dw"

            [case.expect]
            lines = ["two"]
            cursor = [0, 0]
            mode = "Normal"
            status = ""
            "#,
        );
        let (report, passed) = run_scenario(&EngineConfig::default(), &s);
        assert!(passed);
        assert_eq!(report, "ok   delete word\n1 passed, 0 failed\n");
    }

    #[test]
    fn failing_case_lists_fields() {
        let s = scenario(
            r#"
            [[case]]
            name = "insert"
            text = "x"
            keys = "i"
            cursor = [0, 0]

            [case.expect]
            lines = ["x"]
            mode = "Normal"
            status = "-- INSERT --"
            "#,
        );
        let mismatches = run_case(&EngineConfig::default(), &s.cases[0]);
        assert_eq!(
            mismatches,
            vec![Mismatch {
                field: "mode",
                expected: "Normal".to_string(),
                actual: "Insert".to_string(),
            }]
        );
        let (report, passed) = run_scenario(&EngineConfig::default(), &s);
        assert!(!passed);
        assert!(report.starts_with("FAIL insert\n     mode: expected Normal, got Insert\n"));
    }

    #[test]
    fn unknown_case_field_is_rejected() {
        assert!(parse_scenario("[[case]]\nname = \"a\"\nkeys = \"x\"\nlnes = []").is_err());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/n-replay.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("reading config"));
    }
}
