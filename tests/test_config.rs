//! Loading `parley.toml` and the effect of each section on dispatch.

mod common;

use std::io::Write;

use common::{recording_command, send};
use parley::dispatch::{DispatchOutcome, Framework, Parameter, Signature, TypeTag};
use parley::types::{OptionalPolicy, ParleyConfig, QuotePair, UnterminatedQuote, CONFIG_FILENAME};

const FULL_CONFIG: &str = r#"
prefixes = ["?", "bot "]

[lexer]
quotes = [["'", "'"]]
unterminated_quote = "reject"

[parser]
flag_prefixes = ["-"]
separators = [":"]

[dispatch]
ignore_automated = false
optional_policy = "continue"

[diagnostics]
marker = "[!]"
"#;

fn write_config(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(CONFIG_FILENAME);
    let mut file = std::fs::File::create(&path).expect("should create config file");
    file.write_all(content.as_bytes())
        .expect("should write config file");
    path
}

#[test]
fn full_config_round_trips_through_disk() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = write_config(&dir, FULL_CONFIG);

    let config = ParleyConfig::load(&path).expect("should load config");
    assert_eq!(config.prefixes, vec!["?", "bot "]);
    assert_eq!(config.lexer.quotes, vec![QuotePair::new("'", "'")]);
    assert_eq!(config.lexer.unterminated_quote, UnterminatedQuote::Reject);
    assert_eq!(config.parser.flag_prefixes, vec!["-"]);
    assert!(!config.dispatch.ignore_automated);
    assert_eq!(config.dispatch.optional_policy, OptionalPolicy::Continue);
    assert_eq!(config.diagnostics.marker, "[!]");

    let rewritten = write_config(&dir, &config.to_toml().expect("should serialize"));
    assert_eq!(
        ParleyConfig::load(&rewritten).expect("should reload"),
        config
    );
}

#[test]
fn empty_file_gives_defaults() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = write_config(&dir, "");
    assert_eq!(
        ParleyConfig::load(&path).expect("should load"),
        ParleyConfig::default()
    );
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = write_config(&dir, "[parser]\nseparators = [\"\"]\n");
    let err = ParleyConfig::load(&path).expect_err("empty separator");
    assert!(err.to_string().contains("separators"), "{err}");
}

#[tokio::test]
async fn loaded_config_drives_dispatch() {
    let config = ParleyConfig::from_toml(FULL_CONFIG).expect("should parse");
    let mut fw = Framework::new(config);
    let (cmd, calls) = recording_command(
        "greet",
        Signature::new()
            .param(Parameter::new("times", TypeTag::NUMBER).optional())
            .param(Parameter::new("name", TypeTag::TEXT))
            .option("style"),
    );
    fw.register_command(cmd).expect("register greet");
    let dispatcher = fw.into_dispatcher();

    let (outcome, _) = send(&dispatcher, "?greet 'Mr Smith' -style:formal -v").await;
    assert_eq!(outcome, DispatchOutcome::Invoked);
    {
        let calls = calls.lock().expect("lock");
        assert!(calls[0].is_absent("times"));
        assert_eq!(calls[0].text("name"), Some("Mr Smith"));
    }

    let (_, replies) = send(&dispatcher, "bot greet 3").await;
    assert_eq!(replies, vec!["[!] Missing required argument `name` (`String`)"]);
}
