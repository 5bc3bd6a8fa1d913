#![cfg(feature = "cli")]
//! Integration tests for `ssdb completions`.

use clap::CommandFactory;
use db2::cli::app::Cli;

fn generate_completions(shell: clap_complete::Shell) -> String {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut cmd, "ssdb", &mut buf);
    String::from_utf8(buf).expect("completions should be valid UTF-8")
}

#[test]
fn bash_completions_contain_subcommands() {
    let output = generate_completions(clap_complete::Shell::Bash);
    assert!(output.contains("ssdb"));
    for sub in ["unpack", "pack", "info", "dump", "check", "completions"] {
        assert!(output.contains(sub), "missing {sub}");
    }
    assert!(output.contains("--fragment-len"));
}

#[test]
fn zsh_completions_are_valid() {
    let output = generate_completions(clap_complete::Shell::Zsh);
    assert!(!output.is_empty());
    assert!(output.contains("ssdb"));
}

#[test]
fn fish_completions_are_valid() {
    let output = generate_completions(clap_complete::Shell::Fish);
    assert!(!output.is_empty());
    assert!(output.contains("ssdb"));
}

#[test]
fn powershell_completions_are_valid() {
    let output = generate_completions(clap_complete::Shell::PowerShell);
    assert!(!output.is_empty());
    assert!(output.contains("ssdb"));
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}
