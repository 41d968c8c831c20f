//! Library integration tests.

use stepgraph::StepGraphError;

#[test]
fn error_types_are_public() {
    let err = StepGraphError::UnknownTarget {
        target: "garden://wb/latest/pip".into(),
    };
    assert!(err.to_string().contains("garden://wb/latest/pip"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> stepgraph::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use stepgraph::cli::{Cli, Commands};

    let cli = Cli::parse_from(["stepgraph", "plan", "--json", "garden://wb/latest/pip"]);

    if let Commands::Plan(args) = cli.command {
        assert!(args.json);
        assert_eq!(args.selection.targets, vec!["garden://wb/latest/pip"]);
    } else {
        panic!("Expected Plan command");
    }
}
