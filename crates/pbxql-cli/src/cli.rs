use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use pbxql::Dialect;

/// Compile PbxQL filters into SQL predicates.
#[derive(Debug, Parser)]
#[command(name = "pbxql", version)]
pub struct Cli {
    /// Schema file listing the entity's fields (.yaml, .yml or .json).
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Table prefix for every column. Overrides the schema file.
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Quoting dialect (ansi, postgres, sqlite, mysql). Overrides the schema file.
    #[arg(short, long)]
    pub dialect: Option<Dialect>,

    /// Let unterminated quotes and groups run to the end of the query.
    #[arg(long)]
    pub lenient: bool,

    /// Log more (-v debug, -vv trace). RUST_LOG wins when set.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the SQL predicate for a query.
    Compile { query: String },
    /// Print the non-blank tokens of a query with their offsets.
    Tokens { query: String },
    /// Print the parsed expression tree as JSON.
    Tree { query: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags() {
        let cli = Cli::try_parse_from([
            "pbxql", "-s", "f.yaml", "-p", "t", "-d", "mysql", "--lenient", "-vv", "compile",
            "a = 1",
        ])
        .unwrap();
        assert_eq!(cli.schema, PathBuf::from("f.yaml"));
        assert_eq!(cli.prefix.as_deref(), Some("t"));
        assert_eq!(cli.dialect, Some(Dialect::MySql));
        assert!(cli.lenient);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Compile { ref query } if query == "a = 1"));
    }

    #[test]
    fn schema_is_required() {
        assert!(Cli::try_parse_from(["pbxql", "compile", "a = 1"]).is_err());
    }

    #[test]
    fn rejects_unknown_dialect() {
        let args = ["pbxql", "-s", "f.yaml", "-d", "oracle", "tree", "x"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn verify_command() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
