//! Command execution, kept apart from `main` so it can be tested.

use anyhow::{Context, Result};
use pbxql::{load_schema_file, Parser, SchemaFile, Tokenizer};
use tracing::debug;

use crate::cli::{Cli, Command};

/// Runs one command and returns what should be printed.
pub fn run(cli: &Cli) -> Result<String> {
    let schema = load(cli)?;
    let tokenizer = Tokenizer::new().lenient(schema.lenient);

    match &cli.command {
        Command::Compile { query } => {
            let sql = schema
                .filter()
                .compile_query(query)
                .with_context(|| format!("cannot compile {query:?}"))?;
            Ok(sql)
        }
        Command::Tokens { query } => {
            let tokens = tokenizer.tokenize(query)?;
            let lines: Vec<String> = tokens
                .iter()
                .filter(|token| !token.is_blank())
                .map(|token| format!("{}\t{:?}\t{}", token.offset, token.kind, token.text))
                .collect();
            Ok(lines.join("\n"))
        }
        Command::Tree { query } => {
            let nodes = Parser::with_tokenizer(tokenizer).parse_query(query)?;
            Ok(serde_json::to_string_pretty(&nodes)?)
        }
    }
}

/// Loads the schema file and applies command-line overrides.
fn load(cli: &Cli) -> Result<SchemaFile> {
    let mut schema = load_schema_file(&cli.schema)
        .with_context(|| format!("cannot load schema {}", cli.schema.display()))?;

    if let Some(prefix) = &cli.prefix {
        schema.prefix = Some(prefix.clone());
    }
    if let Some(dialect) = cli.dialect {
        schema.dialect = dialect;
    }
    schema.lenient |= cli.lenient;

    debug!(
        fields = schema.fields.len(),
        dialect = schema.dialect.as_str(),
        prefix = ?schema.prefix,
        lenient = schema.lenient,
        "schema loaded"
    );
    Ok(schema)
}
