use serde_json::json;

use crate::cli::{utils, OutputFormat};
use crate::database::schema;

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Text => {
            println!("{}", schema::script());
            Ok(())
        }
        OutputFormat::Json => utils::output_success(
            output_format,
            "Postgres schema",
            json!({ "tables": schema::TABLES, "statements": schema::STATEMENTS }),
            None,
        ),
    }
}
