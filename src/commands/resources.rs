use anyhow::{Context as _, Result, bail};
use colored::Colorize;

use crate::Context;
use crate::provider;
use crate::ui;

/// List every resource kind with its import identifier format
pub fn list(ctx: &Context) -> Result<()> {
    if !ctx.quiet {
        ui::header("Resource Kinds");
    }

    for kind in provider::kinds() {
        let schema = kind.schema();
        println!(
            "  {}  {}",
            kind.name().bold(),
            format!("[import: {}]", kind.import_fields().join(",")).dimmed()
        );
        if ctx.verbose > 0 {
            ui::dim(&schema.markdown_description);
        }
    }

    Ok(())
}

/// Print the schema of one kind as JSON
pub fn schema(kind_name: &str) -> Result<()> {
    let Some(kind) = provider::find(kind_name) else {
        bail!("Unknown resource kind '{kind_name}' (see `ablyform resources`)");
    };

    let json = kind
        .schema()
        .to_json()
        .with_context(|| format!("Could not serialize the schema of {kind_name}"))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_of_known_kind() {
        assert!(schema("ably_namespace").is_ok());
    }

    #[test]
    fn test_schema_of_unknown_kind_fails() {
        let err = schema("ably_app").unwrap_err();
        assert!(err.to_string().contains("Unknown resource kind 'ably_app'"));
    }
}
