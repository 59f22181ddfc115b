use anyhow::{Context as _, Result, bail};
use lifecycle::{Operation, OperationResponse, OperationState, ProviderState};
use std::path::Path;

use crate::Context;
use crate::config::ProviderConfig;
use crate::host::FileHost;
use crate::provider::{self, Dispatch};
use crate::resources::Client;
use crate::ui;

fn kind(name: &str) -> Result<Box<dyn Dispatch>> {
    provider::find(name)
        .with_context(|| format!("Unknown resource kind '{name}' (see `ablyform resources`)"))
}

/// Run one lifecycle operation against plan/state files
pub fn run(
    ctx: &Context,
    config: &ProviderConfig,
    operation: Operation,
    kind_name: &str,
    plan: Option<&Path>,
    state: &Path,
) -> Result<()> {
    let kind = kind(kind_name)?;
    let mut host = FileHost::open(plan, state)?;
    let provider_state: ProviderState<Client> = provider::configure(config);

    log::info!("{} {} ({})", operation, kind.name(), state.display());
    let response = match operation {
        Operation::Create => kind.create(&provider_state, &mut host),
        Operation::Read => kind.read(&provider_state, &mut host),
        Operation::Update => kind.update(&provider_state, &mut host),
        Operation::Delete => kind.delete(&provider_state, &mut host),
        Operation::Import => bail!("import takes an identifier, use `ablyform import`"),
    };

    report(ctx, kind.name(), &host, &response)
}

/// Adopt an existing resource into a state file
pub fn import(ctx: &Context, kind_name: &str, id: &str, state: &Path) -> Result<()> {
    let kind = kind(kind_name)?;
    let mut host = FileHost::open(None, state)?;

    let response = kind.import(id, &mut host);
    report(ctx, kind.name(), &host, &response)
}

/// Print diagnostics and the outcome; fail if any error was reported
fn report(ctx: &Context, name: &str, host: &FileHost, response: &OperationResponse) -> Result<()> {
    for diag in response.diagnostics.iter() {
        if diag.is_error() || !ctx.quiet {
            ui::diagnostic(diag);
        }
    }

    if response.has_error() {
        bail!("{} of {name} failed ({:?})", response.operation, response.state);
    }

    if !ctx.quiet {
        let path = host.state_path().display().to_string();
        match response.state {
            OperationState::NotFound => {
                ui::warn(&format!("{name} no longer exists, removed {path}"));
            }
            _ if response.operation == Operation::Delete => {
                ui::success(&format!("Deleted {name}, removed {path}"));
            }
            _ => {
                ui::success(&format!("Finished {} {name}", response.operation.verb()));
                ui::kv("state", &path);
            }
        }
    }

    Ok(())
}
