//! `render` and `page` commands.

use anyhow::Result;
use std::io::{Write, stdout};

use super::RenderArgs;
use super::interaction::Interaction;
use crate::config::Config;
use crate::page::render_page;
use crate::tree::MemoryTree;

/// Run one interaction against the configured fixture and print the response.
pub fn render_update(args: &RenderArgs, config: &Config) -> Result<()> {
    let mut tree = MemoryTree::load(&config.serve.fixture)?;
    let interaction = Interaction {
        source: args.source.clone(),
        refresh: args.refresh.clone(),
        redirect: args.redirect.clone(),
        prepend: args.prepend.clone(),
        append: args.append.clone(),
    };
    let envelope = interaction.run(&mut tree)?;

    let mut out = stdout().lock();
    if args.pretty {
        writeln!(out, "{}", serde_json::to_string_pretty(&envelope)?)?;
        return Ok(());
    }

    let response = envelope.into_response(&config.response)?;
    for (name, value) in response.headers() {
        writeln!(out, "{name}: {value}")?;
    }
    writeln!(out)?;
    writeln!(out, "{}", response.body)?;
    Ok(())
}

/// Print the full page for the configured fixture.
pub fn print_page(config: &Config) -> Result<()> {
    let mut tree = MemoryTree::load(&config.serve.fixture)?;
    let html = render_page(&mut tree)?;
    stdout().lock().write_all(html.as_bytes())?;
    Ok(())
}
