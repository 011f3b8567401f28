// Copyright The Grid Scaffold Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use grid_scaffold::config::Config;
use grid_scaffold::log;
use grid_scaffold::model::LayoutRegistry;
use itertools::Itertools;

/// Inspect and exercise a column grid layout.
#[derive(Parser)]
#[command(version, name = "grid_scaffold")]
struct Cli {
    /// Config file to use instead of ~/.grid-scaffold.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone)]
enum Command {
    /// Print the configured size set and root width.
    Sizes,
    /// Build a small layout step by step, printing the tree after each edit.
    Demo,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    log::init_logging();

    let config = Config::load(cli.config.as_deref())?;
    match cli.command {
        Command::Sizes => {
            println!("valid sizes: {}", config.grid.valid_sizes.sizes().iter().join(", "));
            println!("root width: {}", config.grid.width);
        }
        Command::Demo => demo(&config)?,
    }
    Ok(())
}

fn demo(config: &Config) -> anyhow::Result<()> {
    let mut reg = LayoutRegistry::<String>::from_config(config)?;
    let root = reg.root();

    let header = reg.create_leaf("header".to_owned())?;
    let body = reg.create_leaf("body".to_owned())?;
    reg.add_cell(root, header, None)?;
    reg.add_cell(root, body, None)?;
    println!("{}", reg.draw_tree(root));

    let group = reg
        .replace_with_columns(body, true)
        .context("splitting the body into columns")?;
    println!("{}", reg.draw_tree(root));

    let sidebar = reg.create_leaf("sidebar".to_owned())?;
    let min = reg.size_set().min_size();
    if reg.can_add_column(group, min) {
        let column = reg.create_column(min, &[sidebar])?;
        reg.add_group_column(group, column, None)?;
    } else {
        reg.add_cell(root, sidebar, None)?;
    }
    println!("{}", reg.draw_tree(root));

    reg.delete_cell(body)?;
    reg.collect_garbage();
    println!("{}", reg.draw_tree(root));

    reg.check_invariants(root).map_err(anyhow::Error::msg)?;
    Ok(())
}
