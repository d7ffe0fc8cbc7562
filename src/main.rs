mod cli;
mod config;
mod error;
mod form;
mod logging;
mod media;
mod menu;
mod news_entry;
mod news_state;
mod news_store;
mod ui;

use clap::Parser;
use cli::{Cli, Commands};
use color_eyre::eyre::Result;
use config::EditorConfig;
use menu::Menu;
use news_state::NewsState;
use news_store::NewsStore;
use std::io::{stdin, stdout};
use ui::UI;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let command = cli.command.unwrap_or_default();
    // The form owns the terminal, so it only logs when given a file.
    logging::init(cli.log_file.as_deref(), command == Commands::Menu)?;

    let config = EditorConfig::from_cli(&cli)?;
    let (mut news_state, report) = NewsState::open(NewsStore::new(&config.news_file))?;

    match command {
        Commands::Form => {
            let mut ui = UI::new(&config)?;
            ui.run(&mut news_state, &report)?;
        }
        Commands::Menu => {
            if report.is_problem() {
                eprintln!("{}: {report}", config.news_file.display());
            } else {
                println!("{}: {report}", config.news_file.display());
            }
            let mut menu = Menu::new(stdin().lock(), stdout(), config.default_tag.clone());
            menu.run(&mut news_state)?;
        }
    }

    Ok(())
}
