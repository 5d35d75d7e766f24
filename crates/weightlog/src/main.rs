//! `weightlog` - CLI for the weight ledger
//!
//! Every command mounts an entry form over the configured `SQLite` store,
//! applies one user action, and prints what the form would display.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use weightlog::cli::{
    AddCommand, ClearCommand, Cli, Command, ConfigCommand, ImportCommand, ListCommand,
    NameCommand, StatusCommand,
};
use weightlog::controller::{cooldown_message, SubmitOutcome};
use weightlog::{init_logging, ledger, Config, EntryForm, SqliteStore, SystemClock};

type Form = EntryForm<SqliteStore, SystemClock>;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // Runs before the eager load so a broken config can still be checked.
    if let Some(path) = cli.validation_target() {
        return Ok(validate_config(path));
    }

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Add(add_cmd) => Ok(handle_add(&mut mount(&config)?, add_cmd)),
        Command::List(list_cmd) => handle_list(&mount(&config)?, &list_cmd),
        Command::Status(status_cmd) => handle_status(&mount(&config)?, &status_cmd),
        Command::Clear(clear_cmd) => Ok(handle_clear(&mut mount(&config)?, &clear_cmd)),
        Command::Name(name_cmd) => Ok(handle_name(&mut mount(&config)?, name_cmd)),
        Command::Export => {
            println!("{}", serde_json::to_string_pretty(mount(&config)?.entries())?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Import(import_cmd) => handle_import(&mut mount(&config)?, &import_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn mount(config: &Config) -> anyhow::Result<Form> {
    let path = config.database_path();
    let store = SqliteStore::open(&path)
        .with_context(|| format!("cannot open weight store at {}", path.display()))?;
    Ok(EntryForm::mount_with(store, SystemClock, config.form_settings()))
}

fn handle_clear(form: &mut Form, cmd: &ClearCommand) -> ExitCode {
    if !cmd.yes {
        println!("This will delete all {} recorded weights.", form.entries().len());
        println!("Use --yes to confirm.");
        return ExitCode::FAILURE;
    }
    let persisted = form.clear_all();
    print!("{}", form.render());
    if !persisted {
        eprintln!("The weight store could not be cleared; entries may reappear.");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn handle_name(form: &mut Form, cmd: NameCommand) -> ExitCode {
    if cmd.name.trim().is_empty() {
        println!("Name is blank; keeping \"{}\".", form.user_name_input());
        return ExitCode::FAILURE;
    }
    form.change_user_name_input(cmd.name);
    println!("Name set to \"{}\".", form.user_name_input());
    ExitCode::SUCCESS
}

fn handle_add(form: &mut Form, cmd: AddCommand) -> ExitCode {
    if let Some(name) = cmd.name {
        form.change_user_name_input(name);
    }
    form.change_weight_input(cmd.weight);

    let outcome = form.submit();
    print!("{}", form.render());

    match outcome {
        SubmitOutcome::Added { .. } => ExitCode::SUCCESS,
        SubmitOutcome::InvalidWeight | SubmitOutcome::Cooldown { .. } => ExitCode::FAILURE,
    }
}

fn handle_list(form: &Form, cmd: &ListCommand) -> anyhow::Result<ExitCode> {
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(form.entries())?);
    } else {
        print!("{}", form.render());
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_status(form: &Form, cmd: &StatusCommand) -> anyhow::Result<ExitCode> {
    let status = form.cooldown_status();
    let last_entry = form.entries().last().map(|entry| entry.date().to_rfc3339());

    if cmd.json {
        let json = serde_json::json!({
            "can_add": status.can_add,
            "hours_remaining": status.hours_remaining,
            "entries": form.entries().len(),
            "last_entry": last_entry,
            "cooldown_hours": form.settings().cooldown.num_hours(),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("weightlog status");
        println!("----------------");
        println!("Entries:       {}", form.entries().len());
        println!("Last entry:    {}", last_entry.as_deref().unwrap_or("none"));
        println!("Cooldown:      {} hours", form.settings().cooldown.num_hours());
        if status.can_add {
            println!("Next entry:    allowed now");
        } else {
            println!("Next entry:    {}", cooldown_message(status.hours_remaining));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_import(form: &mut Form, cmd: &ImportCommand) -> anyhow::Result<ExitCode> {
    let raw = std::fs::read_to_string(&cmd.file)
        .with_context(|| format!("cannot read {}", cmd.file.display()))?;
    let entries = ledger::parse_ledger(&raw)
        .with_context(|| format!("cannot import {}", cmd.file.display()))?;

    if !form.entries().is_empty() && !cmd.yes {
        println!(
            "This will replace {} recorded weights with {} from {}.",
            form.entries().len(),
            entries.len(),
            cmd.file.display()
        );
        println!("Use --yes to confirm.");
        return Ok(ExitCode::FAILURE);
    }

    let count = entries.len();
    if !form.replace_entries(entries) {
        anyhow::bail!("imported entries could not be saved");
    }
    println!("Imported {count} weights.");
    Ok(ExitCode::SUCCESS)
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Ledger]");
                println!("  Cooldown (hours):   {}", config.ledger.cooldown_hours);
                println!();
                println!("[Display]");
                println!("  Date format:        {}", config.display.date_format);
                println!("  Local time:         {}", config.display.use_local_time);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            return Ok(validate_config(
                file.unwrap_or_else(Config::default_config_path),
            ));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn validate_config(path: PathBuf) -> ExitCode {
    println!("Validating configuration: {}", path.display());
    match Config::load_from(Some(path)) {
        Ok(_) => {
            println!("Configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Configuration error: {e}");
            ExitCode::FAILURE
        }
    }
}
