mod catalog;
mod config;
mod field;
mod inspector;
mod memory;
mod output;
mod phone;
mod provider;
mod value;
mod vcard_io;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use catalog::RenderContext;
use config::Config;
use field::Field;
use inspector::ContactInspector;
use memory::MemoryProvider;
use output::ConsoleSink;
use provider::{ContactHandle, PimProvider};
use value::FieldValue;

const LOG_ENV: &str = "PIMX_LOG";

#[derive(Parser, Debug)]
#[command(name = "pimx", about = "Inspect and edit contact fields through a PIM store")]
struct Cli {
    /// Configuration file (defaults to <config dir>/pimx/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every contact field with its value kind and attributes
    Fields,
    /// Print every contact of a vCard file
    Print(PrintArgs),
    /// Create, populate, modify and remove a contact step by step
    Demo(DemoArgs),
}

#[derive(Args, Debug)]
struct PrintArgs {
    #[arg(value_name = "FILE")]
    path: PathBuf,
}

#[derive(Args, Debug)]
struct DemoArgs {
    /// vCard file whose contacts are loaded before the new one is created
    #[arg(long, value_name = "FILE")]
    seed: Option<PathBuf>,

    /// Leave the new contact in the list at the end
    #[arg(long, default_value_t = false)]
    keep: bool,

    /// Field whose first value is removed after modification
    #[arg(long, value_name = "FIELD", default_value_t = Field::Note)]
    remove: Field,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            seed: None,
            keep: false,
            remove: Field::Note,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = config::load(cli.config.as_deref())?;
    if let Some(path) = &config.config_path {
        debug!(path = %path.display(), "loaded configuration");
    }

    match cli.command.unwrap_or(Command::Demo(DemoArgs::default())) {
        Command::Fields => handle_fields(),
        Command::Print(args) => handle_print(args, &config)?,
        Command::Demo(args) => handle_demo(args, &config)?,
    }

    Ok(())
}

fn handle_fields() {
    for field in Field::ALL {
        let spec = catalog::spec(field);
        let mut line = format!(
            "{:<18} {:<18} {:<10} {}",
            field.id(),
            spec.title,
            spec.kind.to_string(),
            if spec.singular { "single" } else { "multiple" }
        );
        if !spec.writable {
            line.push_str(" read-only");
        }
        if spec.has_attributes() {
            let names: Vec<&str> = spec.attributes.iter().map(|(_, name)| *name).collect();
            line.push_str(&format!(" [{}, custom]", names.join(", ")));
        }
        println!("{}", line.trim_end());
    }
}

fn handle_print(args: PrintArgs, config: &Config) -> Result<()> {
    let mut store = open_list(Some(&args.path))?;
    if store.is_empty() {
        println!("No contacts in {}", args.path.display());
        return Ok(());
    }
    print_contacts(&mut store, config);
    Ok(())
}

fn handle_demo(args: DemoArgs, config: &Config) -> Result<()> {
    let seed = args.seed.as_deref().or(config.seed.as_deref());
    let mut store = open_list(seed)?;
    let mut out = ConsoleSink;

    println!("Contact list holds {} contact(s)", store.len());
    print_contacts(&mut store, config);

    let handle = store.create_item(None)?;

    // Each step reports its own failures and the walkthrough carries on.
    {
        let mut inspector = ContactInspector::new(&mut store, handle)
            .with_render_context(render_context(config));
        println!("Created contact {}", inspector.handle());

        step("Empty contact");
        let _ = inspector.print_all(&mut out);

        step("Populated contact");
        let _ = inspector.populate_empty_fields(&mut out);
        let _ = inspector.print_all(&mut out);

        step("Modified address");
        let _ = inspector.modify_primary_address(
            &mut out,
            FieldValue::structured(["", "", "Strandvejen 1", "Skagen", "", "9990", "Denmark"]),
            &config.custom_address_label,
        );
        let _ = inspector.print_all(&mut out);

        step("Removed values");
        let _ = inspector.remove_field_value(&mut out, args.remove, 0);
        let _ = inspector.remove_field_value(&mut out, Field::Phone, 5);
        let _ = inspector.print_all(&mut out);
    }

    if args.keep {
        println!("Keeping contact {}", handle);
    } else {
        store.remove_item(handle)?;
        println!("Removed contact {}", handle);
    }
    println!("Contact list holds {} contact(s)", store.len());
    Ok(())
}

/// Build a contact list, seeded from `seed` when given.
fn open_list(seed: Option<&Path>) -> Result<MemoryProvider> {
    let mut store = MemoryProvider::new();
    if let Some(path) = seed {
        let contacts = vcard_io::load_file(path)?;
        let report = vcard_io::seed(&mut store, contacts);
        if report.skipped > 0 {
            warn!(
                skipped = report.skipped,
                path = %path.display(),
                "skipped values while loading vCard file"
            );
        }
    }
    Ok(store)
}

fn print_contacts(store: &mut MemoryProvider, config: &Config) {
    let mut out = ConsoleSink;
    let handles: Vec<ContactHandle> = store.items();
    for (position, handle) in handles.into_iter().enumerate() {
        println!("Contact #{} (handle {})", position + 1, handle);
        let _ = ContactInspector::new(&mut *store, handle)
            .with_render_context(render_context(config))
            .print_all(&mut out);
    }
}

fn render_context(config: &Config) -> RenderContext {
    RenderContext {
        phone_region: config.phone_region.clone(),
    }
}

fn step(title: &str) {
    println!();
    println!("== {} ==", title);
}
