use anyhow::{Context, Result};
use jt13_import::{
    cli::{Cli, Commands},
    config::{ensure_db_dir, load_config},
    importer::{collect_source_files, run_batch, write_report},
    schema::{SchemaRegistry, ALL_TABLES},
    ui::{ConsoleUi, Phase, Ui},
    writer::{sqlite_path, Database, Dialect},
};
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let settings = load_config(cli.config.as_deref())?
        .unwrap_or_default()
        .resolve(cli.command.overrides())?;

    // Fatal for the whole run: without the anchor table nothing can import
    let registry = SchemaRegistry::discover(ALL_TABLES, &settings.table_prefix)
        .context("Failed to build schema registry")?;

    match cli.command {
        Commands::Import {
            input,
            reset,
            report,
            ..
        } => {
            let mut ui = ConsoleUi::new();

            ui.set_phase(Phase::Preparing);
            if Dialect::from_url(&settings.database) == Dialect::Sqlite {
                ensure_db_dir(Path::new(sqlite_path(&settings.database)))?;
            }
            let mut db = Database::open(&settings.database)
                .with_context(|| format!("Failed to open database {}", settings.database))?;
            db.create_tables(registry.tracked_tables())
                .context("Failed to create tables")?;
            ui.log(format!(
                "{} relations with prefix '{}' in {} ({})",
                registry.len(),
                registry.prefix(),
                settings.database,
                db.dialect()
            ));

            if reset {
                ui.set_phase(Phase::Resetting);
                let count = db
                    .reset(registry.tracked_tables())
                    .context("Failed to reset tables")?;
                ui.log(format!("Emptied {} tables", count));
            }

            let files = collect_source_files(&input, &settings.extension)
                .with_context(|| format!("Failed to read {:?}", input))?;
            if files.is_empty() {
                ui.log(format!("No .{} files found in {:?}", settings.extension, input));
                return Ok(());
            }

            let summary = run_batch(&mut db, &registry, &files, &mut ui);

            if let Some(path) = report {
                write_report(&path, &summary)
                    .with_context(|| format!("Failed to write report {:?}", path))?;
                ui.log(format!("Report written to {:?}", path));
            }
        }

        Commands::ListTables { .. } => {
            println!("Tables in catalog:\n");
            for table in ALL_TABLES {
                let relation = registry.relations().find(|r| r.name() == table.name);
                match relation {
                    Some(relation) => {
                        let ancestors: Vec<_> = relation.ancestor_fields().collect();
                        println!(
                            "  {:<24} {:<14} {}",
                            table.name,
                            format!("<{}>", relation.tag()),
                            ancestors.join(", ")
                        )
                    }
                    None if table.name == registry.anchor().name => {
                        println!("  {:<24} (source files)", table.name)
                    }
                    None => println!("  {:<24} -", table.name),
                }
            }
        }
    }

    Ok(())
}
