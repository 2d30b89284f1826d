mod cli;

use gdnpro::{
    config,
    convert::{self, ConversionJob, ConversionWorker, OutcomeReceiver, ProgressReceiver},
    qr::{self, QrEntry},
    rename::{self, Renamer},
    settings::SettingsStore,
};
use gdnpro_common::paths::is_pdf_file;
use gdnpro_db::models::Pattern;
use gdnpro_magick::{SystemRunner, Toolchain};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, GifArgs, PatternAction, QrAction, QrArgs, RenameArgs, SettingsAction};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "gdnpro=debug,gdnpro_magick=debug,gdnpro_db=debug,gdnpro_common=debug".to_string()
        } else {
            "gdnpro=info,gdnpro_magick=info,gdnpro_db=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    let database = cli.database.as_deref();

    match cli.command {
        Commands::Gif(args) => convert_gifs(args, config_path, database),
        Commands::Rename(args) => rename_files(args, config_path, database),
        Commands::Patterns { action } => manage_patterns(action, config_path, database),
        Commands::Qr { action } => match action {
            QrAction::Generate(args) => generate_qr(args, config_path, database),
            QrAction::Template { file } => {
                qr::write_template(&file)?;
                println!("Template written to {}", file.display());
                Ok(())
            }
            QrAction::Export {
                input,
                name,
                url,
                file,
            } => export_qr_entries(input.as_deref(), name.zip(url), &file),
        },
        Commands::Settings { action } => manage_settings(action, config_path, database),
        Commands::CheckTools => check_tools(config_path),
        Commands::Validate {
            config: validate_path,
        } => validate_config(validate_path.as_deref().or(config_path)),
        Commands::InitConfig { path } => {
            config::persist::save_config(&path, &config::Config::default())?;
            println!("Wrote default config to {}", path.display());
            Ok(())
        }
        Commands::Version => {
            println!("gdnpro {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn open_store(config: &config::Config, database: Option<&Path>) -> Result<SettingsStore> {
    let path = database.unwrap_or(config.database.path.as_path());
    SettingsStore::open(path)
}

/// PDFs named directly, plus PDFs directly inside named directories.
fn pdf_sources(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut sources = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .max_depth(1)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file() && is_pdf_file(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            found.sort();
            if found.is_empty() {
                tracing::warn!("No PDFs in {:?}", input);
            }
            sources.extend(found);
        } else if !input.exists() {
            tracing::warn!("Skipping missing input: {:?}", input);
        } else if !is_pdf_file(input) {
            tracing::warn!("Skipping non-PDF input: {:?}", input);
        } else {
            sources.push(input.clone());
        }
    }

    sources
}

fn convert_gifs(args: GifArgs, config_path: Option<&Path>, database: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let store = open_store(&config, database)?;

    let mut gif = store.gif_settings(&config.gif)?;
    if let Some(frame_control) = args.frame_control {
        gif.options.frame_control = frame_control;
    }
    if let Some(frames) = &args.frames {
        gif.options.frames = frames.parse().unwrap_or_else(|never| match never {});
    }
    if let Some(optimize) = args.optimize {
        gif.options.optimize = optimize;
    }
    if args.next_to_source {
        gif.output_dir = None;
    } else if let Some(dir) = args.output_dir {
        gif.output_dir = Some(dir);
    }
    store.save_gif_settings(&gif)?;

    let sources = pdf_sources(&args.inputs);
    if sources.is_empty() {
        anyhow::bail!("No PDF files to convert");
    }

    let toolchain = Toolchain::discover(
        config.tools.magick_path.as_deref(),
        config.tools.effective_bundle_dir().as_deref(),
    )
    .context("No ImageMagick rasterizer found (install ImageMagick or set tools.magick_path)")?;
    tracing::info!("Using rasterizer {:?}", toolchain.rasterizer());

    if let Some(dir) = &gif.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    }

    let job = ConversionJob::new(sources, gif.output_dir.clone(), gif.options.clone());
    let worker = ConversionWorker::new(toolchain, Arc::new(SystemRunner));
    let (observer, progress_rx, outcome_rx) = convert::channels();
    let handle = worker
        .spawn(job, observer)
        .context("Failed to start conversion worker")?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(report_conversion(progress_rx, outcome_rx));

    let summary = handle
        .join()
        .map_err(|_| anyhow::anyhow!("Conversion worker panicked"))?;

    println!(
        "\nConverted {} of {} document(s)",
        summary.converted.len(),
        summary.total
    );
    if !summary.all_succeeded() {
        anyhow::bail!("{} document(s) could not be converted", summary.skipped.len());
    }

    Ok(())
}

/// Print worker events until both channels close.
async fn report_conversion(mut progress_rx: ProgressReceiver, mut outcome_rx: OutcomeReceiver) {
    let mut progress_open = true;
    let mut outcome_open = true;

    while progress_open || outcome_open {
        tokio::select! {
            biased;

            outcome = outcome_rx.recv(), if outcome_open => match outcome {
                Some(Ok(result)) => {
                    println!("✓ {} - {}", result.destination.display(), result.size_description)
                }
                Some(Err(skipped)) => {
                    eprintln!("✗ {}: {}", skipped.source.display(), skipped.error)
                }
                None => outcome_open = false,
            },
            progress = progress_rx.recv(), if progress_open => match progress {
                Some(p) => println!("[{}/{}] {}", p.current, p.total, p.name),
                None => progress_open = false,
            },
        }
    }
}

fn rename_files(args: RenameArgs, config_path: Option<&Path>, database: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let store = open_store(&config, database)?;

    let mut options = store.rename_options()?;
    if let Some(replace) = args.replace {
        options.replace = replace;
    }
    if let Some(with) = args.with {
        options.with = with;
    }
    if let Some(illegal) = args.illegal {
        options.remove_illegal = illegal;
    }
    if let Some(case) = args.case {
        options.case = case;
    }
    if let Some(orientation) = args.orientation {
        options.orientation = orientation;
    }
    if let Some(position) = args.position {
        options.position = position;
    }
    store.save_rename_options(&options)?;

    let renamer = Renamer::new(options, &store.patterns()?)?;
    let files = rename::collect_files(&args.inputs);
    if files.is_empty() {
        anyhow::bail!("No files to rename");
    }

    let entries = rename::plan(&renamer, &files);
    for entry in &entries {
        println!("{}", entry);
    }

    if let Some(export) = &args.export {
        let written = rename::export_plan(&entries, export)?;
        println!("\nFile names exported to {}", written.display());
    }

    if args.apply {
        let report = rename::apply_plan(&entries);
        println!("\nRenamed {} file(s).", report.renamed);
        for (path, error) in &report.failed {
            eprintln!("✗ {}: {}", path.display(), error);
        }
        if !report.failed.is_empty() {
            anyhow::bail!("{} file(s) could not be renamed", report.failed.len());
        }
    }

    Ok(())
}

fn manage_patterns(action: PatternAction, config_path: Option<&Path>, database: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let store = open_store(&config, database)?;

    match action {
        PatternAction::List => {
            for (i, p) in store.patterns()?.iter().enumerate() {
                println!("{:>3}. {:?} -> {:?}", i, p.pattern, p.replacement);
            }
        }
        PatternAction::Add {
            pattern,
            replacement,
        } => {
            let patterns = store.add_pattern(Pattern::new(pattern, replacement))?;
            println!("Added pattern #{}", patterns.len() - 1);
        }
        PatternAction::Remove { index } => {
            let removed = store.remove_pattern(index)?;
            println!("Removed {:?} -> {:?}", removed.pattern, removed.replacement);
        }
        PatternAction::Reset => {
            store.reset_patterns()?;
            println!("Patterns reset to defaults");
        }
    }

    Ok(())
}

fn generate_qr(args: QrArgs, config_path: Option<&Path>, database: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let store = open_store(&config, database)?;

    let mut settings = store.qr_settings()?;
    let style = &mut settings.style;
    if let Some(format) = args.format {
        style.format = format;
    }
    if let Some(box_size) = args.box_size {
        style.box_size = box_size;
    }
    if let Some(border) = args.border {
        style.border = border;
    }
    if let Some(level) = args.error_correction {
        style.error_correction = level;
    }
    if let Some(fill) = &args.fill {
        style.fill = fill.parse().map_err(anyhow::Error::msg)?;
    }
    if let Some(background) = &args.background {
        style.background = background.parse().map_err(anyhow::Error::msg)?;
    }
    if let Some(transparent) = args.transparent {
        style.transparent = transparent;
    }
    if let Some(dir) = args.output_dir {
        settings.output_dir = Some(dir);
    }
    settings.style.validate()?;
    store.save_qr_settings(&settings)?;

    let entries = match (&args.input, args.name, args.url) {
        (Some(input), _, _) => qr::load_entries(input)?,
        (None, Some(name), Some(url)) => vec![QrEntry::new(name, url)],
        _ => anyhow::bail!("Give either --input or both --name and --url"),
    };

    let output_dir = settings
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let report = qr::generate_batch(&entries, &settings.style, &output_dir)?;

    for path in &report.generated {
        tracing::debug!("Generated {:?}", path);
    }
    println!("{}", report);
    if !report.errors.is_empty() {
        anyhow::bail!("{} QR code(s) failed", report.errors.len());
    }

    Ok(())
}

fn export_qr_entries(input: Option<&Path>, extra: Option<(String, String)>, file: &Path) -> Result<()> {
    let mut entries = match input {
        Some(path) => qr::load_entries(path)?,
        None => Vec::new(),
    };
    if let Some((name, url)) = extra {
        entries.push(QrEntry::new(name.trim(), url.trim()));
    }

    let written = qr::export_entries(&entries, file)?;
    println!("Exported {} entries to {}", entries.len(), written.display());
    Ok(())
}

fn manage_settings(action: SettingsAction, config_path: Option<&Path>, database: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let store = open_store(&config, database)?;

    match action {
        SettingsAction::List { prefix } => {
            for setting in store.list(prefix.as_deref().unwrap_or(""))? {
                println!("{} = {}", setting.key, setting.value);
            }
        }
        SettingsAction::Get { key } => match store.get(&key)? {
            Some(value) => println!("{}", value),
            None => anyhow::bail!("Setting not found: {}", key),
        },
        SettingsAction::Set { key, value } => {
            store.set(&key, &value)?;
        }
        SettingsAction::Unset { key } => {
            if !store.unset(&key)? {
                println!("{} was not set", key);
            }
        }
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tools = gdnpro_magick::check_tools();
    for tool in &tools {
        let status = if tool.available { "✓" } else { "✗" };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    match Toolchain::discover(
        config.tools.magick_path.as_deref(),
        config.tools.effective_bundle_dir().as_deref(),
    ) {
        Ok(toolchain) => {
            println!("Rasterizer: {}", toolchain.rasterizer().display());
            if let Some(bundle) = toolchain.bundle() {
                println!("Bundle: {}", bundle.display());
            }
        }
        Err(e) => {
            println!("No rasterizer available: {}", e);
            println!("Install ImageMagick to enable GIF conversion.");
        }
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match config::find_config(path) {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(&p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file found, using defaults");
            config::Config::default()
        }
    };

    let show = |p: Option<&Path>| {
        p.map(|p| p.display().to_string())
            .unwrap_or_else(|| "(auto)".to_string())
    };
    println!("  Rasterizer: {}", show(config.tools.magick_path.as_deref()));
    println!("  Bundle: {}", show(config.tools.bundle_dir.as_deref()));
    println!("  Database: {}", config.database.path.display());
    println!("  GIF frame control: {}", config.gif.frame_control);
    println!("  GIF frames: {}", config.gif.frames);
    println!("  GIF optimize: {}", config.gif.optimize);
    println!(
        "  GIF output dir: {}",
        config
            .gif
            .output_dir
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(next to source)".to_string())
    );

    Ok(())
}
