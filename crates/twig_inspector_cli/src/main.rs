//! Command-line front end for the template inspector.
//!
//! # Responsibility
//! - `scan`: parse a rendered page and list which templates produced which
//!   elements.
//! - `open`: resolve a marker link or template name to an editor URL.
//! - `annotate`: wrap an HTML fragment in a marker pair.
//!
//! # Invariants
//! - Results go to stdout; logs and rejection reasons go to stderr.

use clap::{Parser, Subcommand};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use twig_inspector_core::marker::{template_link, wrap_region, MarkerId};
use twig_inspector_core::{
    default_log_level, init_stderr_logging, open_template, parse_html, FileLinkFormatter,
    FilesystemLocator, GlyphPalette, InspectorConfig, NavigationRequest, ProvenanceStore,
};

#[derive(Debug, Parser)]
#[command(name = "twig-inspector", version, about = "Map rendered HTML back to Twig templates")]
struct Cli {
    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List tracked elements and their template provenance.
    Scan {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Print the editor URL for a marker link or template name.
    Open {
        target: String,
        /// Line used when `target` is a bare template name.
        #[arg(long, default_value_t = 1)]
        line: i64,
    },
    /// Wrap the fragment in `file` with a start/end marker pair.
    Annotate {
        name: String,
        template: String,
        line: u32,
        file: PathBuf,
        /// Block nesting depth, selects the glyph set.
        #[arg(long, default_value_t = 0)]
        depth: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    if let Err(err) = init_stderr_logging(level) {
        eprintln!("{err}");
        return ExitCode::from(2);
    }

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            log::error!("event=cli_failed module=cli status=error");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Scan { file, json } => scan(&file, json, &config),
        Command::Open { target, line } => open(&target, line, &config),
        Command::Annotate {
            name,
            template,
            line,
            file,
            depth,
        } => annotate(&name, &template, line, &file, depth),
    }
}

fn load_config(path: Option<&Path>) -> Result<InspectorConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(InspectorConfig::load(path)?),
        None => Ok(InspectorConfig::default()),
    }
}

fn scan(file: &Path, json: bool, config: &InspectorConfig) -> Result<ExitCode, Box<dyn Error>> {
    let html = fs::read_to_string(file)?;
    let document = parse_html(&html);
    let toolbar = document.first_element_by_class(&config.dom.toolbar_class);

    let mut store = ProvenanceStore::new();
    let summary = store.rebuild(&document, toolbar);

    if json {
        let elements: Vec<_> = store
            .iter()
            .map(|tracked| {
                serde_json::json!({
                    "index": tracked.index,
                    "tag": document.tag_name(tracked.element),
                    "id": document.attribute(tracked.element, "id"),
                    "provenance": tracked.provenance,
                })
            })
            .collect();
        let report = serde_json::json!({ "summary": summary, "elements": elements });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    for tracked in store.iter() {
        let tag = document.tag_name(tracked.element).unwrap_or("?");
        let id = document
            .attribute(tracked.element, "id")
            .map(|id| format!("#{id}"))
            .unwrap_or_default();
        println!("[{}] <{}{}>", tracked.index, tag.to_ascii_lowercase(), id);
        for entry in &tracked.provenance {
            println!("    {} -> {}", entry.template_name, entry.link);
        }
    }
    println!(
        "{} markers, {} unterminated, {} elements tracked",
        summary.markers, summary.unterminated, summary.tracked
    );
    Ok(ExitCode::SUCCESS)
}

fn open(target: &str, line: i64, config: &InspectorConfig) -> Result<ExitCode, Box<dyn Error>> {
    let navigation = &config.navigation;
    let request = if target.contains(navigation.route_prefix.as_str()) {
        NavigationRequest::from_link(target, &navigation.route_prefix)
    } else {
        Ok(NavigationRequest::new(target, line))
    };

    let locator = FilesystemLocator::from_config(navigation);
    let formatter = FileLinkFormatter::new(&navigation.file_link_format);
    match request.and_then(|request| open_template(&request, &locator, &formatter)) {
        Ok(url) => {
            println!("{url}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{} {err}", err.status());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn annotate(
    name: &str,
    template: &str,
    line: u32,
    file: &Path,
    depth: usize,
) -> Result<ExitCode, Box<dyn Error>> {
    let content = fs::read_to_string(file)?;
    let mut palette = GlyphPalette::new();
    for level in 1..=depth {
        palette.block_changed(level);
    }
    let link = template_link(template, line);
    println!(
        "{}",
        wrap_region(&palette, name, &link, &MarkerId::generate(), content.trim_end())
    );
    Ok(ExitCode::SUCCESS)
}
