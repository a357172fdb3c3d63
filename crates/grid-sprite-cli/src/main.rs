use std::fs;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use grid_sprite_core::planner::GridPlanner;
use grid_sprite_core::{
    LayoutAxis, LayoutConfig, OpenErrorPolicy, OutputFormat, SpriteError, SpriteOutput,
    layer_name, pack_paths_with_progress, scan_folder, valid_paths,
};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "grid-sprite",
    about = "Pack a folder of images into a grid sprite sheet",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Composite a folder into a sprite sheet and print its coordinates
    Pack(PackArgs),
    /// Print the grid anchor of every valid file without decoding any image
    Plan(PackArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Input folder (only its direct children are considered)
    #[arg(env = "GRID_SPRITE_INPUT", help_heading = "Input/Output")]
    input: Option<PathBuf>,
    /// Output image path (PNG)
    #[arg(short, long, default_value = "sprite.png", help_heading = "Input/Output")]
    out: PathBuf,
    /// Write coordinates to this file instead of stdout
    #[arg(long, help_heading = "Input/Output")]
    metadata_out: Option<PathBuf>,
    /// YAML config file path (its keys override layout/export flags)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
    /// Never prompt for another folder when none of the files are usable
    #[arg(long, default_value_t = false, help_heading = "Input/Output")]
    no_prompt: bool,

    // Layout
    /// Primary axis: cols | rows
    #[arg(long, default_value = "cols", help_heading = "Layout")]
    layout: String,
    /// Cells along the primary axis before wrapping
    #[arg(long, default_value_t = 1, help_heading = "Layout")]
    limit: u32,
    /// Horizontal pitch between columns (px)
    #[arg(long, default_value_t = 100, help_heading = "Layout")]
    col_spacing: u32,
    /// Vertical pitch between rows (px)
    #[arg(long, default_value_t = 50, help_heading = "Layout")]
    row_spacing: u32,
    /// Working canvas width before trimming
    #[arg(long, default_value_t = 10_000, help_heading = "Layout")]
    canvas_width: u32,
    /// Working canvas height before trimming
    #[arg(long, default_value_t = 10_000, help_heading = "Layout")]
    canvas_height: u32,
    /// Undecodable files: abort | skip
    #[arg(long, default_value = "abort", help_heading = "Layout")]
    on_open_error: String,

    // Export
    /// Coordinate format: css | json
    #[arg(long, default_value = "css", help_heading = "Export")]
    format: String,
    /// Export sheet stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compose and print coordinates but do not write the image
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Plan(args) => run_plan(args),
    }
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let filters = Filters::new(&cli.include, &cli.exclude)?;
    let can_prompt = !cli.no_prompt && std::io::stdin().is_terminal();
    let mut dir = match &cli.input {
        Some(d) => d.clone(),
        None if can_prompt => match prompt_folder("Folder to pack:")? {
            Some(d) => d,
            None => return Ok(()),
        },
        None => anyhow::bail!(
            "no input folder given (pass it as an argument or set GRID_SPRITE_INPUT)"
        ),
    };

    let out = loop {
        let paths = gather_paths(&dir, &filters)?;
        let result = if paths.is_empty() {
            Err(SpriteError::NoValidImages { dir: dir.clone() })
        } else {
            info!(count = paths.len(), dir = %dir.display(), "valid images found");
            pack_with_progress(&paths, cfg.clone(), show_progress)
        };
        match result {
            Ok(out) => break out,
            Err(SpriteError::NoValidImages { .. }) if can_prompt => {
                let question = format!(
                    "No valid images in {}. Folder to try next (empty to quit):",
                    dir.display()
                );
                match prompt_folder(&question)? {
                    Some(next) => dir = next,
                    None => {
                        info!("no folder selected; nothing written");
                        return Ok(());
                    }
                }
            }
            Err(SpriteError::NoValidImages { .. }) => {
                return Err(SpriteError::NoValidImages { dir }.into());
            }
            Err(e) => return Err(e).with_context(|| format!("pack {}", dir.display())),
        }
    };

    if out.is_empty() {
        warn!(path = ?cli.out, "no visible content; sprite sheet not written");
    } else if !cli.dry_run {
        if let Some(parent) = cli.out.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
        out.save(&cli.out)
            .with_context(|| format!("write {}", cli.out.display()))?;
        info!(path = ?cli.out, "wrote sprite sheet");
    }

    write_lines(&out.lines(), cli.metadata_out.as_deref())?;

    let stats = out.stats();
    info!(
        layers = stats.num_layers,
        width = stats.width,
        height = stats.height,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        "stats"
    );
    if let Some(stats_path) = &cli.export_stats {
        if !cli.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&stats)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            eprintln!("{}", stats.summary());
        }
    }
    Ok(())
}

fn run_plan(cli: &PackArgs) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;
    let Some(dir) = &cli.input else {
        anyhow::bail!(
            "no input folder given (pass it as an argument or set GRID_SPRITE_INPUT)"
        );
    };
    let filters = Filters::new(&cli.include, &cli.exclude)?;
    let paths = gather_paths(dir, &filters)?;
    if paths.is_empty() {
        return Err(SpriteError::NoValidImages { dir: dir.clone() }.into());
    }
    let mut planner = GridPlanner::new(&cfg)?;
    let lines: Vec<String> = paths
        .iter()
        .map(|p| {
            let cell = planner.next_cell();
            let at = planner.coordinate_of(cell);
            format!(
                "{}\tcell=({},{})\tx={}\ty={}",
                layer_name(p),
                cell.primary,
                cell.secondary,
                at.x,
                at.y
            )
        })
        .collect();
    write_lines(&lines, cli.metadata_out.as_deref())
}

fn build_config(cli: &PackArgs) -> anyhow::Result<LayoutConfig> {
    let base = LayoutConfig {
        axis: cli.layout.parse::<LayoutAxis>()?,
        limit: cli.limit,
        col_spacing: cli.col_spacing,
        row_spacing: cli.row_spacing,
        output_format: cli.format.parse::<OutputFormat>()?,
        canvas_width: cli.canvas_width,
        canvas_height: cli.canvas_height,
        on_open_error: cli.on_open_error.parse::<OpenErrorPolicy>()?,
    };
    // Config file sets layout/export options en bloc
    let cfg = if let Some(path) = &cli.config {
        let file =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse {}", path.display()))?;
        y.into_layout_config(base)?
    } else {
        base
    };
    cfg.validate()?;
    Ok(cfg)
}

fn pack_with_progress(
    paths: &[PathBuf],
    cfg: LayoutConfig,
    progress: bool,
) -> Result<SpriteOutput, SpriteError> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} placing {pos}/{len} [{elapsed_precise}] {wide_msg}",
        ) {
            b.set_style(style);
        }
        Some(b)
    } else {
        None
    };
    let result = pack_paths_with_progress(paths, cfg, |p| {
        if let Some(b) = &bar {
            let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
            b.set_message(msg.to_string());
            b.inc(1);
        }
    });
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    result
}

/// Asks for a folder. `None` when the answer is empty or the prompt is cancelled.
fn prompt_folder(question: &str) -> anyhow::Result<Option<PathBuf>> {
    match inquire::Text::new(question).prompt() {
        Ok(answer) if answer.trim().is_empty() => Ok(None),
        Ok(answer) => Ok(Some(PathBuf::from(answer.trim()))),
        Err(
            inquire::InquireError::OperationCanceled | inquire::InquireError::OperationInterrupted,
        ) => Ok(None),
        Err(e) => Err(e).context("Failed to read folder"),
    }
}

fn write_lines(lines: &[String], dest: Option<&Path>) -> anyhow::Result<()> {
    match dest {
        Some(path) => {
            let mut text = lines.join("\n");
            text.push('\n');
            fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
            info!(?path, "coordinates written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            for line in lines {
                writeln!(stdout, "{line}").context("write stdout")?;
            }
        }
    }
    Ok(())
}

struct Filters {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl Filters {
    fn new(include: &[String], exclude: &[String]) -> anyhow::Result<Self> {
        Ok(Self {
            include: build_globset(include)?,
            exclude: build_globset(exclude)?,
        })
    }

    fn should_skip(&self, p: &Path) -> bool {
        let s = p.to_string_lossy().replace('\\', "/");
        if let Some(ex) = &self.exclude {
            if ex.is_match(&s) {
                return true;
            }
        }
        if let Some(inc) = &self.include {
            if !inc.is_match(&s) {
                return true;
            }
        }
        false
    }
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("bad glob {pat}"))?);
    }
    Ok(Some(b.build()?))
}

fn gather_paths(dir: &Path, filters: &Filters) -> anyhow::Result<Vec<PathBuf>> {
    let entries = scan_folder(dir).with_context(|| format!("read dir {}", dir.display()))?;
    Ok(valid_paths(&entries)
        .into_iter()
        .filter(|p| !filters.should_skip(p))
        .collect())
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    // stdout carries the coordinates
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct YamlConfig {
    layout: Option<String>,
    limit: Option<u32>,
    col_spacing: Option<u32>,
    row_spacing: Option<u32>,
    output_format: Option<String>,
    canvas_width: Option<u32>,
    canvas_height: Option<u32>,
    on_open_error: Option<String>,
}

impl YamlConfig {
    fn into_layout_config(self, mut cfg: LayoutConfig) -> anyhow::Result<LayoutConfig> {
        if let Some(v) = self.layout {
            cfg.axis = v.parse()?;
        }
        if let Some(v) = self.limit {
            cfg.limit = v;
        }
        if let Some(v) = self.col_spacing {
            cfg.col_spacing = v;
        }
        if let Some(v) = self.row_spacing {
            cfg.row_spacing = v;
        }
        if let Some(v) = self.output_format {
            cfg.output_format = v.parse()?;
        }
        if let Some(v) = self.canvas_width {
            cfg.canvas_width = v;
        }
        if let Some(v) = self.canvas_height {
            cfg.canvas_height = v;
        }
        if let Some(v) = self.on_open_error {
            cfg.on_open_error = v.parse()?;
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> PackArgs {
        let mut argv = vec!["grid-sprite", "pack", "icons"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Pack(a) => a,
            Commands::Plan(_) => unreachable!(),
        }
    }

    #[test]
    fn defaults_match_layout_config_defaults() {
        let cfg = build_config(&args(&[])).expect("config");
        assert_eq!(cfg, LayoutConfig::default());
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = build_config(&args(&["--limit", "0"])).unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    #[test]
    fn unknown_layout_is_rejected() {
        let err = build_config(&args(&["--layout", "diagonal"])).unwrap_err();
        assert!(err.to_string().contains("diagonal"));
    }

    #[test]
    fn yaml_overrides_flags() {
        let y: YamlConfig =
            serde_yaml::from_str("layout: rows\nlimit: 3\noutput_format: json\n").expect("yaml");
        let cfg = y
            .into_layout_config(LayoutConfig::default())
            .expect("merge");
        assert_eq!(cfg.axis, LayoutAxis::Rows);
        assert_eq!(cfg.limit, 3);
        assert_eq!(cfg.output_format, OutputFormat::Json);
        assert_eq!(cfg.col_spacing, 100);
    }

    #[test]
    fn exclude_glob_skips_matches() {
        let f = Filters::new(&[], &["**/skip_*".to_string()]).expect("globs");
        assert!(f.should_skip(Path::new("icons/skip_me.png")));
        assert!(!f.should_skip(Path::new("icons/keep.png")));
    }
}
