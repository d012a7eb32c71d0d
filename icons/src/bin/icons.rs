use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Parser, Subcommand, ValueEnum};
use icons_font::{Font, SPECIMEN_COLUMNS, SPECIMEN_PADDING, SPECIMEN_SIZE};
use icons_store::manifest::FontEntry;
use icons_store::{Icon, IconStore};
use icons::fetch::{FontData, sources};
use icons::output::{OutputFormat, render_icons};
use icons::select::pick_names;
use log::{error, info};
use serde_json::json;

const DESC_FILE: &str = "descriptions.json";
const FONT_DIR: &str = "fonts";

/// Defines the styles used for the CLI help output.
const HELP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Blue.on_default().bold())
    .usage(AnsiColor::Blue.on_default().bold())
    .literal(AnsiColor::White.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(
    version,
    name = "icons",
    about = "Fetch icon fonts and retrieve icons as SVG paths",
    after_help = "Use RUST_LOG environment variable to control logging level, e.g. RUST_LOG=debug or RUST_LOG=icons=debug.",
    styles = HELP_STYLES
)]
struct Args {
    /// Directory holding descriptions.json and the fonts/ bundles
    #[arg(short, long, default_value = ".")]
    root: PathBuf,
    /// Catalog database path (defaults to ~/.cache/icons.sqlite)
    #[arg(long)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Fetch the configured fonts and rebuild the icon catalog
    #[command(name = "update")]
    Update {
        /// Update the database without fetching fonts
        #[arg(long)]
        db_only: bool,
    },
    /// Print icons by name
    #[command(name = "get")]
    Get {
        /// Format of the output
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
        /// Icon names, e.g. material-cat
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Choose icons through an external fuzzy picker
    #[command(name = "select")]
    Select {
        /// Format of the output
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
        /// Picker command; candidates go to its stdin, choices come back
        /// on its stdout
        #[arg(long, default_value = "sweep")]
        picker: String,
    },
    /// Inspect a font file directly, without the catalog
    #[command(name = "font")]
    Font {
        /// Font file to read
        file: PathBuf,
        /// Codepoints, decimal or 0x-prefixed hex; specimen/info is
        /// rendered when none are given
        codepoints: Vec<String>,
        /// Format of the output
        #[arg(short, long, value_enum, default_value_t)]
        format: FontFormat,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum FontFormat {
    /// Bare SVG path data
    Path,
    /// Glyph or font descriptor as JSON
    #[default]
    Json,
}

impl Display for FontFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Path => "path",
            Self::Json => "json",
        })
    }
}

#[tokio::main]
async fn main() {
    let env = env_logger::Env::default().default_filter_or("icons=info");
    env_logger::Builder::from_env(env)
        .format_indent(None)
        .format_module_path(false)
        .format_target(false)
        .format_timestamp(None)
        .init();

    if let Err(err) = main_int().await {
        error!("{err}");
        std::process::exit(1);
    }
}

async fn main_int() -> anyhow::Result<()> {
    let args = Args::parse();
    match args.command {
        Commands::Update { db_only } => {
            update(&args.root, args.db, db_only).await?;
        }
        Commands::Get { format, names } => {
            let mut store = IconStore::open(args.root.join(DESC_FILE), args.db).await?;
            let mut icons = Vec::new();
            for name in names {
                match store.get_icon(&name).await? {
                    Some(icon) => icons.push(icon),
                    None => eprintln!("Icon not found: {name}"),
                }
            }
            print!("{}", render_icons(format, &icons)?);
        }
        Commands::Select { format, picker } => {
            let mut store = IconStore::open(args.root.join(DESC_FILE), args.db).await?;
            let icons = store.get_icons().await?;
            let names: Vec<String> = icons.iter().map(|icon| icon.name.clone()).collect();
            let picked = pick_names(&picker, &names)?;
            // Keep the picker's selection order.
            let mut by_name: HashMap<String, Icon> = icons
                .into_iter()
                .map(|icon| (icon.name.clone(), icon))
                .collect();
            let selected: Vec<Icon> = picked
                .iter()
                .filter_map(|name| by_name.remove(name))
                .collect();
            print!("{}", render_icons(format, &selected)?);
        }
        Commands::Font {
            file,
            codepoints,
            format,
        } => {
            inspect_font(&file, &codepoints, format)?;
        }
    }
    Ok(())
}

async fn update(root: &Path, db: Option<PathBuf>, db_only: bool) -> anyhow::Result<()> {
    let descs_path = root.join(DESC_FILE);

    if !db_only {
        let fonts_dir = root.join(FONT_DIR);
        fs::create_dir_all(&fonts_dir)?;
        let client = reqwest::Client::new();

        let mut entries = Vec::new();
        for &source in sources::SOURCE_NAMES {
            let start = Instant::now();
            let data = sources::fetch(&client, source).await?;
            let previous = FontData::load(source, &fonts_dir)?;
            if previous.is_none_or(|prev| prev.content_hash() != data.content_hash()) {
                data.save(&fonts_dir)?;
            }
            info!(
                "[fetching] {source}: {} icons in {:.2}s",
                data.names.len(),
                start.elapsed().as_secs_f64()
            );
            entries.push(FontEntry {
                name: source.to_string(),
                family: data.family.clone(),
                metadata: format!("{FONT_DIR}/{source}.json"),
                font: format!("{FONT_DIR}/{source}.ttf"),
            });
        }
        fs::write(&descs_path, serde_json::to_vec_pretty(&entries)?)?;
    }

    let start = Instant::now();
    let mut store = IconStore::open(descs_path, db).await?;
    store.update().await?;
    info!(
        "[db] updated in {:.2}s, icons count: {}",
        start.elapsed().as_secs_f64(),
        store.icon_count().await?
    );
    Ok(())
}

fn inspect_font(file: &Path, codepoints: &[String], format: FontFormat) -> anyhow::Result<()> {
    let font = Font::parse(fs::read(file)?)?;

    if codepoints.is_empty() {
        match format {
            FontFormat::Path => {
                println!(
                    "{}",
                    font.specimen(SPECIMEN_SIZE, SPECIMEN_COLUMNS, SPECIMEN_PADDING)?
                );
            }
            FontFormat::Json => println!("{}", serde_json::to_string_pretty(&font.info()?)?),
        }
        return Ok(());
    }

    for value in codepoints {
        let codepoint = parse_codepoint(value)?;
        let Some(glyph) = font.glyph_by_codepoint(codepoint)? else {
            eprintln!("Font does not have codepoint: {codepoint}");
            continue;
        };
        match format {
            FontFormat::Path => println!("{}", glyph.to_svg_path(false, None)?),
            FontFormat::Json => {
                let glyph_id = glyph.glyph_id;
                let hmtx = font.hmtx()?;
                let glyph_json = json!({
                    "glyph_id": glyph_id,
                    "name": font.post()?.name(glyph_id),
                    "bearing": hmtx.side_bearing(glyph_id),
                    "advance": hmtx.advance(glyph_id),
                    "bbox": [
                        glyph.min_point.x,
                        glyph.min_point.y,
                        glyph.max_point.x,
                        glyph.max_point.y,
                    ],
                    "path": glyph.to_svg_path(false, None)?,
                });
                println!("{}", serde_json::to_string_pretty(&glyph_json)?);
            }
        }
    }
    Ok(())
}

fn parse_codepoint(value: &str) -> anyhow::Result<u32> {
    let codepoint = match value.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16)?,
        None => value.parse()?,
    };
    Ok(codepoint)
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn get_requires_a_name() {
        assert_eq!(
            Args::try_parse_from(["icons", "get"]).unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn get_parses_format_and_names() {
        let args = Args::parse_from(["icons", "get", "-f", "json", "material-cat"]);
        assert_eq!(
            args.command,
            Commands::Get {
                format: OutputFormat::Json,
                names: vec!["material-cat".to_string()],
            }
        );
    }

    #[test]
    fn unknown_format_is_a_usage_error() {
        assert_eq!(
            Args::try_parse_from(["icons", "get", "-f", "bogus", "material-cat"])
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidValue
        );
    }

    #[test]
    fn update_accepts_db_only() {
        let args = Args::parse_from(["icons", "update", "--db-only"]);
        assert_eq!(args.command, Commands::Update { db_only: true });
    }

    #[test]
    fn root_defaults_to_current_directory() {
        let args = Args::parse_from(["icons", "update"]);
        assert_eq!(args.root, PathBuf::from("."));
        assert_eq!(args.db, None);
    }

    #[test]
    fn codepoints_parse_decimal_and_hex() {
        assert_eq!(parse_codepoint("0xE001").unwrap(), 0xE001);
        assert_eq!(parse_codepoint("57345").unwrap(), 57345);
        assert!(parse_codepoint("bogus").is_err());
    }
}
