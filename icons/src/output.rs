//! Rendering of resolved icons in the CLI output formats.

use std::fmt::{Display, Formatter};

use clap::ValueEnum;
use icons_store::Icon;
use serde_json::json;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Bare SVG path data, one line per icon.
    #[default]
    #[value(name = "svg-path")]
    SvgPath,
    /// A standalone 100×100 SVG document per icon.
    Svg,
    /// One JSON object keyed by icon name.
    Json,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::SvgPath => "svg-path",
            Self::Svg => "svg",
            Self::Json => "json",
        })
    }
}

/// Renders icons to a string in the requested format.
pub fn render_icons(format: OutputFormat, icons: &[Icon]) -> serde_json::Result<String> {
    let mut out = String::new();
    match format {
        OutputFormat::SvgPath => {
            for icon in icons {
                out.push_str(&icon.svg);
                out.push('\n');
            }
        }
        OutputFormat::Svg => {
            for icon in icons {
                out.push_str(&format!(
                    "<svg width=\"100\" height=\"100\" viewBox=\"0 0 100 100\"\n     xmlns=\"http://www.w3.org/2000/svg\">\n<path id=\"{}\" d=\"{}\"/>\n</svg>\n",
                    icon.name, icon.svg
                ));
            }
        }
        OutputFormat::Json => {
            let mut map = serde_json::Map::new();
            for icon in icons {
                map.insert(
                    icon.name.clone(),
                    json!({
                        "name": icon.name,
                        "font": icon.font.name,
                        "family": icon.font.family,
                        "codepoint": icon.codepoint,
                        "svg": icon.svg,
                    }),
                );
            }
            out.push_str(&serde_json::to_string_pretty(&serde_json::Value::Object(
                map,
            ))?);
            out.push('\n');
        }
    }
    Ok(out)
}
