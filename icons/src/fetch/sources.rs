//! Per-source fetch routines.
//!
//! Each routine downloads a TTF plus whatever metadata the project
//! publishes (JSON manifests or the icon CSS) and extracts the
//! icon-name → codepoint map from it. npm-hosted assets are fetched
//! file-by-file through the unpkg CDN.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use icons_font::Font;
use log::warn;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{FetchError, FetchResult, FontData};

/// Every configured source, in catalog order.
pub const SOURCE_NAMES: &[&str] = &[
    "material", "fluent", "phosphor", "remix", "codicon", "tabler", "awesome", "weather",
    "typicons",
];

/// Fetches one source by name.
pub async fn fetch(client: &Client, source: &str) -> FetchResult<FontData> {
    match source {
        "material" => fetch_material(client).await,
        "fluent" => fetch_fluent(client).await,
        "phosphor" => fetch_phosphor(client).await,
        "remix" => fetch_remix(client).await,
        "codicon" => fetch_codicon(client).await,
        "tabler" => fetch_tabler(client).await,
        "awesome" => fetch_awesome(client).await,
        "weather" => fetch_weather(client).await,
        "typicons" => fetch_typicons(client).await,
        other => Err(FetchError::UnknownSource(other.to_string())),
    }
}

async fn get_bytes(client: &Client, url: &str) -> FetchResult<Vec<u8>> {
    Ok(client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?
        .to_vec())
}

async fn get_text(client: &Client, url: &str) -> FetchResult<String> {
    Ok(client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?)
}

async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> FetchResult<T> {
    Ok(client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?)
}

/// Latest published npm package file, served by the unpkg CDN.
fn npm_url(package: &str, file: &str) -> String {
    format!("https://unpkg.com/{package}/{file}")
}

fn parse_hex(source: &'static str, value: &str) -> FetchResult<u32> {
    u32::from_str_radix(value, 16)
        .map_err(|_| FetchError::Metadata(source, format!("bad codepoint {value:?}")))
}

/// Extracts `(name, codepoint)` pairs from icon CSS rules.
fn css_codepoints(source: &'static str, css: &str, rule: &Regex) -> FetchResult<BTreeMap<String, u32>> {
    let mut names = BTreeMap::new();
    for caps in rule.captures_iter(css) {
        let codepoint = parse_hex(source, &caps[caps.len() - 1])?;
        names.insert(caps[1].to_string(), codepoint);
    }
    Ok(names)
}

async fn fetch_material(client: &Client) -> FetchResult<FontData> {
    #[derive(Deserialize)]
    struct Meta {
        name: String,
        codepoint: String,
    }

    let meta: Vec<Meta> = get_json(
        client,
        "https://raw.githubusercontent.com/Templarian/MaterialDesign/master/meta.json",
    )
    .await?;
    let font = get_bytes(
        client,
        "https://github.com/Templarian/MaterialDesign-Webfont/raw/master/fonts/materialdesignicons-webfont.ttf",
    )
    .await?;

    let mut names = BTreeMap::new();
    for icon in meta {
        names.insert(icon.name, parse_hex("material", &icon.codepoint)?);
    }
    FontData::new("material", names, font)
}

async fn fetch_fluent(client: &Client) -> FetchResult<FontData> {
    static RE_NAME: LazyLock<Regex> =
        LazyLock::new(|| Regex::new("^ic_fluent_(.+)_20_(filled|regular)$").expect("valid regex"));

    let meta: BTreeMap<String, u32> = get_json(
        client,
        "https://github.com/microsoft/fluentui-system-icons/raw/main/fonts/FluentSystemIcons-Resizable.json",
    )
    .await?;
    let font = get_bytes(
        client,
        "https://github.com/microsoft/fluentui-system-icons/raw/main/fonts/FluentSystemIcons-Resizable.ttf",
    )
    .await?;

    let mut names = BTreeMap::new();
    for (name, codepoint) in meta {
        let Some(caps) = RE_NAME.captures(&name) else {
            warn!("[fluent] unmatched: {name}");
            continue;
        };
        let mut icon = caps[1].replace('_', "-");
        if &caps[2] != "regular" {
            icon = format!("{icon}-{}", &caps[2]);
        }
        names.insert(icon, codepoint);
    }
    FontData::new("fluent", names, font)
}

async fn fetch_phosphor(client: &Client) -> FetchResult<FontData> {
    static RE_RULE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(?m)^\.ph\.ph-([^:]*):.*\n\s+content:\s+"\\(.*)""#).expect("valid regex")
    });

    let css = get_text(
        client,
        "https://github.com/phosphor-icons/web/raw/master/src/regular/style.css",
    )
    .await?;
    let font = get_bytes(
        client,
        "https://github.com/phosphor-icons/web/raw/master/src/regular/Phosphor.ttf",
    )
    .await?;

    FontData::new("phosphor", css_codepoints("phosphor", &css, &RE_RULE)?, font)
}

async fn fetch_remix(client: &Client) -> FetchResult<FontData> {
    // .ri-arrow-left-right-fill:before { content: "\ea61"; }
    static RE_RULE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(?m)^\.ri-([^:]+)-(fill|line):.*\{\s+content:\s+"\\(.*)""#)
            .expect("valid regex")
    });

    let css = get_text(
        client,
        "https://github.com/Remix-Design/RemixIcon/raw/master/fonts/remixicon.css",
    )
    .await?;
    let font = get_bytes(
        client,
        "https://github.com/Remix-Design/RemixIcon/raw/master/fonts/remixicon.ttf",
    )
    .await?;

    let mut names = BTreeMap::new();
    for caps in RE_RULE.captures_iter(&css) {
        let mut icon = caps[1].to_string();
        if &caps[2] != "line" {
            icon = format!("{icon}-{}", &caps[2]);
        }
        names.insert(icon, parse_hex("remix", &caps[3])?);
    }
    FontData::new("remix", names, font)
}

async fn fetch_codicon(client: &Client) -> FetchResult<FontData> {
    // .codicon-gist-new:before { content: "\ea60" }
    static RE_RULE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(?m)^\.codicon-([^:]+):.*\{\s+content:\s+"\\(.*)""#).expect("valid regex")
    });

    let package = "@vscode/codicons";
    let css = get_text(client, &npm_url(package, "dist/codicon.css")).await?;
    let font = get_bytes(client, &npm_url(package, "dist/codicon.ttf")).await?;

    FontData::new("codicon", css_codepoints("codicon", &css, &RE_RULE)?, font)
}

/// Tabler ships no usable metadata next to the webfont; the names come
/// from the font's own `post` table instead.
async fn fetch_tabler(client: &Client) -> FetchResult<FontData> {
    let font_bytes = get_bytes(
        client,
        &npm_url("@tabler/icons-webfont", "dist/fonts/tabler-icons.ttf"),
    )
    .await?;

    let font = Font::parse(font_bytes.clone())?;
    let names = font.codepoint_by_name()?.clone();
    FontData::new("tabler", names, font_bytes)
}

async fn fetch_awesome(client: &Client) -> FetchResult<FontData> {
    // Single line like .fa-fill-drip:before{content:"\f576"}
    static RE_RULE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"\.fa-([^:{}.]+):before\{\s*content:\s*"\\([^"]+)"[^}]*\}"#)
            .expect("valid regex")
    });

    // Inspect https://fontawesome.com to refresh these URLs.
    let version = "6.5.1";
    let font = get_bytes(
        client,
        &format!("https://site-assets.fontawesome.com/releases/v{version}/webfonts/fa-regular-400.ttf"),
    )
    .await?;
    let css = get_text(
        client,
        &format!("https://site-assets.fontawesome.com/releases/v{version}/css/all.css"),
    )
    .await?;

    FontData::new("awesome", css_codepoints("awesome", &css, &RE_RULE)?, font)
}

async fn fetch_weather(client: &Client) -> FetchResult<FontData> {
    static RE_RULE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(?m)^\.wi-([^:]*):.*\n\s+content:\s+"\\(.*)""#).expect("valid regex")
    });

    let font = get_bytes(
        client,
        "https://github.com/erikflowers/weather-icons/raw/master/font/weathericons-regular-webfont.ttf",
    )
    .await?;
    let css = get_text(
        client,
        "https://github.com/erikflowers/weather-icons/raw/master/css/weather-icons.css",
    )
    .await?;

    FontData::new("weather", css_codepoints("weather", &css, &RE_RULE)?, font)
}

async fn fetch_typicons(client: &Client) -> FetchResult<FontData> {
    let names: BTreeMap<String, u32> = get_json(
        client,
        "https://raw.githubusercontent.com/stephenhutchings/typicons.font/master/src/font/typicons.json",
    )
    .await?;
    let font = get_bytes(
        client,
        "https://github.com/stephenhutchings/typicons.font/raw/master/src/font/typicons.ttf",
    )
    .await?;

    FontData::new("typicons", names, font)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phosphor_rule_extraction() {
        static RE_RULE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r#"(?m)^\.ph\.ph-([^:]*):.*\n\s+content:\s+"\\(.*)""#).unwrap()
        });
        let css = ".ph.ph-acorn:before {\n  content: \"\\e9e8\";\n}\n\
                   .ph.ph-airplane:before {\n  content: \"\\e002\";\n}\n";
        let names = css_codepoints("phosphor", css, &RE_RULE).unwrap();
        assert_eq!(names["acorn"], 0xE9E8);
        assert_eq!(names["airplane"], 0xE002);
    }

    #[test]
    fn awesome_rule_extraction() {
        static RE_RULE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r#"\.fa-([^:{}.]+):before\{\s*content:\s*"\\([^"]+)"[^}]*\}"#).unwrap()
        });
        let css = r#".fa-fill-drip:before{content:"\f576"}.fa-arrows-to-circle:before{content:"\e4bd"}"#;
        let names = css_codepoints("awesome", css, &RE_RULE).unwrap();
        assert_eq!(names["fill-drip"], 0xF576);
        assert_eq!(names["arrows-to-circle"], 0xE4BD);
    }

    #[test]
    fn bad_hex_codepoint_is_reported() {
        let err = parse_hex("material", "zz").unwrap_err();
        assert!(matches!(err, FetchError::Metadata("material", _)));
    }
}
