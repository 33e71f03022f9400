//! Minimal CLI: JSON sample → Go struct declarations
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};

use json2struct::{OmitEmpty, Options, Value};

/// Shown instead of an error when the input document is empty.
const PLACEHOLDER_INPUT: &str = r#"{"sample":"paste the json here"}"#;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// infer Go struct declarations from JSON samples
#[derive(Parser, Debug)]
#[command(name = "json2struct", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// infer types, merging arrays of objects into one struct
    Convert(ConvertOut),
    /// legacy structural view: one struct per object, nothing merged
    Format(FormatOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is converted
    #[arg(long)]
    jq_expr: Option<String>,

    /// Input paths, quoted glob patterns, or '-' for stdin
    #[arg(long, short, num_args = 1.., default_value = "-")]
    input: Vec<String>,
}

#[derive(Args, Debug)]
struct ConvertOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// do not emit struct tags
    #[arg(long)]
    no_tag: bool,

    /// struct tag key
    #[arg(long, default_value = json2struct::config::DEFAULT_TAG_NAME)]
    tag_name: String,

    /// when to add ",omitempty" to tags
    #[arg(long, value_enum, default_value_t = OmitEmpty::None)]
    omitempty: OmitEmpty,

    /// output .go file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FormatOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .go file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

/// One document to convert and where it came from.
struct Document {
    source: String,
    value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        for source in resolve_inputs(&self.input)? {
            let text = read_source(&source)?;
            let text = if text.trim().is_empty() { PLACEHOLDER_INPUT } else { text.as_str() };
            // parse errors keep the library's "json unmarshal Error" wording
            let raw = serde_json::from_str::<serde_json::Value>(text)
                .map_err(json2struct::Error::Parse)
                .with_context(|| format!("failed to parse {source}"))?;
            docs.extend(self.select(&source, raw)?);
        }
        Ok(docs)
    }

    fn select(&self, source: &str, raw: serde_json::Value) -> Result<Vec<Document>> {
        let raw = match self.json_pointer.as_deref() {
            None => raw,
            Some(ptr) => raw
                .pointer(ptr)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer {ptr} matched nothing in {source}"))?,
        };
        let selected = match self.jq_expr.as_deref() {
            None => vec![raw],
            Some(expr) => crate::jq_exec::select(expr, &raw)
                .with_context(|| format!("failed to apply jq expression to {source}"))?,
        };
        let many = selected.len() > 1;
        Ok(selected
            .into_iter()
            .enumerate()
            .map(|(i, v)| Document {
                source: if many { format!("{source} [{i}]") } else { source.to_owned() },
                value: Value::from(v),
            })
            .collect())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Convert(target) => {
                let options = Options {
                    use_tag: !target.no_tag,
                    tag_name: target.tag_name.clone(),
                    omit_empty: target.omitempty,
                };
                tracing::debug!(?options, "convert");
                let docs = target.input_settings.load_documents()?;
                let out = render_all(&docs, |v| json2struct::convert_value(v, &options))?;
                write_output(target.out.as_ref(), &out)
            }
            Command::Format(target) => {
                let docs = target.input_settings.load_documents()?;
                let out = render_all(&docs, json2struct::format_value)?;
                write_output(target.out.as_ref(), &out)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn render_all(
    docs: &[Document],
    mut render: impl FnMut(&Value) -> json2struct::Result<String>,
) -> Result<String> {
    let labelled = docs.len() > 1;
    let mut parts = Vec::with_capacity(docs.len());
    for doc in docs {
        tracing::info!(source = %doc.source, "converting");
        let code = render(&doc.value).with_context(|| format!("failed to convert {}", doc.source))?;
        parts.push(if labelled { format!("// {}\n{code}", doc.source) } else { code });
    }
    Ok(parts.join("\n\n"))
}

fn write_output(out: Option<&PathBuf>, code: &str) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(path, format!("{code}\n"))
                .with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            println!("{code}");
            Ok(())
        }
    }
}

fn read_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(source).with_context(|| format!("failed to read {source}"))
}

/// Expand glob patterns; literal paths and '-' pass through unchanged.
fn resolve_inputs<I>(patterns: I) -> Result<Vec<String>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if !has_glob_chars(pattern) {
            out.push(pattern.to_owned());
            continue;
        }
        let before = out.len();
        for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern {pattern}"))? {
            out.push(entry?.to_string_lossy().into_owned());
        }
        if out.len() == before {
            return Err(anyhow!("glob pattern matched no files: {pattern}"));
        }
    }
    Ok(out)
}
