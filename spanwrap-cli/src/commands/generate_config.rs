//! Generate config command implementation

use anyhow::{Context, Result};
use clap::Args;
use spanwrap_core::defaults;
use spanwrap_core::domain::classifier::{
    DEFAULT_APOSTROPHES, DEFAULT_START_PUNCTUATION, DEFAULT_STOP_PUNCTUATION,
};
use spanwrap_core::Labels;
use std::fs;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        if self.output.exists() && !self.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                self.output.display()
            );
        }

        println!("Generating configuration template...");
        println!("  Output file: {}", self.output.display());

        fs::write(&self.output, generate_template())
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("✓ Configuration template generated successfully!");
        println!();
        println!("Next steps:");
        println!("1. Edit the configuration file");
        println!("2. Validate your configuration:");
        println!("   spanwrap validate --config {}", self.output.display());
        println!("3. Use it for processing:");
        println!(
            "   spanwrap process -i page.html --config {}",
            self.output.display()
        );

        Ok(())
    }
}

fn toml_chars(chars: &[char]) -> String {
    let quoted: Vec<String> = chars.iter().map(|c| format!("{:?}", c.to_string())).collect();
    format!("[{}]", quoted.join(", "))
}

/// Template configuration with every default spelled out
fn generate_template() -> String {
    let labels = Labels::default();
    format!(
        r#"# spanwrap configuration

[segmentation]
# Any of: letter, word, speaking, sentence, space, punctuation
modes = ["letter"]
# Number wrappers in execution order
assign_identifiers = true
identifier_attribute = "{identifier_attribute}"
# Add class labels to wrappers
use_labels = false
wrapper_tag = "{wrapper_tag}"

# Comma separated lists of tag names (`p`), classes (`.note`) or both (`p.note`)
[selectors]
# Subtrees left untouched
exclude = "{exclude}"
# Hard boundaries for sentences, speaking units and words
block = "{block}"
# Explicit line breaks
line_break = "{line_break}"

# Class labels, used when use_labels = true
[labels]
token = "{token}"
letter = "{letter}"
word = "{word}"
speaking = "{speaking}"
sentence = "{sentence}"
punctuation = "{punctuation}"
sentence_stop = "{sentence_stop}"
whitespace = "{whitespace}"

[classifier]
# unicode, unicode-alphanumeric or ascii
alphabet = "unicode"
stop_punctuation = {stop}
start_punctuation = {start}
apostrophes = {apostrophes}
"#,
        identifier_attribute = defaults::IDENTIFIER_ATTRIBUTE,
        wrapper_tag = defaults::WRAPPER_TAG,
        exclude = defaults::EXCLUDE_SELECTOR,
        block = defaults::BLOCK_SELECTOR,
        line_break = defaults::LINE_BREAK_SELECTOR,
        token = labels.token,
        letter = labels.letter,
        word = labels.word,
        speaking = labels.speaking,
        sentence = labels.sentence,
        punctuation = labels.punctuation,
        sentence_stop = labels.sentence_stop,
        whitespace = labels.whitespace,
        stop = toml_chars(DEFAULT_STOP_PUNCTUATION),
        start = toml_chars(DEFAULT_START_PUNCTUATION),
        apostrophes = toml_chars(DEFAULT_APOSTROPHES),
    )
}
