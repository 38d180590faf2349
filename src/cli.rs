//! Command-line interface

use crate::app::{load_config, App};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parley_core::{CapabilityKind, Services, SpeechRequest};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "parley", version, about = "Run requests against pluggable speech and text providers")]
pub struct Cli {
    /// Print per-provider timing after the command
    #[arg(long, global = true)]
    pub metrics: bool,

    /// Configuration file layered over the defaults
    #[arg(long, short, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List registered providers per capability (* = selected)
    Providers,
    /// Synthesize speech
    Speak {
        text: String,
        /// Provider-specific voice
        #[arg(long)]
        voice: Option<String>,
        /// Copy the audio here; the scratch file is removed on exit
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Repeat the request; repeats reuse the first file
        #[arg(long, default_value_t = 1)]
        repeat: usize,
    },
    /// Transcribe an audio file
    Transcribe { file: PathBuf },
    /// Generate a response for a prompt
    Infer { prompt: String },
    /// Count tokens
    Tokens { text: String },
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let app = App::build(&config)?;

    let result = execute(&app.services, cli.command).await;
    if cli.metrics {
        print_metrics(&app.services);
    }

    app.shutdown().await;
    result
}

async fn execute(services: &Services, command: Command) -> Result<()> {
    match command {
        Command::Providers => {
            for kind in CapabilityKind::ALL {
                let selected = services.selection().get(kind);
                let names: Vec<String> = services
                    .registry()
                    .names_for(kind)
                    .into_iter()
                    .map(|name| {
                        if Some(name) == selected {
                            format!("*{name}")
                        } else {
                            name.to_string()
                        }
                    })
                    .collect();
                println!("{:<18} {}", kind.as_str(), names.join(", "));
            }
        }
        Command::Speak {
            text,
            voice,
            output,
            repeat,
        } => {
            let mut request = SpeechRequest::new(text);
            request.voice = voice;

            let mut last = None;
            for _ in 0..repeat.max(1) {
                let speech = services.speak(&request).await?;
                println!(
                    "{} ({}{})",
                    speech.path.display(),
                    speech.provider,
                    if speech.reused { ", reused" } else { "" }
                );
                last = Some(speech);
            }

            if let (Some(speech), Some(output)) = (last, output) {
                tokio::fs::copy(&speech.path, &output)
                    .await
                    .with_context(|| format!("Failed to copy audio to {}", output.display()))?;
                println!("Saved {}", output.display());
            }
        }
        Command::Transcribe { file } => {
            println!("{}", services.transcribe(&file).await?);
        }
        Command::Infer { prompt } => {
            let inference = services.infer(&prompt).await?;
            if let Some(tokens) = inference.prompt_tokens {
                println!("prompt tokens: {tokens}");
            }
            println!("{}", inference.text);
        }
        Command::Tokens { text } => {
            println!("{}", services.count_tokens(&text)?);
        }
    }
    Ok(())
}

fn print_metrics(services: &Services) {
    let snapshot = services.metrics().snapshot();
    if snapshot.is_empty() {
        eprintln!("no timings recorded");
        return;
    }
    eprintln!("{:<28} {:>6} {:>12}", "operation", "count", "avg (ms)");
    for entry in snapshot {
        eprintln!(
            "{:<28} {:>6} {:>12.3}",
            entry.key,
            entry.count,
            entry.average_ms()
        );
    }
}
