use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use flash_fallback::plugin::{NativeSignal, ScriptedPlugin};
use flash_fallback::{
    build_embed_markup, Display, EventLog, MediaFile, PlayerOptions, PlayerRegistry,
};

#[derive(Parser)]
#[command(name = "flash-fallback", about = "Flash fallback player tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the embed markup for an options file
    Markup {
        /// JSON player options
        #[arg(long)]
        options: Option<PathBuf>,
        /// Print the structural fingerprint instead of the markup
        #[arg(long)]
        fingerprint: bool,
    },
    /// Run a scripted plugin session on a virtual clock and print events as JSON lines
    Simulate {
        #[arg(long)]
        options: Option<PathBuf>,
        /// Media url handed to the player
        #[arg(long, default_value = "media/clip.flv")]
        media: String,
        /// Duration the plugin reports once metadata is parsed
        #[arg(long, default_value_t = 120.0)]
        duration: f64,
        /// Seconds after which the plugin starts reporting the duration
        #[arg(long, default_value_t = 1.0)]
        duration_after: f64,
        /// Comma-separated `signal@seconds` steps, e.g. `ready@0,play@1,pause@3,meta@4`
        #[arg(long, default_value = "ready@0,play@1,pause@4")]
        script: String,
        /// Seconds to keep the clock running after the last step
        #[arg(long, default_value_t = 2.0)]
        tail: f64,
    },
}

fn load_options(path: Option<&PathBuf>) -> anyhow::Result<PlayerOptions> {
    match path {
        Some(p) => {
            let raw = std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            PlayerOptions::from_json(&raw).with_context(|| format!("parsing {}", p.display()))
        }
        None => Ok(PlayerOptions::default()),
    }
}

fn parse_script(script: &str) -> anyhow::Result<Vec<(f64, NativeSignal)>> {
    let mut steps = Vec::new();
    for step in script.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, at) = step.split_once('@').unwrap_or((step, "0"));
        let signal: NativeSignal = name.parse().map_err(anyhow::Error::msg)?;
        let at: f64 = at.parse().with_context(|| format!("bad time in step {}", step))?;
        if !at.is_finite() || at < 0.0 {
            bail!("step {} has a negative time", step);
        }
        steps.push((at, signal));
    }
    steps.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(steps)
}

fn simulate(
    options: PlayerOptions,
    media: &str,
    duration: f64,
    duration_after: f64,
    script: &str,
    tail: f64,
) -> anyhow::Result<()> {
    let steps = parse_script(script)?;
    let registry = PlayerRegistry::with_defaults();
    let file = MediaFile::from_url(media)?;
    let kind = registry.select(&file, flash_fallback::flash::KIND)?;
    let mut player = registry.create(kind.tag, Display::new("display"), options, file)?;

    let plugin = Arc::new(ScriptedPlugin::new());
    player.attach_plugin(plugin.clone());
    let log = EventLog::new();
    log.attach(player.events_mut());

    let end = steps.last().map(|s| s.0).unwrap_or(0.0) + tail.max(0.0);
    let mut now = 0.0_f64;
    let mut pending = steps.into_iter().peekable();
    let step = 0.25_f64;
    while now <= end {
        if now >= duration_after {
            plugin.set_duration(duration);
        }
        while let Some((_, signal)) = pending.next_if(|(at, _)| *at <= now) {
            player.on_native_signal(signal);
        }
        plugin.set_current_time(now);
        for ev in log.take() {
            println!("{}", serde_json::json!({ "at": now, "event": ev }));
        }
        player.advance(Duration::from_secs_f64(step));
        now += step;
    }
    player.destroy();
    for ev in log.take() {
        println!("{}", serde_json::json!({ "at": now, "event": ev }));
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Markup { options, fingerprint } => {
            let opts = load_options(options.as_ref())?;
            let markup = build_embed_markup(&opts.embed_params());
            if fingerprint {
                println!("{}", markup.fingerprint());
            } else {
                println!("{}", markup.to_html());
            }
        }
        Command::Simulate {
            options,
            media,
            duration,
            duration_after,
            script,
            tail,
        } => {
            let opts = load_options(options.as_ref())?;
            simulate(opts, &media, duration, duration_after, &script, tail)?;
        }
    }
    Ok(())
}
