use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use speech_studio::playback::{
    CpalSink, ManualSink, OutputSink, PlaybackBridge, PlaybackElement, PlaybackEvent,
    read_wav_file,
};
use speech_studio::visualizer::TerminalSurface;
use speech_studio::voice::Gender;
use speech_studio::{Config, GeminiSpeech, Studio, StudioOptions, VoiceCatalog};

/// Speech Studio - Text-to-speech studio with live spectrum playback
#[derive(Parser)]
#[command(name = "speech-studio", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable audio output (for headless machines without a sound device)
    #[arg(long, env = "SPEECH_STUDIO_DISABLE_AUDIO")]
    no_audio: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate one clip and play it
    Say {
        /// Text to speak
        text: String,
        /// Voice id or name
        #[arg(short, long)]
        voice: Option<String>,
        /// Save the clip to this directory
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Don't play the clip
        #[arg(long)]
        no_play: bool,
    },
    /// List available voices
    Voices,
    /// Play a WAV file with the spectrum meter
    Play {
        /// Path to a 16-bit PCM WAV file
        file: PathBuf,
    },
    /// Interactive studio session (default)
    Studio,
    /// Interactive first-run setup
    Setup,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,speech_studio=info",
        1 => "info,speech_studio=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Command::Studio);
    if matches!(command, Command::Setup) {
        return speech_studio::setup::run_setup();
    }

    let config = Config::load_with_options(cli.no_audio);
    tracing::debug!(?config, "loaded configuration");

    match command {
        Command::Say {
            text,
            voice,
            out,
            no_play,
        } => cmd_say(&config, &text, voice.as_deref(), out, no_play).await,
        Command::Voices => {
            cmd_voices();
            Ok(())
        }
        Command::Play { file } => cmd_play(&config, &file).await,
        Command::Studio => cmd_studio(&config).await,
        Command::Setup => speech_studio::setup::run_setup(),
    }
}

/// Open the output device, or a silent sink when audio is off or unavailable
fn open_sink(config: &Config, sample_rate: u32) -> (Box<dyn OutputSink>, bool) {
    if !config.audio.enabled {
        return (Box::new(ManualSink::default()), false);
    }

    match CpalSink::new(sample_rate) {
        Ok(sink) => (Box::new(sink), true),
        Err(e) => {
            tracing::warn!(error = %e, "audio output unavailable, continuing without sound");
            (Box::new(ManualSink::default()), false)
        }
    }
}

/// Build a studio session from configuration
fn build_studio(
    config: &Config,
    autoplay: bool,
) -> anyhow::Result<(Studio<TerminalSurface>, bool)> {
    let synthesizer = GeminiSpeech::new(&config.speech)?;
    let (sink, audible) = open_sink(config, speech_studio::audio::SAMPLE_RATE);
    let surface = TerminalSurface::new(
        config.visualizer.columns,
        audible && config.visualizer.enabled,
    );

    let studio = Studio::new(
        Box::new(synthesizer),
        surface,
        sink,
        StudioOptions {
            autoplay: autoplay && audible,
            default_voice: config.speech.default_voice.clone(),
            frame_interval: config.visualizer.frame_interval(),
        },
    );

    Ok((studio, audible))
}

/// Generate one clip, optionally save it, and play it to the end
#[allow(clippy::future_not_send)]
async fn cmd_say(
    config: &Config,
    text: &str,
    voice: Option<&str>,
    out: Option<PathBuf>,
    no_play: bool,
) -> anyhow::Result<()> {
    let (mut studio, audible) = build_studio(config, !no_play)?;
    if let Some(voice) = voice {
        studio.select_voice(voice)?;
    }

    let mut events = studio.player().subscribe();
    let clip_id = match studio.generate(text).await {
        Ok(clip) => clip.id.clone(),
        Err(e) => anyhow::bail!(e.user_message()),
    };

    // Without playback the clip would otherwise be lost
    if out.is_some() || no_play || !audible {
        let dir = out.unwrap_or_else(|| config.output_dir.clone());
        let path = studio.save_clip(&clip_id, &dir)?;
        println!("Saved {}", path.display());
    }

    while studio.player().is_playing() {
        if events.changed().await.is_err() {
            break;
        }
        studio.sync_playback();
    }
    studio.sync_playback();
    eprintln!();

    Ok(())
}

fn cmd_voices() {
    let catalog = VoiceCatalog::new();
    for voice in catalog.voices() {
        println!("{:<8} {:<7} {}", voice.name, voice.gender, voice.description);
    }
}

/// Play a WAV file from disk through the meter
#[allow(clippy::future_not_send)]
async fn cmd_play(config: &Config, file: &std::path::Path) -> anyhow::Result<()> {
    let (samples, sample_rate) = read_wav_file(file)?;
    let (sink, audible) = open_sink(config, sample_rate);
    if !audible {
        anyhow::bail!("audio output is disabled");
    }

    let element = PlaybackElement::new();
    element.load_samples(samples, sample_rate, &file.display().to_string());

    let surface = TerminalSurface::new(config.visualizer.columns, config.visualizer.enabled);
    let mut bridge = PlaybackBridge::new(
        element.clone(),
        surface,
        sink,
        config.visualizer.frame_interval(),
    );

    let mut events = element.subscribe();
    element.play()?;
    bridge.set_playing(true);

    while element.is_playing() {
        if events.changed().await.is_err() {
            break;
        }
    }
    bridge.set_playing(false);
    eprintln!();

    Ok(())
}

const HELP: &str = "\
Type text to generate speech with the selected voice. Commands:
  /voices                 list voices
  /voice <name|id>        select a voice
  /clone <name> <m|f> <sample>
                          create a custom voice from a recording
  /forget <id>            remove a custom voice
  /history                list generated clips
  /play <#n|id>           play or pause clip n (or by id prefix)
  /delete <#n|id>         delete a clip
  /save <#n|id> [dir]     save a clip as WAV
  /pause                  pause playback
  /status                 show session status
  /quit                   exit";

/// Interactive session: text lines generate speech, slash lines are commands
#[allow(clippy::future_not_send)]
async fn cmd_studio(config: &Config) -> anyhow::Result<()> {
    let (mut studio, audible) = build_studio(config, config.audio.autoplay)?;
    if !audible {
        println!("Audio output is off; use /save to keep clips.");
    }
    println!("{HELP}\n");
    print_selected(&studio);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut events = studio.player().subscribe();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_line(&mut studio, config, line.trim()).await {
                    break;
                }
            }
            changed = events.changed() => {
                if changed.is_err() {
                    break;
                }
                let event = *events.borrow_and_update();
                studio.sync_playback();
                if event == PlaybackEvent::Ended {
                    eprintln!();
                }
            }
        }
    }

    studio.pause();
    Ok(())
}

/// Handle one input line; returns false to end the session
#[allow(clippy::future_not_send)]
async fn handle_line(studio: &mut Studio<TerminalSurface>, config: &Config, line: &str) -> bool {
    if line.is_empty() {
        return true;
    }

    let Some(command) = line.strip_prefix('/') else {
        match studio.generate(line).await {
            Ok(clip) => {
                let secs = clip.duration().as_secs_f32();
                println!("Generated clip {} ({secs:.1}s)", studio.history().len());
            }
            Err(e) => println!("{}", e.user_message()),
        }
        return true;
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match run_command(studio, config, name, &args) {
        Ok(keep_going) => keep_going,
        Err(e) => {
            println!("{e}");
            true
        }
    }
}

/// Run one slash command
fn run_command(
    studio: &mut Studio<TerminalSurface>,
    config: &Config,
    name: &str,
    args: &[&str],
) -> anyhow::Result<bool> {
    match (name, args) {
        ("quit" | "exit" | "q", _) => return Ok(false),
        ("help" | "h", _) => println!("{HELP}"),
        ("voices", _) => {
            let selected = studio.selected_voice().map(|v| v.id.clone());
            for voice in studio.catalog().voices() {
                let marker = if selected.as_deref() == Some(voice.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{marker} {:<10} {:<7} {} [{}]",
                    voice.name, voice.gender, voice.description, voice.id
                );
            }
        }
        ("voice", [voice, ..]) => {
            studio.select_voice(voice)?;
            print_selected(studio);
        }
        ("clone", [voice_name @ .., gender, sample]) if !voice_name.is_empty() => {
            let gender: Gender = gender.parse()?;
            studio.create_custom_voice(&voice_name.join(" "), gender, Path::new(sample))?;
            print_selected(studio);
        }
        ("forget", [id]) => {
            let voice = studio.remove_custom_voice(id)?;
            println!("Removed {}", voice.name);
        }
        ("history", _) => print_history(studio),
        ("play", [reference]) => {
            let id = resolve_clip(studio, reference)?;
            studio.play_clip(&id)?;
        }
        ("delete", [reference]) => {
            let id = resolve_clip(studio, reference)?;
            let clip = studio.delete_clip(&id)?;
            println!("Deleted \"{}\"", clip.text);
        }
        ("save", [reference, rest @ ..]) => {
            let id = resolve_clip(studio, reference)?;
            let dir = rest
                .first()
                .map_or_else(|| config.output_dir.clone(), PathBuf::from);
            let path = studio.save_clip(&id, &dir)?;
            println!("Saved {}", path.display());
        }
        ("pause", _) => studio.pause(),
        ("status", _) => {
            println!("Status: {}", studio.status());
            if let Some(error) = studio.last_error() {
                println!("Last error: {error}");
            }
            print_selected(studio);
        }
        _ => println!("Unknown command. Type /help for a list."),
    }

    Ok(true)
}

/// Id of the clip a user reference points at
fn resolve_clip(studio: &Studio<TerminalSurface>, reference: &str) -> anyhow::Result<String> {
    studio
        .history()
        .resolve(reference)
        .map(|clip| clip.id.clone())
        .ok_or_else(|| anyhow::anyhow!("no clip {reference}"))
}

fn print_selected(studio: &Studio<TerminalSurface>) {
    if let Some(voice) = studio.selected_voice() {
        println!("Voice: {} ({})", voice.name, voice.gender);
    }
}

fn print_history(studio: &Studio<TerminalSurface>) {
    if studio.history().is_empty() {
        println!("No clips yet.");
        return;
    }

    let current = studio.history().current_id();
    for (i, clip) in studio.history().clips().iter().enumerate() {
        let marker = if current == Some(clip.id.as_str()) { ">" } else { " " };
        println!(
            "{marker} #{:<2} {} [{}] {} {:.1}s \"{}\"",
            i + 1,
            clip.id.get(..8).unwrap_or(&clip.id),
            clip.created_at.format("%H:%M:%S"),
            studio.voice_label(&clip.voice_id),
            clip.duration().as_secs_f32(),
            clip.text
        );
    }
}
