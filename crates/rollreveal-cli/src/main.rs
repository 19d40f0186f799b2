//! DnD Game Rolls CLI
//!
//! A command-line dice roller with animated reveals, physics throws and an
//! in-memory roll history.

use std::cell::RefCell;
use std::error::Error;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tokio::task::LocalSet;
use tracing::Level;

use rollreveal::dice::effects::{
    AudioOutput, EffectPlaybackFailure, EffectReport, NoHaptics, SoundCue,
};
use rollreveal::dice::physics::Simulation;
use rollreveal::dice::reveal::RevealFrame;
use rollreveal::dice::{
    ability_modifier, simulate, AnimationState, DiceStyle, DiceType, EffectDispatcher, EffectSettings,
    EffectTier, HistoryEntry, RollObserver, RollOutcome, RollRequest, RollSession, SeededSource,
    ThreadSource, ThrowParams, UniformSource,
};

const RULE: &str = "═══════════════════════════════════════";

/// DnD Game Rolls - CLI dice roller
#[derive(Parser)]
#[command(name = "dndrolls")]
#[command(
    author,
    version,
    about = "DnD Game Rolls - A command-line D&D dice roller"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file (defaults to the per-user app data folder)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll dice notation (e.g. "2d6+1", "d20", "3d8-2")
    Roll {
        notation: String,

        /// What the roll is for (e.g. "attack", "skill: wisdom")
        #[arg(short, long, default_value = "")]
        label: String,

        /// Throw each die through the physics simulation
        #[arg(short, long)]
        physics: bool,

        /// Print the result immediately, without the reveal
        #[arg(long)]
        no_animate: bool,

        /// Seed for a reproducible roll
        #[arg(long)]
        seed: Option<u64>,

        /// Use this total instead of rolling one
        #[arg(long, allow_hyphen_values = true)]
        total: Option<i64>,
    },

    /// Roll a strength check
    #[command(visible_alias = "str")]
    Strength(AbilityArgs),

    /// Roll a dexterity check
    #[command(visible_alias = "dex")]
    Dexterity(AbilityArgs),

    /// Roll a constitution check
    #[command(visible_alias = "con")]
    Constitution(AbilityArgs),

    /// Roll an intelligence check
    #[command(visible_alias = "int")]
    Intelligence(AbilityArgs),

    /// Roll a wisdom check
    #[command(visible_alias = "wis")]
    Wisdom(AbilityArgs),

    /// Roll a charisma check
    #[command(visible_alias = "cha")]
    Charisma(AbilityArgs),

    /// Show the cosmetic physics trajectory of one die
    Simulate {
        /// Die type (d4, d6, d8, d10, d12, d20, d100)
        die: String,

        #[arg(long, default_value_t = 5.0)]
        velocity: f32,

        /// Launch angle in degrees
        #[arg(long, default_value_t = 45.0)]
        angle: f32,

        /// Spin in degrees per second
        #[arg(long, default_value_t = 720.0)]
        spin: f32,

        #[arg(long)]
        seed: Option<u64>,

        /// Print the simulation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive session: one notation per line, plus history, clear and quit
    Session {
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show or change effect settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(clap::Args)]
struct AbilityArgs {
    /// Ability score the modifier is derived from
    #[arg(short, long, default_value_t = 10)]
    score: i32,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    no_animate: bool,
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    Set {
        /// Master volume, 0 to 1
        #[arg(long)]
        volume: Option<f32>,
        #[arg(long)]
        sound: Option<bool>,
        #[arg(long)]
        vibration: Option<bool>,
        #[arg(long)]
        particles: Option<bool>,
        /// Animation speed, 0.5 to 2
        #[arg(long)]
        speed: Option<f32>,
        #[arg(long)]
        shake: Option<bool>,
    },
    Reset,
}

// ============================================================================
// Terminal outputs
// ============================================================================

/// Rings the terminal bell for critical rolls. Other cues have no sound here.
struct TerminalBell;

impl AudioOutput for TerminalBell {
    fn play(&mut self, cue: SoundCue, _volume: f32) -> Result<(), EffectPlaybackFailure> {
        if !matches!(cue, SoundCue::CriticalSuccess | SoundCue::CriticalFailure) {
            return Err(EffectPlaybackFailure::Unsupported);
        }
        if !std::io::stdout().is_terminal() {
            return Err(EffectPlaybackFailure::Unsupported);
        }
        let mut out = std::io::stdout();
        out.write_all(b"\x07")
            .and_then(|_| out.flush())
            .map_err(|e| EffectPlaybackFailure::Device(e.to_string()))
    }
}

type CliSession = RollSession<TerminalBell, NoHaptics>;

/// Prints reveal progress and hands the finished roll back to the caller.
struct TerminalView {
    done: Option<oneshot::Sender<HistoryEntry>>,
}

impl RollObserver for TerminalView {
    fn on_trajectories(&mut self, simulations: &[Simulation]) {
        for (i, sim) in simulations.iter().enumerate() {
            println!(
                "  {} die {} tumbles {} frames, {} bounces",
                "⟳".cyan(),
                i + 1,
                sim.trajectory.len(),
                sim.bounce_count()
            );
        }
    }

    fn on_phase_change(&mut self, frame: &RevealFrame) {
        if frame.state == AnimationState::Revealed {
            return;
        }
        let values: Vec<String> = frame.values.iter().map(|v| format!("[{v}]")).collect();
        println!(
            "  {} {}",
            format!("{}...", frame.state.label()).dimmed(),
            values.join(" ").dimmed()
        );
    }

    fn on_effects(&mut self, report: &EffectReport) {
        if let Some(burst) = &report.burst {
            tracing::info!(
                tier = report.tier.label(),
                particles = burst.particles().len(),
                "particle burst"
            );
        }
    }

    fn on_complete(&mut self, entry: &HistoryEntry) {
        if let Some(done) = self.done.take() {
            let _ = done.send(entry.clone());
        }
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let settings_path = match cli.settings {
        Some(path) => Ok(path),
        None => EffectSettings::default_path(),
    };

    let (request, seed, animate) = match cli.command {
        Commands::Settings { action } => return settings_command(action, settings_path?),
        Commands::Simulate {
            die,
            velocity,
            angle,
            spin,
            seed,
            json,
        } => {
            let params = ThrowParams {
                velocity,
                angle_degrees: angle,
                spin_degrees_per_second: spin,
            };
            return simulate_command(&die, params, seed, json);
        }
        Commands::Session { seed } => {
            let settings = load_settings(settings_path.ok());
            return block_on_local(interactive_session(new_session(settings, seed)));
        }
        Commands::Roll {
            notation,
            label,
            physics,
            no_animate,
            seed,
            total,
        } => {
            let mut request = RollRequest::new(notation).with_label(label);
            if physics {
                request = request.with_physics(vec![ThrowParams::default()]);
            }
            if let Some(total) = total {
                request = request.with_total(total);
            }
            (request, seed, !no_animate)
        }
        Commands::Strength(args) => ability_request("Strength", args),
        Commands::Dexterity(args) => ability_request("Dexterity", args),
        Commands::Constitution(args) => ability_request("Constitution", args),
        Commands::Intelligence(args) => ability_request("Intelligence", args),
        Commands::Wisdom(args) => ability_request("Wisdom", args),
        Commands::Charisma(args) => ability_request("Charisma", args),
    };

    let mut session = new_session(load_settings(settings_path.ok()), seed);
    if !animate {
        let entry = session.roll_instant(&request)?;
        print_roll(&entry);
        return Ok(());
    }

    block_on_local(async move {
        let entry = animated_roll(&mut session, &request).await?;
        print_roll(&entry);
        Ok(())
    })
}

fn ability_request(name: &str, args: AbilityArgs) -> (RollRequest, Option<u64>, bool) {
    let modifier = ability_modifier(args.score);
    let request =
        RollRequest::new(format!("1d20{modifier:+}")).with_label(format!("{name} check"));
    (request, args.seed, !args.no_animate)
}

fn load_settings(path: Option<PathBuf>) -> EffectSettings {
    path.map(|p| EffectSettings::load_from(&p))
        .unwrap_or_default()
}

fn new_session(settings: EffectSettings, seed: Option<u64>) -> CliSession {
    let dispatcher = EffectDispatcher::new(TerminalBell, NoHaptics);
    let session = RollSession::new(dispatcher, settings);
    match seed {
        Some(seed) => session.with_source(SeededSource::new(seed)),
        None => session.with_source(ThreadSource),
    }
}

fn block_on_local<F>(future: F) -> Result<(), Box<dyn Error>>
where
    F: std::future::Future<Output = Result<(), Box<dyn Error>>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    LocalSet::new().block_on(&runtime, future)
}

async fn animated_roll(
    session: &mut CliSession,
    request: &RollRequest,
) -> Result<HistoryEntry, Box<dyn Error>> {
    let (done, finished) = oneshot::channel();
    let view = Rc::new(RefCell::new(TerminalView { done: Some(done) }));
    session.roll(request, view)?;
    Ok(finished.await?)
}

async fn interactive_session(mut session: CliSession) -> Result<(), Box<dyn Error>> {
    println!(
        "{}",
        "Enter dice notation (optionally followed by a label), 'history', 'clear' or 'quit'."
            .dimmed()
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "exit" => break,
            "history" => print_history(&session.history().list()),
            "clear" => {
                session.clear_history();
                println!("{}", "History cleared.".dimmed());
            }
            _ => {
                let (notation, label) = match line.split_once(char::is_whitespace) {
                    Some((notation, label)) => (notation, label.trim()),
                    None => (line, ""),
                };
                let request = RollRequest::new(notation).with_label(label);
                match animated_roll(&mut session, &request).await {
                    Ok(entry) => print_roll(&entry),
                    Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
                }
            }
        }
    }

    session.teardown();
    Ok(())
}

// ============================================================================
// Output
// ============================================================================

fn die_color(faces: u32, value: i64) -> ColoredString {
    let text = format!("[{value}]");
    match (faces, value) {
        (20, 20) => text.bright_green().bold(),
        (20, 1) => text.bright_red().bold(),
        _ => text.bright_white().bold(),
    }
}

fn total_color(outcome: &RollOutcome) -> ColoredString {
    let total = outcome.total();
    let text = total.to_string();
    if outcome.is_critical_success() {
        text.bright_green().bold()
    } else if outcome.is_critical_failure() {
        text.bright_red().bold()
    } else if total >= 20 {
        text.green().bold()
    } else if total >= 15 {
        text.white().bold()
    } else if total >= 10 {
        text.yellow()
    } else {
        text.red()
    }
}

fn print_roll(entry: &HistoryEntry) {
    let outcome = &entry.outcome;
    let descriptor = outcome.descriptor();

    println!("\n{}", RULE.cyan());
    let rolling = if entry.roll_label.is_empty() {
        descriptor.to_string()
    } else {
        format!("{} ({})", entry.roll_label, descriptor)
    };
    println!("{} {}", "Rolling:".bold().white(), rolling.yellow().bold());

    let dice_name = descriptor
        .die_type()
        .map(|d| d.name().to_string())
        .unwrap_or_else(|| format!("D{}", descriptor.faces()));
    let (r, g, b) = DiceStyle::for_faces(descriptor.faces()).rgb8();
    let dice_name = dice_name.truecolor(r, g, b);
    let dice: Vec<String> = outcome
        .per_die()
        .iter()
        .map(|&v| format!("{}: {}", dice_name, die_color(descriptor.faces(), v)))
        .collect();
    println!("{} {}", "Dice:".bold().white(), dice.join(", "));

    let modifier = descriptor.modifier();
    let modifier_str = if modifier >= 0 {
        format!("+{modifier}").cyan()
    } else {
        modifier.to_string().cyan()
    };
    println!("{} {}", "Modifier:".bold().white(), modifier_str);
    println!("{} {}", "Total:".bold().white(), total_color(outcome));

    match EffectTier::classify(outcome) {
        EffectTier::CriticalSuccess => {
            println!("{}", "NATURAL 20! CRITICAL SUCCESS!".bright_green().bold())
        }
        EffectTier::CriticalFailure => {
            println!("{}", "NATURAL 1! CRITICAL FAILURE!".bright_red().bold())
        }
        EffectTier::Normal => {}
    }
    if !outcome.is_plausible() {
        println!(
            "{}",
            "(supplied total is outside what these dice can roll)".dimmed()
        );
    }

    println!("{}", RULE.cyan());
}

fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("{}", "No rolls yet.".dimmed());
        return;
    }
    println!("\n{}", RULE.cyan());
    for entry in entries.iter().rev() {
        let label = if entry.roll_label.is_empty() {
            String::new()
        } else {
            format!(" {}", entry.roll_label.dimmed())
        };
        println!(
            "{:>6} {}{}",
            total_color(&entry.outcome),
            entry.notation.yellow(),
            label
        );
    }
    println!("{}", RULE.cyan());
}

// ============================================================================
// Simulate / settings commands
// ============================================================================

fn simulate_command(
    die: &str,
    params: ThrowParams,
    seed: Option<u64>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let die_type = DiceType::parse(die).ok_or_else(|| {
        format!("Unknown die type: {die}. Valid: d4, d6, d8, d10, d12, d20, d100")
    })?;

    let mut source: Box<dyn UniformSource> = match seed {
        Some(seed) => Box::new(SeededSource::new(seed)),
        None => Box::new(ThreadSource),
    };
    let sim = simulate(die_type.max_value(), params, &mut source);

    if json {
        println!("{}", serde_json::to_string_pretty(&sim)?);
        return Ok(());
    }

    println!("\n{}", RULE.cyan());
    println!(
        "{} {}",
        "Throwing:".bold().white(),
        die_type.name().yellow().bold()
    );
    println!(
        "{:>4} {:>8} {:>8} {:>22} {:>7}",
        "step", "x", "y", "rotation", "bounces"
    );
    for (i, frame) in sim.trajectory.iter().enumerate() {
        let rotation = format!(
            "{:.0}/{:.0}/{:.0}",
            frame.rotation.x, frame.rotation.y, frame.rotation.z
        );
        println!(
            "{:>4} {:>8.3} {:>8.3} {:>22} {:>7}",
            i + 1,
            frame.position.x,
            frame.position.y,
            rotation,
            frame.bounce_count
        );
    }
    println!(
        "{} {} {}",
        "Landed on:".bold().white(),
        sim.simulated_result.to_string().bright_white().bold(),
        "(cosmetic)".dimmed()
    );
    println!("{}", RULE.cyan());
    Ok(())
}

fn settings_command(action: SettingsAction, path: PathBuf) -> Result<(), Box<dyn Error>> {
    let settings = match action {
        SettingsAction::Show => EffectSettings::load_from(&path),
        SettingsAction::Reset => {
            let settings = EffectSettings::default();
            settings.save_to(&path)?;
            settings
        }
        SettingsAction::Set {
            volume,
            sound,
            vibration,
            particles,
            speed,
            shake,
        } => {
            let mut settings = EffectSettings::load_from(&path);
            if let Some(volume) = volume {
                settings.volume = volume;
            }
            if let Some(sound) = sound {
                settings.sound_enabled = sound;
            }
            if let Some(vibration) = vibration {
                settings.vibration_enabled = vibration;
            }
            if let Some(particles) = particles {
                settings.particles_enabled = particles;
            }
            if let Some(speed) = speed {
                settings.animation_speed = speed;
            }
            if let Some(shake) = shake {
                settings.shake_on_roll = shake;
            }
            let settings = settings.sanitized();
            settings.save_to(&path)?;
            settings
        }
    };

    println!("{} {}", "Settings:".bold().white(), path.display());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bell_only_renders_criticals() {
        let mut bell = TerminalBell;
        assert_eq!(
            bell.play(SoundCue::Normal, 0.8),
            Err(EffectPlaybackFailure::Unsupported)
        );
        assert_eq!(
            bell.play(SoundCue::Shake, 1.0),
            Err(EffectPlaybackFailure::Unsupported)
        );
    }

    #[test]
    fn test_normal_reveal_reports_no_sound() {
        let mut dispatcher = EffectDispatcher::new(TerminalBell, NoHaptics);
        let outcome = rollreveal::dice::session::outcome_for_total("1d20", 9).unwrap();
        let report = dispatcher.trigger_effects(
            &outcome,
            &EffectSettings::default(),
            &mut SeededSource::new(1),
        );
        assert_eq!(report.sound, None);
        assert!(!dispatcher.play_shake_cue(&EffectSettings::default()));
    }

    #[test]
    fn test_ability_request_notation() {
        let (request, _, animate) = ability_request(
            "Wisdom",
            AbilityArgs {
                score: 8,
                seed: None,
                no_animate: true,
            },
        );
        assert_eq!(request.notation, "1d20-1");
        assert_eq!(request.label, "Wisdom check");
        assert!(!animate);
    }
}
