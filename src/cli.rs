//! Headless front end: one-shot generation, prompt enhancement and
//! personal key management. Everything runs synchronously on this thread.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use archviz_studio::compose::{ArtStyle, ModelTier, PresetLibrary, Tab};
use archviz_studio::config::Settings;
use archviz_studio::event::LoggingEventHandler;
use archviz_studio::service::GeminiClient;
use archviz_studio::source::SourceImage;
use archviz_studio::state::{CredentialStore, FileCredentialStore, Studio};

/// Architectural render generator.
#[derive(Parser, Debug)]
#[command(
    name = "archviz-studio",
    version,
    about = "Generate and refine architectural renders from a photo or floor plan"
)]
pub struct CliArgs {
    /// Settings file (JSON). Defaults to settings.json in the user config directory.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a render from a reference image
    Generate(GenerateArgs),
    /// Rewrite a prompt into a concise architectural prompt
    Enhance {
        /// Text to rewrite
        prompt: String,
    },
    /// Manage the stored personal API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyAction {
    /// Store a personal key (unlocks the pro and ultra tiers)
    Set { key: String },
    /// Remove the stored key
    Clear,
    /// Show whether a key is stored
    Show,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Reference photograph or floor plan
    #[arg(short, long, value_name = "IMAGE")]
    pub input: PathBuf,

    /// Where to write the generated image
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    #[arg(short, long, default_value = "")]
    pub prompt: String,

    /// Preset id; used when no prompt is typed
    #[arg(long, value_name = "ID")]
    pub preset: Option<String>,

    /// Preset library (JSON)
    #[arg(long, value_name = "FILE")]
    pub presets: Option<PathBuf>,

    /// exterior, interior or plan
    #[arg(long, default_value_t = Tab::Exterior)]
    pub tab: Tab,

    /// optimized, standard, pro or ultra
    #[arg(long)]
    pub tier: Option<ModelTier>,

    /// photo, oil, pencil, marker, color-pencil or anime
    #[arg(long)]
    pub style: Option<ArtStyle>,

    /// Image whose lighting and palette should be transferred
    #[arg(long, value_name = "IMAGE")]
    pub style_reference: Option<PathBuf>,

    /// Refinement note applied in a second pass on top of the first result
    #[arg(long, value_name = "NOTE")]
    pub refine: Option<String>,
}

pub fn run(args: CliArgs) -> ExitCode {
    let settings = match Settings::load_or_default(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = match args.command {
        Command::Generate(generate) => run_generate(settings, generate),
        Command::Enhance { prompt } => run_enhance(settings, &prompt),
        Command::Key { action } => run_key(&settings, action),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {}", message);
            ExitCode::FAILURE
        }
    }
}

fn open_studio(settings: Settings, presets: Option<&Path>) -> Result<Studio<GeminiClient>, String> {
    let client = GeminiClient::new(settings.api_base_url.clone()).map_err(|e| e.to_string())?;
    let store = FileCredentialStore::new(settings.credential_path());
    let mut studio = Studio::new(settings, client, Box::new(store)).map_err(|e| e.to_string())?;
    if let Some(path) = presets {
        let library = PresetLibrary::load(path).map_err(|e| e.to_string())?;
        studio = studio.with_presets(library);
    }
    studio.subscribe(Box::new(LoggingEventHandler::new()));
    Ok(studio)
}

fn run_generate(settings: Settings, args: GenerateArgs) -> Result<(), String> {
    let mut studio = open_studio(settings, args.presets.as_deref())?;

    let source = SourceImage::open(&args.input).map_err(|e| e.to_string())?;
    studio.load_source_image(source);
    if let Some(path) = &args.style_reference {
        let reference = SourceImage::open(path).map_err(|e| e.to_string())?;
        studio.set_style_reference(Some(reference));
    }

    studio.set_tab(args.tab);
    studio.set_prompt(args.prompt);
    if let Some(id) = &args.preset {
        studio.toggle_preset(id);
        if studio.inputs().preset_id.is_none() {
            return Err(format!("unknown preset '{}' on the {} tab", id, args.tab));
        }
    }
    if let Some(tier) = args.tier {
        studio.set_tier(tier);
    }
    if let Some(style) = args.style {
        studio.set_art_style(style);
    }

    let mut result = studio.generate().map_err(|e| e.to_string())?;
    if let Some(note) = args.refine {
        studio.set_refinement_note(note);
        result = studio.generate().map_err(|e| e.to_string())?;
    }

    if let Some(text) = result.text() {
        println!("{}", text);
    }
    let image = match result.to_source_image() {
        Some(image) => image.map_err(|e| e.to_string())?,
        None => return Err("the model answered without an image".to_owned()),
    };
    std::fs::write(&args.output, image.bytes())
        .map_err(|e| format!("could not write '{}': {}", args.output.display(), e))?;
    println!("{} ({}) -> {}", result.model(), image.mime(), args.output.display());
    Ok(())
}

fn run_enhance(settings: Settings, prompt: &str) -> Result<(), String> {
    let mut studio = open_studio(settings, None)?;
    studio.set_prompt(prompt);
    let enhanced = studio.enhance_prompt().map_err(|e| e.to_string())?;
    println!("{}", enhanced);
    Ok(())
}

fn run_key(settings: &Settings, action: KeyAction) -> Result<(), String> {
    let mut store = FileCredentialStore::new(settings.credential_path());
    match action {
        KeyAction::Set { key } => {
            if key.trim().is_empty() {
                return Err("key must not be empty".to_owned());
            }
            store.save(key.trim()).map_err(|e| e.to_string())?;
            println!("Key saved to {}", store.path().display());
        }
        KeyAction::Clear => {
            store.clear().map_err(|e| e.to_string())?;
            println!("Key removed");
        }
        KeyAction::Show => match store.load().map_err(|e| e.to_string())? {
            Some(key) => println!("Personal key stored: {}", mask_key(&key)),
            None => println!("No personal key stored"),
        },
    }
    Ok(())
}

fn mask_key(key: &str) -> String {
    let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{}", tail)
}
