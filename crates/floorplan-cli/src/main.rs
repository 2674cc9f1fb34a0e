use std::collections::HashMap;
use std::error::Error;

use floorplan_ai::{
    AnalysisOutcome, EditOutcome, GatewayConfig, ImageAttachment, analyze_images,
    apply_instruction,
};
use floorplan_scene::{Scene, SceneStore, validate_scene};

type DynError = Box<dyn Error>;
type Flags = HashMap<String, Vec<String>>;

#[tokio::main]
async fn main() -> Result<(), DynError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        print_usage();
        return Ok(());
    }

    match args[0].as_str() {
        "analyze" => run_analyze(&args[1..]).await,
        "edit" => run_edit(&args[1..]).await,
        "validate" => run_validate(&args[1..]),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

async fn run_analyze(args: &[String]) -> Result<(), DynError> {
    let flags = parse_flags(args)?;
    let image_paths = repeated_str(&flags, "--image");
    if image_paths.is_empty() {
        return Err("at least one --image is required".into());
    }

    let reads = image_paths.iter().map(tokio::fs::read);
    let files = futures::future::try_join_all(reads).await?;
    let images = files
        .iter()
        .map(|bytes| ImageAttachment::from_bytes(bytes))
        .collect::<Vec<_>>();

    let provider = GatewayConfig::from_env()?.into_provider();
    match analyze_images(&provider, &images).await? {
        AnalysisOutcome::Scene { scene, reply } => {
            println!("{reply}");
            emit_scene(&scene, &flags)?;
        }
        AnalysisOutcome::Message(reply) => println!("{reply}"),
    }
    Ok(())
}

async fn run_edit(args: &[String]) -> Result<(), DynError> {
    let flags = parse_flags(args)?;
    let scene_path = required_str(&flags, "--scene")?;
    let instruction = required_str(&flags, "--instruction")?;
    let scene = SceneStore::new(scene_path).load()?;

    let provider = GatewayConfig::from_env()?.into_provider();
    match apply_instruction(&provider, &scene, &[], instruction).await? {
        EditOutcome::Replaced { scene, reply } => {
            println!("{reply}");
            emit_scene(&scene, &flags)?;
        }
        EditOutcome::Message(reply) => println!("{reply}"),
    }
    Ok(())
}

fn run_validate(args: &[String]) -> Result<(), DynError> {
    let flags = parse_flags(args)?;
    let scene_path = required_str(&flags, "--scene")?;
    let scene = SceneStore::new(scene_path).load()?;
    let validation = validate_scene(&scene);

    println!("items {}", scene.len());
    if validation.is_valid() {
        println!("valid true");
        return Ok(());
    }

    println!("valid false");
    for violation in &validation.errors {
        eprintln!("{violation}");
    }
    Err("scene violates layout constraints".into())
}

fn emit_scene(scene: &Scene, flags: &Flags) -> Result<(), DynError> {
    println!("{}", serde_json::to_string_pretty(scene)?);
    if let Some(path) = optional_str(flags, "--save")? {
        SceneStore::new(path).save(scene)?;
    }
    Ok(())
}

fn parse_flags(args: &[String]) -> Result<Flags, DynError> {
    if !args.len().is_multiple_of(2) {
        return Err("expected flag-value pairs".into());
    }

    let mut flags: Flags = HashMap::new();
    let mut index = 0;
    while index < args.len() {
        let flag = args[index].as_str();
        if !flag.starts_with("--") {
            return Err(format!("expected flag at position {}", index + 1).into());
        }
        flags
            .entry(flag.to_string())
            .or_default()
            .push(args[index + 1].clone());
        index += 2;
    }
    Ok(flags)
}

fn required_str<'a>(flags: &'a Flags, key: &str) -> Result<&'a str, DynError> {
    match flags.get(key).map(Vec::as_slice) {
        Some([value]) => Ok(value.as_str()),
        Some(_) => Err(format!("{key} may only be given once").into()),
        None => Err(format!("missing required {key}").into()),
    }
}

fn optional_str<'a>(flags: &'a Flags, key: &str) -> Result<Option<&'a str>, DynError> {
    match flags.get(key).map(Vec::as_slice) {
        Some([value]) => Ok(Some(value.as_str())),
        Some(_) => Err(format!("{key} may only be given once").into()),
        None => Ok(None),
    }
}

fn repeated_str<'a>(flags: &'a Flags, key: &str) -> Vec<&'a str> {
    flags
        .get(key)
        .map(|values| values.iter().map(String::as_str).collect())
        .unwrap_or_default()
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  floorplan-cli analyze --image <path> [--image <path> ...] [--save <path>]");
    eprintln!("  floorplan-cli edit --scene <path> --instruction <text> [--save <path>]");
    eprintln!("  floorplan-cli validate --scene <path>");
}
