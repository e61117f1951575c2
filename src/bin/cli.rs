use anyhow::{anyhow, bail, Context, Result};
use endostudio::config::StudioConfig;
use endostudio::platform::{Host, NativeHost};
use endostudio::save_location::SaveLocation;
use endostudio::session::default_session_name;
use endostudio::studio::Studio;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const USAGE: &str = "Usage: endostudio-cli [--config <path>] <command> [args]

Commands:
  devices [--json]                        List cameras and microphones
  photo [--camera <id>] [--session <name>] [--location <loc>]
                                          Take one photo
  record [--camera <id>] [--session <name>] [--location <loc>] [--seconds <n>] [--mute]
                                          Record until Ctrl-C or for n seconds
  location [<files|downloads|camera-roll>]
                                          Show or set the save location
  session-name                            Print the default session name";

struct Options {
    config: Option<String>,
    command: String,
    camera: Option<String>,
    session: Option<String>,
    location: Option<SaveLocation>,
    seconds: Option<u64>,
    mute: bool,
    json: bool,
    positional: Vec<String>,
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options {
        config: None,
        command: String::new(),
        camera: None,
        session: None,
        location: None,
        seconds: None,
        mute: false,
        json: false,
        positional: Vec::new(),
    };

    let mut i = 1;
    while i < args.len() {
        let value = |i: usize| {
            args.get(i + 1)
                .cloned()
                .ok_or_else(|| anyhow!("{} needs a value", args[i]))
        };
        match args[i].as_str() {
            "--config" => {
                options.config = Some(value(i)?);
                i += 1;
            }
            "--camera" => {
                options.camera = Some(value(i)?);
                i += 1;
            }
            "--session" => {
                options.session = Some(value(i)?);
                i += 1;
            }
            "--location" => {
                options.location = Some(value(i)?.parse()?);
                i += 1;
            }
            "--seconds" => {
                options.seconds = Some(value(i)?.parse().context("--seconds must be a number")?);
                i += 1;
            }
            "--mute" => options.mute = true,
            "--json" => options.json = true,
            other if options.command.is_empty() => options.command = other.to_string(),
            other => options.positional.push(other.to_string()),
        }
        i += 1;
    }

    if options.command.is_empty() {
        bail!("{}", USAGE);
    }
    Ok(options)
}

fn load_config(path: Option<&str>) -> Result<StudioConfig> {
    let config = match path {
        Some(path) => StudioConfig::load_layered(path)?,
        None => StudioConfig::load_layered(StudioConfig::default_path())?,
    };
    config.validate().map_err(|e| anyhow!(e))?;
    Ok(config)
}

/// Studio on the native host with devices enumerated and the requested camera open
async fn open_studio(config: StudioConfig, options: &Options) -> Result<Studio> {
    let host: Arc<dyn Host> = Arc::new(NativeHost::from_config(&config)?);
    let mut studio = Studio::new(host, config)?;

    if let Some(name) = &options.session {
        studio.rename_session(name).await?;
    }
    if let Some(location) = options.location {
        studio.set_save_location(location)?;
    }
    if options.mute && studio.record_audio() {
        studio.toggle_mute().await?;
    }

    studio.refresh_devices().await?;
    if let Some(camera) = &options.camera {
        studio.select_camera(camera).await?;
    }
    if !studio.is_streaming() {
        bail!("No USB camera found - pass --camera <id> (see `endostudio-cli devices`)");
    }
    Ok(studio)
}

async fn cmd_devices(config: StudioConfig, json: bool) -> Result<()> {
    let host = NativeHost::from_config(&config)?;
    let media = host.media();
    let devices = tokio::task::spawn_blocking(move || endostudio::devices::list_devices(media.as_ref()))
        .await??;

    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
        return Ok(());
    }

    let selection = endostudio::devices::DeviceSelection::pick_default(
        &devices,
        &config.capture.preferred_label,
    );
    for device in &devices {
        let marker = if Some(&device.id) == selection.camera.as_ref()
            || Some(&device.id) == selection.microphone.as_ref()
        {
            "*"
        } else {
            " "
        };
        println!("{} {:?} {}: {}", marker, device.kind, device.id, device.label);
    }
    Ok(())
}

async fn cmd_photo(config: StudioConfig, options: &Options) -> Result<()> {
    let mut studio = open_studio(config, options).await?;
    let saved = studio.take_photo().await?;
    println!("Image saved to {} ({} bytes)", saved.path, saved.bytes);
    studio.stop_camera()?;
    Ok(())
}

async fn cmd_record(config: StudioConfig, options: &Options) -> Result<()> {
    let mut studio = open_studio(config, options).await?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("Failed to install Ctrl-C handler")?;

    studio.start_recording().await?;
    println!("Recording started - press Ctrl-C to stop");

    let started = Instant::now();
    let limit = options.seconds.map(Duration::from_secs);
    while !interrupted.load(Ordering::SeqCst) {
        if limit.is_some_and(|limit| started.elapsed() >= limit) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    let elapsed = studio.recording_status().elapsed;
    match studio.stop_recording().await? {
        Some(saved) => println!("Recording saved to {} ({}, {} bytes)", saved.path, elapsed, saved.bytes),
        None => println!("No recording data to save"),
    }
    studio.stop_camera()?;
    Ok(())
}

fn cmd_location(config: StudioConfig, positional: &[String]) -> Result<()> {
    let host = NativeHost::from_config(&config)?;
    let resolver = endostudio::save_location::SaveLocationResolver::new(
        host.preferences(),
        host.default_save_location(),
    );

    if let Some(value) = positional.first() {
        resolver.set(value.parse()?)?;
    }
    println!("{}", resolver.resolve());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    endostudio::init_logging();

    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args)?;
    let config = load_config(options.config.as_deref())?;

    match options.command.as_str() {
        "devices" => cmd_devices(config, options.json).await,
        "photo" => cmd_photo(config, &options).await,
        "record" => cmd_record(config, &options).await,
        "location" => cmd_location(config, &options.positional),
        "session-name" => {
            println!(
                "{}",
                default_session_name(&config.session.product_name, &chrono::Local::now())
            );
            Ok(())
        }
        other => bail!("Unknown command: {}\n\n{}", other, USAGE),
    }
}
