//! Play a file through a chain until it ends or Ctrl+C.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Args;
use podstudio_config::StudioConfig;
use podstudio_engine::{PlaybackEvent, Status};

use super::chain::{ChainArgs, build};

/// Status poll interval.
const POLL: Duration = Duration::from_millis(50);

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    chain: ChainArgs,
}

pub fn run(args: PlayArgs, config: &StudioConfig) -> anyhow::Result<()> {
    let mut studio = build(&args.chain, config)?;
    let events = studio.events();

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })?;

    studio.play()?;
    if let Ok(PlaybackEvent::Started { stages }) = events.try_recv() {
        let chain: Vec<String> = stages.iter().map(ToString::to_string).collect();
        println!("{}", chain.join(" -> "));
    }
    println!("Playing... Press Ctrl+C to stop.");

    let mut stop_sent = false;
    while studio.status() == Status::Running {
        if interrupted.load(Ordering::SeqCst) && !stop_sent {
            println!("\nStopping...");
            studio.stop();
            stop_sent = true;
        }
        std::thread::sleep(POLL);
    }

    let status = studio.status();
    let failure = events.try_iter().find_map(|event| match event {
        PlaybackEvent::Failed(msg) => Some(msg),
        _ => None,
    });
    studio.dispose();

    match (status, failure) {
        (Status::Failed, Some(msg)) => anyhow::bail!("playback failed: {msg}"),
        (Status::Failed, None) => anyhow::bail!("playback failed"),
        (status, _) => {
            println!("Playback {status}.");
            Ok(())
        }
    }
}
