// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use std::time::Duration;

use armature::core::nalgebra::Point2;
use clap::Parser;

#[derive(Parser)]
#[command(author = "Copyright (C) 2024 Laixer Equipment B.V.")]
#[command(version, propagate_version = true)]
#[command(about = "Planar arm tracking daemon", long_about = None)]
struct Args {
    /// Configuration file.
    #[arg(short = 'c', long = "config", alias = "conf", value_name = "FILE")]
    config: Option<std::path::PathBuf>,
    /// Initial target as X,Y.
    #[arg(
        long,
        value_name = "X,Y",
        value_parser = armature::input::parse_point,
        allow_hyphen_values = true
    )]
    target: Option<Point2<f32>>,
    /// Initial step factor.
    #[arg(long, value_name = "STEP")]
    speed: Option<f32>,
    /// Tick interval in milliseconds.
    #[arg(long, value_name = "MS")]
    interval: Option<u64>,
    /// Stop after this many ticks.
    #[arg(long)]
    ticks: Option<u64>,
    /// Do not read commands from standard input.
    #[arg(long)]
    no_input: bool,
    /// Write every frame as a JSON line to standard output.
    #[arg(long)]
    json: bool,
    /// Quiet output (no logging).
    #[arg(long)]
    quiet: bool,
    /// Log for a service manager: no colors or timestamps. Does not fork.
    #[arg(short = 'D', long)]
    daemon: bool,
    /// Log to systemd journal.
    #[arg(long)]
    systemd: bool,
    /// Level of verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    use log::LevelFilter;

    let args = Args::parse();

    let mut config: armature::Config = match &args.config {
        Some(path) => armature::from_file(path)?,
        None => armature::Config::default(),
    };

    if let Some(target) = args.target {
        config.motion.target = [target.x, target.y];
    }
    if let Some(speed) = args.speed {
        config.motion.step_factor = speed;
    }
    if let Some(interval) = args.interval {
        config.runtime.interval = interval;
    }
    if let Some(ticks) = args.ticks {
        config.runtime.ticks = ticks;
    }

    let log_level = if args.daemon {
        LevelFilter::Info
    } else if args.quiet {
        LevelFilter::Off
    } else {
        match args.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    if args.systemd {
        armature::logger::SystemdLogger::init(log_level)?;
    } else {
        let mut log_config = simplelog::ConfigBuilder::new();
        if args.daemon {
            log_config.set_time_level(LevelFilter::Off);
            log_config.set_thread_level(LevelFilter::Off);
        }

        log_config.set_target_level(LevelFilter::Off);
        log_config.set_location_level(LevelFilter::Off);
        log_config.add_filter_ignore_str("mio");

        let color_choice = if args.daemon {
            simplelog::ColorChoice::Never
        } else {
            simplelog::ColorChoice::Auto
        };

        // Frames own standard output in JSON mode.
        let terminal_mode = if args.json {
            simplelog::TerminalMode::Stderr
        } else {
            simplelog::TerminalMode::Mixed
        };

        simplelog::TermLogger::init(log_level, log_config.build(), terminal_mode, color_choice)?;
    }

    if args.daemon {
        log::debug!("Running service as daemon");
    }

    log::trace!("{:#?}", config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(run(config, args.json, !args.no_input));

    // Reading standard input blocks a worker that cannot be cancelled.
    runtime.shutdown_timeout(Duration::from_millis(100));

    result
}

async fn run(config: armature::Config, json: bool, input: bool) -> anyhow::Result<()> {
    let simulation = armature::Simulation::from_config(&config)?;

    log::info!("Armature runtime {}", armature::consts::VERSION);
    log::info!(
        "Arm with {} links, reach {:.2}",
        simulation.chain().len(),
        simulation.chain().max_reach()
    );
    log::debug!("{:?}", simulation);

    let runtime = armature::runtime::Runtime::new(simulation).with_shutdown();

    if input {
        log::debug!("Reading commands from standard input");

        let reader = tokio::io::BufReader::new(tokio::io::stdin());
        runtime.spawn_background_task(armature::input::read_commands(
            reader,
            runtime.simulation(),
            runtime.shutdown_sender(),
        ));
    }

    let mut converged = None;

    let ticks = runtime
        .run_interval(config.interval(), config.tick_limit(), |frame| {
            if json {
                match serde_json::to_string(frame) {
                    Ok(line) => println!("{}", line),
                    Err(e) => log::error!("Failed to serialize frame: {}", e),
                }
            } else {
                log::debug!("{}", frame);
            }

            let report_converged = frame.report.map(|report| report.converged);
            if report_converged != converged {
                match report_converged {
                    Some(true) => log::info!("Target reached: {}", frame),
                    Some(false) => log::info!("Tracking target: {}", frame),
                    None => {}
                }
                converged = report_converged;
            }
        })
        .await;

    let simulation = runtime.simulation();
    log::info!("{}", simulation.read().await.frame());
    log::info!("Stopped after {} ticks", ticks);

    Ok(())
}
