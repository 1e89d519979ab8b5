use std::path::PathBuf;
use std::process;

use anyhow::Result;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use parking_watch::config::{load_config, Config};
use parking_watch::frame::{render_frame, save_frame};
use parking_watch::models::{
    CameraLocation, Dataset, DetectionEvent, DetectionStatus, Priority, SUMMARY_DAYS,
};
use parking_watch::services::alerts::{self, DEFAULT_RECENT_LIMIT};
use parking_watch::services::export::{default_export_path, CsvExporter};
use parking_watch::services::statistics;
use parking_watch::services::{DetectionFilter, DetectionGenerator};
use parking_watch::Error;

#[derive(Parser)]
#[command(name = "parking-watch")]
#[command(about = "Illegal parking attendant detection dashboard (synthetic data)", long_about = None)]
struct Cli {
    /// Path to a TOML or JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// RNG seed, overrides generator.seed from the config
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Reference time "YYYY-MM-DD HH:MM:SS" (default: local wall clock)
    #[arg(long, global = true)]
    now: Option<String>,

    /// Output in JSON format (default is text)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Headline numbers, camera status and system metrics
    Overview,

    /// Active alerts by priority, plus the last 24 hours
    Alerts {
        /// Maximum entries in the recent history
        #[arg(short, long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },

    /// Violation statistics over a date range
    Stats {
        /// Start date (inclusive, default: six days ago)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// End date (inclusive, default: today)
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Filtered detection history for one day
    History {
        #[command(flatten)]
        filter: FilterArgs,

        /// Show the full record of the n-th listed detection (from 0)
        #[arg(long)]
        detail: Option<usize>,

        /// Save a frame of the selected detection's camera as PNG
        #[arg(long, requires = "detail")]
        frame: Option<PathBuf>,
    },

    /// Export the filtered detection history as CSV
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output file (default: <export.output_dir>/detections_<date>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a mock CCTV frame to PNG
    Frame {
        /// Camera: cam1..cam4, variant name or full label
        #[arg(short, long)]
        location: CameraLocation,

        /// Draw a detected attendant with bounding box
        #[arg(long)]
        violation: bool,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Day to show (default: today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Status filter, repeatable (active, completed)
    #[arg(long = "status")]
    statuses: Vec<DetectionStatus>,

    /// Location filter, repeatable
    #[arg(long = "location")]
    locations: Vec<CameraLocation>,

    /// Priority filter, repeatable (high, medium, low)
    #[arg(long = "priority")]
    priorities: Vec<Priority>,

    /// Minimum confidence (default from config)
    #[arg(long)]
    min_confidence: Option<f64>,

    /// Minimum duration in minutes (default from config)
    #[arg(long)]
    min_duration: Option<u32>,

    /// Maximum duration in minutes (default from config)
    #[arg(long)]
    max_duration: Option<u32>,
}

impl FilterArgs {
    fn into_filter(self, config: &Config, today: NaiveDate) -> DetectionFilter {
        let defaults = DetectionFilter::from_config(&config.filter);
        DetectionFilter {
            date: Some(self.date.unwrap_or(today)),
            statuses: self.statuses,
            locations: self.locations,
            priorities: self.priorities,
            min_confidence: self.min_confidence.or(defaults.min_confidence),
            min_duration: self.min_duration.or(defaults.min_duration),
            max_duration: self.max_duration.or(defaults.max_duration),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn parse_now(now: Option<&str>) -> Result<NaiveDateTime> {
    match now {
        Some(s) => NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M:%S"))
            .map_err(|e| {
                anyhow::Error::from(Error::InvalidInput(format!("Invalid --now '{}': {}", s, e)))
            }),
        None => Ok(Local::now().naive_local()),
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    if cli.seed.is_some() {
        config.generator.seed = cli.seed;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.log_level.as_str()),
    )
    .init();

    let now = parse_now(cli.now.as_deref())?;
    let dataset = DetectionGenerator::from_config(&config.generator).generate(now);

    match cli.command.unwrap_or(Commands::Overview) {
        Commands::Overview => run_overview(&dataset, &config, cli.json),
        Commands::Alerts { limit } => run_alerts(&dataset, now, limit, cli.json),
        Commands::Stats { from, to } => {
            let to = to.unwrap_or(dataset.today());
            let from = from.unwrap_or(to - Duration::days(SUMMARY_DAYS - 1));
            if from > to {
                return Err(Error::InvalidInput(format!(
                    "--from {} is after --to {}",
                    from, to
                ))
                .into());
            }
            run_stats(&dataset, from, to, cli.json)
        }
        Commands::History {
            filter,
            detail: None,
            ..
        } => {
            let filter = filter.into_filter(&config, dataset.today());
            run_history(&dataset, &filter, cli.json)
        }
        Commands::History {
            filter,
            detail: Some(index),
            frame,
        } => {
            let filter = filter.into_filter(&config, dataset.today());
            run_detail(&dataset, &filter, index, frame, &config, cli.json)
        }
        Commands::Export { filter, output } => {
            let filter = filter.into_filter(&config, dataset.today());
            let date = filter.date.unwrap_or(dataset.today());
            let path = output.unwrap_or_else(|| default_export_path(&config.export, date));
            let events = filter.apply(&dataset.events);
            let rows = CsvExporter::from_config(&config.export)?
                .write_file(&path, events.iter().copied())?;
            if cli.json {
                let result = serde_json::json!({
                    "success": true,
                    "path": path.display().to_string(),
                    "rows": rows,
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("EXPORTED {} detections to {}", rows, path.display());
            }
            Ok(())
        }
        Commands::Frame {
            location,
            violation,
            output,
        } => {
            let mut rng = frame_rng(&config);
            let frame = render_frame(location, violation, now, &mut rng, &config.frame);
            save_frame(&frame.image, &output)?;
            info!("Saved frame for {} to {:?}", location.short_id(), output);

            if cli.json {
                let result = serde_json::json!({
                    "path": output.display().to_string(),
                    "caption": frame.caption,
                    "detection": frame.detection,
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("SAVED {} ({})", output.display(), frame.caption);
                if let Some(d) = frame.detection {
                    println!(
                        "  Attendant detected: {:.2} at ({}, {}) - ({}, {})",
                        d.confidence, d.bbox.0, d.bbox.1, d.bbox.2, d.bbox.3
                    );
                }
            }
            Ok(())
        }
    }
}

// frames draw from their own stream so a seed reproduces both
fn frame_rng(config: &Config) -> StdRng {
    match config.generator.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    }
}

fn run_overview(dataset: &Dataset, config: &Config, json_output: bool) -> Result<()> {
    let overview = alerts::overview(dataset, &config.cameras);
    let cameras = alerts::camera_status(dataset);

    if json_output {
        let cameras: Vec<_> = cameras
            .iter()
            .map(|(loc, status)| {
                serde_json::json!({
                    "location": loc.label(),
                    "enabled": config.cameras.enabled.contains(loc),
                    "status": status,
                })
            })
            .collect();
        let result = serde_json::json!({
            "generated_at": dataset.generated_at,
            "overview": overview,
            "cameras": cameras,
            "metrics": dataset.metrics,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", dataset.generated_at.format("%A, %d %B %Y  %H:%M:%S"));
    println!("OVERVIEW:");
    println!(
        "  Detections today:  {} ({:+} vs yesterday)",
        overview.today_detections, overview.delta
    );
    println!("  Active now:        {}", overview.active_detections);
    println!(
        "  Cameras enabled:   {}/{}",
        overview.enabled_cameras, overview.total_cameras
    );
    println!("  Average duration:  {:.1} min", overview.average_duration);
    println!("CAMERAS:");
    for (loc, status) in &cameras {
        let enabled = if config.cameras.enabled.contains(loc) {
            ""
        } else {
            " (disabled)"
        };
        println!("  {:<34} {}{}", loc.label(), status, enabled);
    }
    println!("SYSTEM:");
    println!("  FPS:       {:.1}", dataset.metrics.fps);
    println!("  Latency:   {:.0} ms", dataset.metrics.latency_ms);
    println!("  GPU usage: {:.0}%", dataset.metrics.gpu_usage);
    Ok(())
}

fn run_alerts(dataset: &Dataset, now: NaiveDateTime, limit: usize, json_output: bool) -> Result<()> {
    let active = alerts::active_alerts(dataset);
    let recent = alerts::recent_alerts(dataset, now, limit);

    if json_output {
        let result = serde_json::json!({
            "active": active,
            "recent": recent,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if active.is_empty() {
        println!("No active violations.");
    } else {
        println!("# {} active violations\n", active.len());
        for e in &active {
            print_alert(e);
        }
    }
    println!("\n# Last {} hours (newest first)\n", alerts::RECENT_ALERT_HOURS);
    for e in &recent {
        print_alert(e);
    }
    Ok(())
}

fn run_stats(dataset: &Dataset, from: NaiveDate, to: NaiveDate, json_output: bool) -> Result<()> {
    let range = statistics::range_statistics(dataset, from, to);
    let peak = statistics::peak_hour(&dataset.hourly_stats);
    let period = statistics::busiest_period(&dataset.hourly_stats);
    let histogram = statistics::duration_histogram(&dataset.events);

    if json_output {
        let daily: Vec<_> = dataset.daily_summary.range(from..=to).map(|(_, d)| d).collect();
        let histogram: Vec<_> = histogram
            .iter()
            .map(|(bucket, count)| serde_json::json!({"bucket": bucket.label(), "count": count}))
            .collect();
        let locations: Vec<_> = dataset
            .location_summary
            .iter()
            .map(|(loc, s)| serde_json::json!({"location": loc.label(), "summary": s}))
            .collect();
        let result = serde_json::json!({
            "range": range,
            "daily": daily,
            "hourly": dataset.hourly_stats,
            "peak_hour": peak,
            "busiest_period": period,
            "locations": locations,
            "duration_histogram": histogram,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("STATS {} to {}:", from, to);
    println!("  Total violations:  {}", range.total_violations);
    println!("  Average duration:  {:.1} min", range.average_duration);
    match &range.busiest_day {
        Some(day) => println!(
            "  Busiest day:       {} ({})",
            day.date.format("%d/%m/%Y"),
            day.total
        ),
        None => println!("  Busiest day:       -"),
    }
    println!("DAILY:");
    for (date, day) in dataset.daily_summary.range(from..=to) {
        println!(
            "  {} | total: {:>3} | avg: {:>5.1} min",
            date.format("%d/%m"),
            day.total,
            day.average_duration
        );
    }
    if let Some(peak) = peak {
        println!(
            "PEAK HOUR: {}:00 - {}:00 with {} violations",
            peak.hour,
            (peak.hour + 1) % 24,
            peak.count
        );
    }
    println!("BUSIEST PERIOD: {}", period);
    println!("LOCATIONS:");
    for (loc, s) in &dataset.location_summary {
        println!(
            "  {:<34} total: {:>3} | active: {:>2} | avg: {:>5.1} min",
            loc.label(),
            s.total,
            s.active,
            s.average_duration
        );
    }
    println!("DURATIONS:");
    for (bucket, count) in &histogram {
        println!("  {:>6} min: {}", bucket.label(), count);
    }
    Ok(())
}

fn run_history(dataset: &Dataset, filter: &DetectionFilter, json_output: bool) -> Result<()> {
    let date = filter.date.unwrap_or(dataset.today());
    let events = filter.apply(&dataset.events);
    let day_total = dataset.events_on(date).count();

    if json_output {
        let result = serde_json::json!({
            "date": date,
            "count": events.len(),
            "day_total": day_total,
            "detections": events,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "# Showing {} of {} detections on {}\n",
        events.len(),
        day_total,
        date.format("%d/%m/%Y")
    );
    for (i, e) in events.iter().enumerate() {
        println!(
            "  #{:<3} {} | {:<34} | {:.2} | {:>2} min | {:<9} | {:<6} | {}",
            i,
            e.timestamp.format("%H:%M:%S"),
            e.location.label(),
            e.confidence,
            e.duration_minutes,
            e.status,
            e.priority,
            if e.notification_sent { "sent" } else { "pending" }
        );
    }
    Ok(())
}

fn run_detail(
    dataset: &Dataset,
    filter: &DetectionFilter,
    index: usize,
    frame_path: Option<PathBuf>,
    config: &Config,
    json_output: bool,
) -> Result<()> {
    let event = filter.select(&dataset.events, index)?;

    let frame = match frame_path {
        Some(path) => {
            let mut rng = frame_rng(config);
            let frame = render_frame(event.location, true, event.timestamp, &mut rng, &config.frame);
            save_frame(&frame.image, &path)?;
            info!("Saved detection #{} frame to {:?}", index, path);
            Some((path, frame))
        }
        None => None,
    };

    if json_output {
        let frame = frame.as_ref().map(|(path, f)| {
            serde_json::json!({
                "path": path.display().to_string(),
                "caption": f.caption,
                "detection": f.detection,
            })
        });
        let result = serde_json::json!({
            "index": index,
            "detection": event,
            "frame": frame,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("# Detection #{}\n", index);
    println!("  Time:         {}", event.timestamp.format("%d/%m/%Y %H:%M:%S"));
    println!("  Location:     {}", event.location.label());
    println!("  Confidence:   {:.2}", event.confidence);
    println!("  Duration:     {} min", event.duration_minutes);
    println!("  Status:       {}", event.status);
    println!("  Priority:     {}", event.priority);
    println!(
        "  Notification: {}",
        if event.notification_sent { "sent" } else { "pending" }
    );
    if let Some((path, f)) = &frame {
        println!("  Frame:        {} ({})", path.display(), f.caption);
    }
    Ok(())
}

fn print_alert(e: &DetectionEvent) {
    let notification = if e.notification_sent {
        "sent"
    } else {
        "pending"
    };
    println!(
        "[{}] {} attendant detected at {} | confidence {:.2} | {} min | notification {}",
        e.priority,
        e.timestamp.format("%H:%M:%S"),
        e.location.label(),
        e.confidence,
        e.duration_minutes,
        notification
    );
}
