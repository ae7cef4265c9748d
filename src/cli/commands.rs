//! Command implementations

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::app::{AppContainer, EditOutcome, ReportFormat};
use crate::cli::args::*;
use crate::cli::Commands;
use crate::domain::model::{EditRequest, MergeMode, RenderTarget};
use crate::utils::time::format_clock;

/// Dispatch one parsed command
pub async fn execute(command: Commands, container: &dyn AppContainer) -> Result<()> {
    match command {
        Commands::Cut(args) => cut(args, container).await,
        Commands::Merge(args) => merge(args, container).await,
        Commands::Speed(args) => speed(args, container).await,
        Commands::AddAudio(args) => add_audio(args, container).await,
        Commands::Probe(args) => probe(args, container).await,
        Commands::Thumbnail(args) => thumbnail(args, container).await,
        Commands::Waveform(args) => waveform(args, container).await,
        Commands::Verify(args) => verify(args, container).await,
    }
}

/// Execute the cut command
pub async fn cut(args: CutArgs, container: &dyn AppContainer) -> Result<()> {
    let request = EditRequest::Cut {
        path: args.input,
        start: args.start,
        end: args.end,
    };
    run_edit(request, args.output.target(), container).await
}

/// Execute the merge command
pub async fn merge(args: MergeArgs, container: &dyn AppContainer) -> Result<()> {
    let mode = MergeMode::parse(&args.mode)?;
    let request = EditRequest::Merge {
        base_path: args.base,
        insert_path: args.insert,
        insertion_point: args.at,
        mode,
    };
    run_edit(request, args.output.target(), container).await
}

/// Execute the speed command
pub async fn speed(args: SpeedArgs, container: &dyn AppContainer) -> Result<()> {
    let request = EditRequest::SpeedChange {
        path: args.input,
        start: args.start,
        end: args.end,
        factor: args.factor,
    };
    run_edit(request, args.output.target(), container).await
}

/// Execute the add-audio command
pub async fn add_audio(args: AddAudioArgs, container: &dyn AppContainer) -> Result<()> {
    let placement = args.placement();
    let target = args.output.target();
    let request = EditRequest::AddAudio {
        video_path: args.video,
        audio_path: args.audio,
        volume: args.volume,
        placement,
        looped: args.looped,
    };
    run_edit(request, target, container).await
}

async fn run_edit(
    request: EditRequest,
    target: RenderTarget,
    container: &dyn AppContainer,
) -> Result<()> {
    let feature = request.feature();
    let outcome = container
        .edit_interactor()
        .run(request, target)
        .await
        .with_context(|| format!("{} failed", feature))?;

    report_outcome(&outcome, container);
    Ok(())
}

/// Print the output path. A preview outlives this process, so it is
/// detached from the registry before the shutdown purge.
fn report_outcome(outcome: &EditOutcome, container: &dyn AppContainer) {
    if outcome.ephemeral {
        container.registry().detach(&outcome.output_path);
        info!("Preview ready ({})", format_clock(outcome.expected_duration));
    } else {
        info!("Export complete ({})", format_clock(outcome.expected_duration));
    }
    println!("{}", outcome.output_path.display());
}

/// Execute the probe command
pub async fn probe(args: ProbeArgs, container: &dyn AppContainer) -> Result<()> {
    let format = ReportFormat::parse(&args.format)?;
    let report = container
        .inspect_interactor()
        .inspect(&args.input)
        .await
        .with_context(|| format!("Failed to inspect {}", args.input.display()))?;

    print!("{}", report.render(format)?);
    if format != ReportFormat::Text {
        println!();
    }
    Ok(())
}

/// Execute the thumbnail command
pub async fn thumbnail(args: ThumbnailArgs, container: &dyn AppContainer) -> Result<()> {
    let path = container
        .inspect_interactor()
        .thumbnail(&args.input)
        .await
        .with_context(|| format!("Failed to render thumbnail for {}", args.input.display()))?;

    container.registry().detach(&path);
    println!("{}", path.display());
    Ok(())
}

/// Execute the waveform command
pub async fn waveform(args: WaveformArgs, container: &dyn AppContainer) -> Result<()> {
    let levels = container
        .inspect_interactor()
        .waveform(&args.input, args.samples)
        .await
        .with_context(|| format!("Failed to extract waveform from {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string(&levels)?);
    } else {
        let line: Vec<String> = levels.iter().map(|l| format!("{:.3}", l)).collect();
        println!("{}", line.join(" "));
    }
    Ok(())
}

/// Execute the verify command
pub async fn verify(args: VerifyArgs, container: &dyn AppContainer) -> Result<()> {
    let report = container
        .verify_interactor()
        .verify(&args.input, args.expected, args.tolerance)
        .await
        .with_context(|| format!("Failed to verify {}", args.input.display()))?;

    println!(
        "{}: expected {:.3}s, actual {:.3}s, drift {:+.3}s",
        report.path.display(),
        report.expected,
        report.actual,
        report.drift
    );

    if !report.within_tolerance {
        warn!("Drift exceeds tolerance of {:.3}s", report.tolerance);
        anyhow::bail!(
            "Duration of {} is outside the {:.3}s tolerance",
            report.path.display(),
            report.tolerance
        );
    }
    Ok(())
}
