//! Filter-graph compiler
//!
//! Turns an `EditPlan` into the ordered stages the executor runs. Sequence
//! plans render every segment to its own intermediate and then stream-copy
//! (one part) or concatenate (several parts) into the output. Audio-track
//! plans compile to a single complex-filter invocation that copies the video.

pub mod atempo;
pub mod command;
pub mod filters;

use std::path::{Path, PathBuf};

use tracing::debug;

pub use command::{EncoderInvocation, FfmpegCommand};

use crate::domain::model::*;
use crate::error::{ClipStudioError, ClipStudioResult};
use crate::output::naming::ArtifactNamer;
use crate::planner::audio::{AUDIO, VIDEO};
use crate::planner::{EditPlan, NormalizeTarget, PlanLayout};

/// A unit of work in a compiled plan
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Run the external encoder
    Encode(EncoderInvocation),
    /// Write a concat list for the demuxer
    WriteConcatList {
        label: String,
        path: PathBuf,
        contents: String,
    },
}

impl Stage {
    pub fn label(&self) -> &str {
        match self {
            Stage::Encode(invocation) => &invocation.label,
            Stage::WriteConcatList { label, .. } => label,
        }
    }

    /// File this stage creates
    pub fn output(&self) -> &Path {
        match self {
            Stage::Encode(invocation) => &invocation.output,
            Stage::WriteConcatList { path, .. } => path,
        }
    }
}

/// Stages in dependency order; the last one writes `output`
#[derive(Debug, Clone)]
pub struct CompiledPlan {
    pub stages: Vec<Stage>,
    pub output: PathBuf,
}

impl CompiledPlan {
    pub fn invocations(&self) -> impl Iterator<Item = &EncoderInvocation> {
        self.stages.iter().filter_map(|stage| match stage {
            Stage::Encode(invocation) => Some(invocation),
            Stage::WriteConcatList { .. } => None,
        })
    }

    /// Files created by every stage but the last
    pub fn intermediates(&self) -> Vec<&Path> {
        let count = self.stages.len().saturating_sub(1);
        self.stages[..count].iter().map(Stage::output).collect()
    }
}

pub struct FilterGraphCompiler<'a> {
    namer: &'a ArtifactNamer,
    profile: QualityProfile,
    threads: Option<usize>,
}

impl<'a> FilterGraphCompiler<'a> {
    pub fn new(namer: &'a ArtifactNamer, profile: QualityProfile) -> Self {
        Self {
            namer,
            profile,
            threads: None,
        }
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    pub fn compile(&self, plan: &EditPlan, output: &Path) -> ClipStudioResult<CompiledPlan> {
        let stages = match &plan.layout {
            PlanLayout::Sequence {
                segments,
                normalize,
            } => self.compile_sequence(plan, segments, normalize.as_ref(), output)?,
            PlanLayout::AudioTrack { segments } => {
                vec![self.compile_audio_track(plan, segments, output)?]
            }
        };

        debug!("Compiled {} stage(s) for {}", stages.len(), output.display());
        Ok(CompiledPlan {
            stages,
            output: output.to_path_buf(),
        })
    }

    fn compile_sequence(
        &self,
        plan: &EditPlan,
        segments: &[Segment],
        normalize: Option<&NormalizeTarget>,
        output: &Path,
    ) -> ClipStudioResult<Vec<Stage>> {
        if segments.is_empty() {
            return Err(ClipStudioError::Compile(
                "no segments left to render".to_string(),
            ));
        }

        let mut stages = Vec::with_capacity(segments.len() + 2);
        let mut parts = Vec::with_capacity(segments.len());
        for (index, segment) in segments.iter().enumerate() {
            let part = self.namer.intermediate(&format!("part{}", index), "mp4");
            stages.push(Stage::Encode(
                self.render_segment(plan, index, segment, normalize, &part)?,
            ));
            parts.push(part);
        }

        let (label, command) = match parts.as_slice() {
            [single] => ("finalize", FfmpegCommand::new(output).input(single).stream_copy()),
            _ => {
                let list = self.namer.intermediate("concat", "txt");
                stages.push(Stage::WriteConcatList {
                    label: "concat-list".to_string(),
                    path: list.clone(),
                    contents: filters::concat_list(&parts),
                });
                let command = FfmpegCommand::new(output)
                    .input_with(["-f", "concat", "-safe", "0"], &list)
                    .stream_copy()
                    .output_args(["-avoid_negative_ts", "make_zero"]);
                ("concat", command)
            }
        };

        stages.push(Stage::Encode(
            command
                .fast_start(self.profile.fast_start)
                .into_invocation(label, Some(plan.expected_duration)),
        ));
        Ok(stages)
    }

    fn render_segment(
        &self,
        plan: &EditPlan,
        index: usize,
        segment: &Segment,
        normalize: Option<&NormalizeTarget>,
        part: &Path,
    ) -> ClipStudioResult<EncoderInvocation> {
        let source = match segment.source {
            SourceRef::Asset(asset) => plan.asset(asset)?,
            SourceRef::Generated => {
                return Err(ClipStudioError::Compile(
                    "generated segments only belong in audio tracks".to_string(),
                ))
            }
        };
        let speed = match segment.role {
            SegmentRole::Transformed(Transform::Speed { factor }) => Some(factor),
            SegmentRole::PassThrough | SegmentRole::Inserted { .. } => None,
            SegmentRole::Transformed(Transform::Mix { .. }) | SegmentRole::Silence => {
                return Err(ClipStudioError::Compile(format!(
                    "segment {} cannot be rendered as a video part",
                    index
                )))
            }
        };
        let facts = &source.facts;
        let output_duration = segment.output_duration();

        let mut graph = Vec::with_capacity(2);
        if facts.has_video {
            let mut chain = Vec::new();
            if let Some(factor) = speed {
                chain.push(filters::video_speed(factor));
            }
            if let Some(target) = normalize {
                chain.push(filters::normalize_video(target));
            }
            graph.push(format!("[0:v]{}[v]", filters::chain(&chain, "null")));
        } else if let Some(target) = normalize {
            graph.push(format!("{}[v]", filters::black_video(target, output_duration)));
        }

        if facts.has_audio {
            let mut chain = Vec::new();
            if let Some(factor) = speed {
                chain.push(atempo::atempo_filter(factor));
            }
            if normalize.is_some() {
                chain.push(filters::canonical_audio_format());
            }
            graph.push(format!("[0:a]{}[a]", filters::chain(&chain, "anull")));
        } else if normalize.is_some() {
            graph.push(format!("{}[a]", filters::silence(output_duration)));
        }

        let has_video = facts.has_video || normalize.is_some();
        let has_audio = facts.has_audio || normalize.is_some();
        if !has_video && !has_audio {
            return Err(ClipStudioError::Compile(format!(
                "{} has neither a video nor an audio stream",
                source.asset.path.display()
            )));
        }

        let mut command = FfmpegCommand::new(part)
            .input_range(
                &source.asset.path,
                segment.start_seconds,
                segment.duration_seconds,
            )
            .filter_complex(graph.join(";"));
        if has_video {
            command = command.map("[v]").video_profile(&self.profile);
            if let Some(target) = normalize {
                command = command.frame_rate(target.fps);
            }
        }
        if has_audio {
            command = command.map("[a]").audio_profile(&self.profile);
        }

        Ok(command
            .duration(output_duration)
            .threads(self.threads)
            .into_invocation(format!("segment-{}", index), Some(output_duration)))
    }

    fn compile_audio_track(
        &self,
        plan: &EditPlan,
        segments: &[Segment],
        output: &Path,
    ) -> ClipStudioResult<Stage> {
        if segments.is_empty() {
            return Err(ClipStudioError::Compile(
                "no audio segments to assemble".to_string(),
            ));
        }

        let mut uses = [0usize; 2];
        for segment in segments {
            for input in audio_inputs(segment)? {
                uses[input] += 1;
            }
        }

        let mut graph = Vec::new();
        let mut pads = InputPads::new(&uses, &mut graph);
        let format = filters::canonical_audio_format();

        for (index, segment) in segments.iter().enumerate() {
            let duration = segment.duration_seconds;
            let chain = match (segment.source, segment.role) {
                (_, SegmentRole::Silence) => {
                    format!("{},{}[s{}]", filters::silence(duration), format, index)
                }
                (SourceRef::Asset(input), SegmentRole::PassThrough) => format!(
                    "{}{},{}[s{}]",
                    pads.take(input),
                    filters::audio_trim(segment.start_seconds, duration),
                    format,
                    index
                ),
                (SourceRef::Asset(input), SegmentRole::Inserted { gain, looped }) => format!(
                    "{}{},{}[s{}]",
                    pads.take(input),
                    inserted_chain(gain, looped, duration),
                    format,
                    index
                ),
                (SourceRef::Asset(input), SegmentRole::Transformed(Transform::Mix { gain, looped })) => {
                    format!(
                        "{base}{trim},{fmt}[s{i}v];{ins}{chain},{fmt}[s{i}i];[s{i}v][s{i}i]{mix},{fmt}[s{i}]",
                        base = pads.take(input),
                        trim = filters::audio_trim(segment.start_seconds, duration),
                        ins = pads.take(AUDIO),
                        chain = inserted_chain(gain, looped, duration),
                        mix = filters::mix_two(),
                        fmt = format,
                        i = index
                    )
                }
                _ => {
                    return Err(ClipStudioError::Compile(format!(
                        "segment {} cannot be placed on an audio track",
                        index
                    )))
                }
            };
            pads.graph.push(chain);
        }

        let labels: String = (0..segments.len()).map(|i| format!("[s{}]", i)).collect();
        let join = if segments.len() == 1 {
            format!("{}anull[aout]", labels)
        } else {
            format!("{}concat=n={}:v=0:a=1[aout]", labels, segments.len())
        };
        graph.push(join);

        let video = plan.asset(VIDEO)?;
        let mut command = FfmpegCommand::new(output).input(&video.asset.path);
        if uses[AUDIO] > 0 {
            command = command.input(&plan.asset(AUDIO)?.asset.path);
        }

        let invocation = command
            .filter_complex(graph.join(";"))
            .map("0:v?")
            .map("[aout]")
            .output_args(["-c:v", "copy"])
            .audio_profile(&self.profile)
            .duration(plan.expected_duration)
            .threads(self.threads)
            .fast_start(self.profile.fast_start)
            .into_invocation("mix-audio", Some(plan.expected_duration));
        Ok(Stage::Encode(invocation))
    }
}

/// Inserted audio: gain, optional loop, trimmed to `duration`
fn inserted_chain(gain: f64, looped: bool, duration: f64) -> String {
    let mut chain = vec![filters::volume(gain)];
    if looped {
        chain.push(filters::audio_loop().to_string());
    }
    chain.push(filters::audio_trim(0.0, duration));
    chain.join(",")
}

/// Which input audio streams a segment reads
fn audio_inputs(segment: &Segment) -> ClipStudioResult<Vec<usize>> {
    match (segment.source, segment.role) {
        (_, SegmentRole::Silence) => Ok(Vec::new()),
        (SourceRef::Asset(input), SegmentRole::Transformed(Transform::Mix { .. })) => {
            Ok(vec![input, AUDIO])
        }
        (SourceRef::Asset(input), _) if input <= AUDIO => Ok(vec![input]),
        _ => Err(ClipStudioError::Compile(
            "audio track segment refers to an unknown input".to_string(),
        )),
    }
}

/// Hands out input pad labels, splitting streams that feed several chains
struct InputPads<'g> {
    graph: &'g mut Vec<String>,
    queues: [Vec<String>; 2],
}

impl<'g> InputPads<'g> {
    fn new(uses: &[usize; 2], graph: &'g mut Vec<String>) -> Self {
        let mut queues: [Vec<String>; 2] = [Vec::new(), Vec::new()];
        for (input, &count) in uses.iter().enumerate() {
            match count {
                0 => {}
                1 => queues[input].push(format!("[{}:a]", input)),
                n => {
                    let labels: Vec<String> =
                        (0..n).map(|k| format!("[in{}_{}]", input, k)).collect();
                    graph.push(format!("[{}:a]asplit={}{}", input, n, labels.concat()));
                    queues[input] = labels.into_iter().rev().collect();
                }
            }
        }
        Self { graph, queues }
    }

    fn take(&mut self, input: usize) -> String {
        self.queues
            .get_mut(input)
            .and_then(Vec::pop)
            .unwrap_or_else(|| format!("[{}:a]", input))
    }
}
