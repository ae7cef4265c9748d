// Unit tests for domain models

use super::*;

#[test]
fn test_time_spec_parse_seconds() {
    let time = TimeSpec::parse("123.456").unwrap();
    assert_eq!(time.seconds, 123.456);
}

#[test]
fn test_time_spec_parse_mm_ss() {
    let time = TimeSpec::parse("01:30.5").unwrap();
    assert_eq!(time.seconds, 90.5);
}

#[test]
fn test_time_spec_parse_hh_mm_ss() {
    let time = TimeSpec::parse("01:02:03.5").unwrap();
    assert_eq!(time.seconds, 3723.5);
}

#[test]
fn test_time_spec_parse_invalid() {
    assert!(TimeSpec::parse("invalid").is_err());
    assert!(TimeSpec::parse("00:60").is_err());
    assert!(TimeSpec::parse("01:60:00").is_err());
    assert!(TimeSpec::parse("-10").is_err());
    assert!(TimeSpec::parse("NaN").is_err());
    assert!(TimeSpec::parse("inf").is_err());
    assert!(TimeSpec::parse("1:2:3:4").is_err());
}

#[test]
fn test_time_spec_display() {
    assert_eq!(TimeSpec::from_seconds(3723.456).to_string(), "1:02:03.456");
    assert_eq!(TimeSpec::from_seconds(123.456).to_string(), "2:03.456");
}

#[test]
fn test_media_facts_defaults() {
    let facts = MediaFacts::default();
    assert_eq!(facts.fps, 30.0);
    assert_eq!(facts.sample_rate, 44_100);
    assert_eq!(facts.channels, 2);
    assert_eq!(facts.known_duration(), None);
    assert_eq!(facts.resolution_label(), "unknown");
}

#[test]
fn test_media_facts_known_duration() {
    let facts = MediaFacts {
        duration_seconds: 12.5,
        width: 1280,
        height: 720,
        ..MediaFacts::default()
    };
    assert_eq!(facts.known_duration(), Some(12.5));
    assert_eq!(facts.resolution_label(), "1280x720");
}

#[test]
fn test_merge_mode_parse() {
    assert_eq!(MergeMode::parse("Sequential").unwrap(), MergeMode::Sequential);
    assert_eq!(MergeMode::parse("overlay").unwrap(), MergeMode::Overlay);
    assert!(MergeMode::parse("sideways").is_err());
}

#[test]
fn test_quality_profiles_are_canonical() {
    let preview = QualityProfile::PREVIEW;
    assert_eq!(preview.video_codec, "libx264");
    assert_eq!(preview.preset, "ultrafast");
    assert_eq!(preview.crf, 28);
    assert_eq!(preview.audio_codec, "aac");
    assert_eq!(preview.audio_bitrate, "128k");
    assert!(!preview.fast_start);

    let export = QualityProfile::EXPORT;
    assert_eq!(export.video_codec, "libx264");
    assert_eq!(export.preset, "medium");
    assert_eq!(export.crf, 23);
    assert_eq!(export.audio_codec, "aac");
    assert_eq!(export.audio_bitrate, "192k");
    assert!(export.fast_start);
}

#[test]
fn test_render_target_selects_profile() {
    assert_eq!(RenderTarget::Preview.profile(), QualityProfile::PREVIEW);
    assert!(RenderTarget::Preview.is_ephemeral());

    let export = RenderTarget::export("/tmp/final.mp4");
    assert_eq!(export.profile(), QualityProfile::EXPORT);
    assert!(!export.is_ephemeral());
}

#[test]
fn test_job_ephemeral_follows_profile() {
    let request = EditRequest::Cut {
        path: "in.mp4".into(),
        start: 0.0,
        end: 1.0,
    };
    let preview = Job::new(request.clone(), QualityProfile::PREVIEW, "/tmp/p.mp4".into());
    let export = Job::new(request, QualityProfile::EXPORT, "/out/e.mp4".into());
    assert!(preview.is_ephemeral);
    assert!(!export.is_ephemeral);
    assert_ne!(preview.id, export.id);
}

#[test]
fn test_job_id_short_form() {
    let id = JobId::new();
    assert_eq!(id.short().len(), 8);
    assert!(id.to_string().starts_with(&id.short()));
}

#[test]
fn test_edit_request_assets_order() {
    let request = EditRequest::AddAudio {
        video_path: "v.mp4".into(),
        audio_path: "a.mp3".into(),
        volume: 80.0,
        placement: AudioPlacement::FromStart,
        looped: false,
    };
    let assets = request.assets();
    assert_eq!(assets.len(), 2);
    assert_eq!(assets[0].kind, MediaKind::Video);
    assert_eq!(assets[1].kind, MediaKind::Audio);
    assert_eq!(request.feature(), "audio");
}

#[test]
fn test_segment_output_duration_for_speed() {
    let segment = Segment {
        source: SourceRef::Asset(0),
        start_seconds: 10.0,
        duration_seconds: 10.0,
        role: SegmentRole::Transformed(Transform::Speed { factor: 2.0 }),
    };
    assert_eq!(segment.output_duration(), 5.0);
    assert_eq!(segment.end_seconds(), 20.0);
    assert_eq!(Segment::silence(3.0).output_duration(), 3.0);
}
