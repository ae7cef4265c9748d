// Unit tests for domain rules

use super::*;
use std::path::PathBuf;

fn cut(start: f64, end: f64) -> EditRequest {
    EditRequest::Cut {
        path: PathBuf::from("in.mp4"),
        start,
        end,
    }
}

#[test]
fn test_cut_validation() {
    assert!(RequestValidator::validate(&cut(5.0, 15.0)).is_ok());
    assert!(RequestValidator::validate(&cut(15.0, 5.0)).is_err());
    assert!(RequestValidator::validate(&cut(5.0, 5.0)).is_err());
    assert!(RequestValidator::validate(&cut(-1.0, 5.0)).is_err());
    assert!(RequestValidator::validate(&cut(0.0, f64::INFINITY)).is_err());
    assert!(RequestValidator::validate(&cut(f64::NAN, 5.0)).is_err());
}

#[test]
fn test_speed_factor_validation() {
    let speed = |factor: f64| EditRequest::SpeedChange {
        path: PathBuf::from("in.mp4"),
        start: 1.0,
        end: 2.0,
        factor,
    };
    assert!(RequestValidator::validate(&speed(2.0)).is_ok());
    assert!(RequestValidator::validate(&speed(0.1)).is_ok());
    assert!(RequestValidator::validate(&speed(0.0)).is_err());
    assert!(RequestValidator::validate(&speed(-2.0)).is_err());
    assert!(RequestValidator::validate(&speed(f64::NAN)).is_err());
}

#[test]
fn test_merge_point_validation() {
    let merge = |point: f64| EditRequest::Merge {
        base_path: PathBuf::from("base.mp4"),
        insert_path: PathBuf::from("insert.mp4"),
        insertion_point: point,
        mode: MergeMode::Sequential,
    };
    assert!(RequestValidator::validate(&merge(0.0)).is_ok());
    assert!(RequestValidator::validate(&merge(-0.5)).is_err());
    assert!(RequestValidator::validate(&merge(f64::INFINITY)).is_err());
}

#[test]
fn test_add_audio_validation() {
    let add_audio = |volume: f64, placement: AudioPlacement| EditRequest::AddAudio {
        video_path: PathBuf::from("v.mp4"),
        audio_path: PathBuf::from("a.mp3"),
        volume,
        placement,
        looped: true,
    };
    assert!(RequestValidator::validate(&add_audio(100.0, AudioPlacement::FromStart)).is_ok());
    assert!(RequestValidator::validate(&add_audio(0.0, AudioPlacement::FromStart)).is_ok());
    assert!(RequestValidator::validate(&add_audio(101.0, AudioPlacement::FromStart)).is_err());
    assert!(RequestValidator::validate(&add_audio(-1.0, AudioPlacement::FromStart)).is_err());
    assert!(RequestValidator::validate(&add_audio(
        50.0,
        AudioPlacement::Custom {
            start: 10.0,
            end: 5.0
        }
    ))
    .is_err());
}

#[test]
fn test_volume_to_gain() {
    assert_eq!(volume_to_gain(100.0), 1.0);
    assert_eq!(volume_to_gain(50.0), 0.5);
    assert_eq!(volume_to_gain(0.0), 0.0);
}

#[test]
fn test_is_material() {
    assert!(!is_material(0.0));
    assert!(!is_material(SEGMENT_EPSILON));
    assert!(is_material(0.02));
}

#[test]
fn test_clamp_range() {
    assert_eq!(clamp_range("cut", 5.0, 50.0, Some(30.0)).unwrap(), (5.0, 30.0));
    assert_eq!(clamp_range("cut", 5.0, 50.0, None).unwrap(), (5.0, 50.0));
    assert!(clamp_range("cut", 30.0, 50.0, Some(30.0)).is_err());
}
