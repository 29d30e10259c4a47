use super::*;
use serde_json::json;

fn sample_json() -> serde_json::Value {
    json!({
        "id": "pat",
        "name": "Pat",
        "type": "gif",
        "duration": 40,
        "background_color": "#ffffff",
        "output_size": [112, 112],
        "custom_sequence": "2,0,1",
        "sources": [{"type": "image", "avatar": true}, {"type": "text", "username": true}],
        "positions": [
            {
                "type": "image",
                "target": "background",
                "rounded": true,
                "source": 0,
                "frames": [
                    {"id": 0, "x": 10, "y": 20, "size": [64, 64]},
                    {"id": 1, "x": 12, "y": 22, "size": [60, 60], "rotate": [15]},
                    {"id": 2, "x": 12, "y": 22, "rotate": [15, 4, 5]}
                ]
            },
            {
                "type": "text",
                "target": "foreground",
                "readonly": true,
                "content": "hi $0",
                "font": {"face": "sans", "size": {"min": 10, "max": 40}, "align": "center", "multiline": true, "max_lines": 2},
                "frames": [{"id": 0, "x": 56, "y": 100, "size": [100, 20]}]
            }
        ]
    })
}

#[test]
fn parses_full_document() {
    let t: Template = serde_json::from_value(sample_json()).unwrap();
    t.validate().unwrap();

    assert_eq!(t.output_kind, OutputKind::Animated);
    assert_eq!(t.frame_duration_ms, Some(40.0));
    assert_eq!(t.background_color, Rgba8::WHITE);
    assert_eq!(t.custom_sequence.as_deref(), Some(&[2, 0, 1][..]));
    assert_eq!(t.sources[0].kind, ValueKind::Image);
    assert!(t.sources[1].username);

    let Position::Image(img) = &t.positions[0] else {
        panic!("expected image position");
    };
    assert!(img.rounded);
    assert_eq!(img.frames[1].rotation.unwrap().center, None);
    assert_eq!(img.frames[2].rotation.unwrap().center, Some((4.0, 5.0)));
    assert!(img.frames[2].size.is_none());

    let Position::Text(txt) = &t.positions[1] else {
        panic!("expected text position");
    };
    assert_eq!(txt.target, RenderLayer::Foreground);
    assert_eq!(txt.font.size, FontSize::AutoFit { min: 10.0, max: 40.0 });
    assert_eq!(txt.font.align, TextAlign::Center);
    assert_eq!(txt.font.overflow, TextOverflow::Wrap);
    assert_eq!(txt.font.color, Rgba8::BLACK);
    assert_eq!(t.declared_frame_count(), 3);
}

#[test]
fn sequence_accepts_array_form() {
    let mut v = sample_json();
    v["custom_sequence"] = json!([1, 1, 0]);
    let t: Template = serde_json::from_value(v).unwrap();
    assert_eq!(t.custom_sequence, Some(vec![1, 1, 0]));
}

#[test]
fn parse_sequence_rejects_garbage() {
    assert_eq!(parse_sequence(" 3, 1 ,2").unwrap(), vec![3, 1, 2]);
    assert!(parse_sequence("1,x").is_err());
}

#[test]
fn unknown_output_kind_is_kept_for_generation_time() {
    let mut v = sample_json();
    v["type"] = json!("mp4");
    let t: Template = serde_json::from_value(v).unwrap();
    assert_eq!(t.output_kind, OutputKind::Unsupported("mp4".to_string()));
}

#[test]
fn source_index_defaults_to_ordinal() {
    let t: Template = serde_json::from_value(sample_json()).unwrap();
    assert_eq!(t.positions[0].source_index(0), 0);
    assert_eq!(t.positions[1].source_index(1), 1);
    assert_eq!(t.positions[1].kind(), ValueKind::Text);
}

#[test]
fn validate_rejects_animated_without_duration() {
    let mut t: Template = serde_json::from_value(sample_json()).unwrap();
    t.frame_duration_ms = None;
    assert!(t.validate().is_err());
    t.output_kind = OutputKind::Still;
    t.validate().unwrap();
}

#[test]
fn validate_rejects_bad_text_settings() {
    let mut t: Template = serde_json::from_value(sample_json()).unwrap();
    if let Position::Text(txt) = &mut t.positions[1] {
        txt.font.size = FontSize::AutoFit { min: 30.0, max: 10.0 };
    }
    assert!(t.validate().is_err());

    let mut t: Template = serde_json::from_value(sample_json()).unwrap();
    if let Position::Text(txt) = &mut t.positions[1] {
        txt.content = None;
    }
    assert!(t.validate().is_err());

    let mut t: Template = serde_json::from_value(sample_json()).unwrap();
    if let Position::Text(txt) = &mut t.positions[1] {
        txt.font.max_lines = Some(0);
    }
    assert!(t.validate().is_err());
}

#[test]
fn validate_rejects_zero_sizes() {
    let mut t: Template = serde_json::from_value(sample_json()).unwrap();
    t.output_size = Size::new(0, 10);
    assert!(t.validate().is_err());

    let mut t: Template = serde_json::from_value(sample_json()).unwrap();
    if let Position::Image(img) = &mut t.positions[0] {
        img.frames[0].size = Some(Size::new(10, 0));
    }
    assert!(t.validate().is_err());
}

#[test]
fn json_roundtrip() {
    let t: Template = serde_json::from_value(sample_json()).unwrap();
    let s = serde_json::to_string_pretty(&t).unwrap();
    let de: Template = serde_json::from_str(&s).unwrap();
    assert_eq!(de.positions.len(), 2);
    assert_eq!(de.custom_sequence, t.custom_sequence);
    assert_eq!(de.output_size, t.output_size);
}
