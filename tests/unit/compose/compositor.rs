use super::*;
use image::Rgba;

use crate::bind::{RawInput, bind};
use crate::foundation::core::{Rgba8, Size};
use crate::template::model::{
    FontSize, FontSpec, OutputKind, SourceSlot, Template, TextAlign,
};
use crate::template::registry::TemplateRegistry;
use crate::text::box_shaper::BoxShaper;

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

fn png(px: [u8; 4]) -> RawInput {
    let img = RgbaImage::from_pixel(2, 2, Rgba(px));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    RawInput::Image(out.into_inner())
}

fn template(positions: Vec<Position>) -> Template {
    Template {
        id: "t".to_string(),
        display_name: String::new(),
        output_kind: OutputKind::Animated,
        frame_duration_ms: Some(50.0),
        background_color: Rgba8::WHITE,
        output_size: Size::new(8, 8),
        custom_sequence: None,
        sources: vec![],
        positions,
    }
}

fn frame(id: usize, x: i32, y: i32, size: Option<(u32, u32)>) -> FrameDef {
    FrameDef {
        frame_index: id,
        x,
        y,
        size: size.map(|(w, h)| Size::new(w, h)),
        rotation: None,
    }
}

fn image_at(target: RenderLayer, source: usize, frames: Vec<FrameDef>) -> Position {
    Position::Image(ImagePosition {
        target,
        source: Some(source),
        rounded: false,
        perspective: None,
        frames,
    })
}

fn text_at(target: RenderLayer, content: &str, frames: Vec<FrameDef>) -> Position {
    Position::Text(TextPosition {
        target,
        source: None,
        readonly: true,
        content: Some(content.to_string()),
        font: FontSpec {
            face: "sans".to_string(),
            size: FontSize::Fixed(4.0),
            color: Rgba8::new(0, 0, 255, 255),
            align: TextAlign::Left,
            multiline: false,
            max_lines: None,
            overflow: TextOverflow::Wrap,
        },
        frames,
    })
}

fn run(t: Template, assets: Vec<RgbaImage>, raw: &[RawInput]) -> MemeResult<Vec<RgbaImage>> {
    let mut reg = TemplateRegistry::new();
    let bound = bind(&t, raw)?;
    reg.insert(t, assets)?;
    let entry = reg.lookup("t")?;
    let mut shaper = BoxShaper::default();
    compose(entry, &bound, &mut shaper, &ComposeOpts::default())
}

fn solid_frames(colors: &[[u8; 4]]) -> Vec<RgbaImage> {
    colors
        .iter()
        .map(|&c| RgbaImage::from_pixel(8, 8, Rgba(c)))
        .collect()
}

#[test]
fn frame_count_follows_assets_and_output_size() {
    let t = template(vec![image_at(
        RenderLayer::Background,
        0,
        vec![frame(1, 0, 0, Some((2, 2)))],
    )]);
    let frames = run(t, solid_frames(&[[0, 0, 0, 0]; 4]), &[png(RED)]).unwrap();
    assert_eq!(frames.len(), 4);
    assert!(frames.iter().all(|f| f.dimensions() == (8, 8)));
    assert_eq!(frames[0].get_pixel(0, 0).0, WHITE);
    assert_eq!(frames[1].get_pixel(0, 0).0, RED);
}

#[test]
fn custom_sequence_remaps_base_frames() {
    let mut t = template(vec![]);
    t.custom_sequence = Some(vec![2, 0, 1]);
    let frames = run(t, solid_frames(&[RED, GREEN, BLUE]), &[]).unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].get_pixel(3, 3).0, BLUE);
    assert_eq!(frames[1].get_pixel(3, 3).0, RED);
    assert_eq!(frames[2].get_pixel(3, 3).0, GREEN);
}

#[test]
fn base_frame_may_fill_several_slots() {
    let mut t = template(vec![image_at(
        RenderLayer::Foreground,
        0,
        vec![frame(0, 0, 0, Some((2, 2)))],
    )]);
    t.custom_sequence = Some(vec![0, 1, 0]);
    let frames = run(t, solid_frames(&[[0, 0, 0, 0]; 2]), &[png(RED)]).unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].get_pixel(1, 1).0, RED);
    assert_eq!(frames[1].get_pixel(1, 1).0, WHITE);
    assert_eq!(frames[2].get_pixel(1, 1).0, RED);
}

#[test]
fn foreground_positions_paint_last() {
    // Foreground declared first, background declared after it, both over the frame asset.
    let t = template(vec![
        image_at(RenderLayer::Foreground, 0, vec![frame(0, 0, 0, Some((4, 4)))]),
        image_at(RenderLayer::Background, 1, vec![frame(0, 0, 0, Some((6, 6)))]),
    ]);
    let assets = solid_frames(&[GREEN]);
    let frames = run(t, assets, &[png(RED), png(BLUE)]).unwrap();

    assert_eq!(frames[0].get_pixel(2, 2).0, RED);
    // The background paste sits under the opaque asset.
    assert_eq!(frames[0].get_pixel(5, 5).0, GREEN);
}

#[test]
fn frames_without_size_are_skipped() {
    let t = template(vec![image_at(
        RenderLayer::Background,
        0,
        vec![frame(0, 0, 0, None), frame(1, 0, 0, Some((8, 8)))],
    )]);
    let frames = run(t, vec![], &[png(RED)]).unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].get_pixel(0, 0).0, WHITE);
    assert_eq!(frames[1].get_pixel(0, 0).0, RED);
}

#[test]
fn position_kind_mismatch_aborts() {
    let t = template(vec![image_at(
        RenderLayer::Background,
        0,
        vec![frame(0, 0, 0, Some((2, 2)))],
    )]);
    let err = run(t, vec![], &[RawInput::from("not an image")]).unwrap_err();
    assert!(matches!(
        err,
        MemeError::UnmatchedPositionType {
            position: 0,
            kind: ValueKind::Image
        }
    ));
}

#[test]
fn source_past_inputs_is_position_mismatch() {
    let t = template(vec![
        image_at(RenderLayer::Background, 0, vec![frame(0, 0, 0, Some((2, 2)))]),
        image_at(RenderLayer::Background, 5, vec![frame(0, 0, 0, Some((2, 2)))]),
    ]);
    let err = run(t, vec![], &[png(RED)]).unwrap_err();
    assert!(matches!(
        err,
        MemeError::UnmatchedPositionType { position: 1, .. }
    ));
}

#[test]
fn readonly_text_substitutes_and_draws() {
    let mut t = template(vec![text_at(
        RenderLayer::Foreground,
        "$0!",
        vec![frame(0, 1, 1, Some((8, 8)))],
    )]);
    t.sources = vec![SourceSlot {
        kind: ValueKind::Text,
        avatar: false,
        username: true,
        description: None,
    }];
    // "ab!" at 4px: 6x4 box from (1, 1).
    let frames = run(t, vec![], &[RawInput::from("ab")]).unwrap();
    assert_eq!(frames[0].get_pixel(1, 1).0, BLUE);
    assert_eq!(frames[0].get_pixel(6, 4).0, BLUE);
    assert_eq!(frames[0].get_pixel(7, 1).0, WHITE);
    assert_eq!(frames[0].get_pixel(1, 5).0, WHITE);
}

#[test]
fn text_line_limit_aborts() {
    let mut t = template(vec![text_at(
        RenderLayer::Background,
        "abcdef",
        vec![frame(0, 0, 0, Some((4, 8)))],
    )]);
    if let Position::Text(p) = &mut t.positions[0] {
        p.font.multiline = true;
        p.font.max_lines = Some(2);
    }
    let err = run(t, vec![], &[]).unwrap_err();
    assert!(matches!(err, MemeError::LineCountExceeded { position: 0, .. }));
}

#[test]
fn rotated_image_centers_on_anchor() {
    let mut f = frame(0, 4, 4, Some((2, 2)));
    f.rotation = Some(crate::template::model::Rotation {
        angle_deg: 90.0,
        center: None,
    });
    let t = template(vec![image_at(RenderLayer::Background, 0, vec![f])]);
    let frames = run(t, vec![], &[png(RED)]).unwrap();
    assert_eq!(frames[0].get_pixel(3, 3).0, RED);
    assert_eq!(frames[0].get_pixel(4, 4).0, RED);
    assert_eq!(frames[0].get_pixel(5, 5).0, WHITE);
}

fn png_sized(w: u32, h: u32, px: [u8; 4]) -> RawInput {
    let img = RgbaImage::from_pixel(w, h, Rgba(px));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    RawInput::Image(out.into_inner())
}

fn near_white(px: [u8; 4]) -> bool {
    px.iter().all(|&c| c >= 235)
}

fn reddish(px: [u8; 4]) -> bool {
    px[0] >= 250 && px[1] <= 6 && px[2] <= 6
}

#[test]
fn perspective_lands_at_anchor_plus_quad_offset() {
    let mut t = template(vec![Position::Image(ImagePosition {
        target: RenderLayer::Background,
        source: Some(0),
        rounded: false,
        perspective: Some([[4.0, 2.0], [12.0, 2.0], [12.0, 10.0], [4.0, 10.0]]),
        frames: vec![frame(0, 1, 1, Some((8, 8)))],
    })]);
    t.output_size = Size::new(20, 20);
    let frames = run(t, vec![], &[png_sized(8, 8, RED)]).unwrap();
    let f = &frames[0];

    // Warped raster covers (5, 3)..(13, 11).
    assert!(reddish(f.get_pixel(5, 3).0));
    assert!(reddish(f.get_pixel(9, 7).0));
    assert!(reddish(f.get_pixel(12, 10).0));
    assert_eq!(f.get_pixel(4, 3).0, WHITE);
    assert_eq!(f.get_pixel(5, 2).0, WHITE);
    assert_eq!(f.get_pixel(13, 10).0, WHITE);
    assert_eq!(f.get_pixel(12, 11).0, WHITE);
}

#[test]
fn perspective_trapezoid_leaves_outer_corners_clear() {
    let mut t = template(vec![Position::Image(ImagePosition {
        target: RenderLayer::Background,
        source: Some(0),
        rounded: false,
        perspective: Some([[0.0, 0.0], [8.0, 0.0], [6.0, 8.0], [2.0, 8.0]]),
        frames: vec![frame(0, 2, 2, Some((8, 8)))],
    })]);
    t.output_size = Size::new(12, 12);
    let frames = run(t, vec![], &[png_sized(8, 8, RED)]).unwrap();
    let f = &frames[0];

    assert!(reddish(f.get_pixel(6, 6).0), "{:?}", f.get_pixel(6, 6).0);
    assert!(near_white(f.get_pixel(2, 9).0));
    assert!(near_white(f.get_pixel(9, 9).0));
}

#[test]
fn rounded_image_shows_background_in_corners() {
    let mut t = template(vec![Position::Image(ImagePosition {
        target: RenderLayer::Background,
        source: Some(0),
        rounded: true,
        perspective: None,
        frames: vec![frame(0, 2, 2, Some((16, 16)))],
    })]);
    t.output_size = Size::new(20, 20);
    let frames = run(t, vec![], &[png_sized(16, 16, RED)]).unwrap();
    let f = &frames[0];

    for (x, y) in [(2, 2), (17, 2), (2, 17), (17, 17)] {
        assert!(near_white(f.get_pixel(x, y).0), "corner ({x}, {y})");
    }
    assert!(reddish(f.get_pixel(10, 10).0));
}

#[test]
fn rounded_rotation_keeps_origin_at_anchor() {
    let mut f = frame(0, 2, 2, Some((16, 16)));
    f.rotation = Some(crate::template::model::Rotation {
        angle_deg: 45.0,
        center: None,
    });
    let mut t = template(vec![Position::Image(ImagePosition {
        target: RenderLayer::Background,
        source: Some(0),
        rounded: true,
        perspective: None,
        frames: vec![f],
    })]);
    t.output_size = Size::new(30, 30);
    let frames = run(t, vec![], &[png_sized(16, 16, RED)]).unwrap();
    let f = &frames[0];

    // The expanded canvas is pasted at (2, 2); the disc center moves to about (13.5, 13.5).
    assert!(reddish(f.get_pixel(13, 13).0));
    assert!(reddish(f.get_pixel(9, 9).0));
    assert!(near_white(f.get_pixel(2, 2).0));
    assert!(near_white(f.get_pixel(26, 26).0));
}

#[test]
fn omitted_source_reads_input_at_position_index() {
    let mut second = image_at(RenderLayer::Background, 0, vec![frame(0, 4, 4, Some((4, 4)))]);
    if let Position::Image(p) = &mut second {
        p.source = None;
    }
    let t = template(vec![
        image_at(RenderLayer::Background, 0, vec![frame(0, 0, 0, Some((4, 4)))]),
        second,
    ]);
    let frames = run(t, vec![], &[png(RED), png(BLUE)]).unwrap();
    assert_eq!(frames[0].get_pixel(1, 1).0, RED);
    assert_eq!(frames[0].get_pixel(5, 5).0, BLUE);
}
