use super::*;

use crate::{
    assets::decode::{CellTarget, DecodedPhoto},
    model::layout::{Cell, Layout},
};

struct GreyDecoder;

impl PhotoDecoder for GreyDecoder {
    fn decode(&self, reference: &str, target: CellTarget) -> StripResult<DecodedPhoto> {
        if reference == "bad" {
            return Err(StripError::validation("unsupported image"));
        }
        let n = target.width as usize * target.height as usize;
        Ok(DecodedPhoto {
            width: target.width,
            height: target.height,
            rgba8_premul: Arc::new([128u8, 128, 128, 255].repeat(n)),
        })
    }
}

fn engine(debug: bool) -> StripEngine {
    StripEngine::new(EngineConfig {
        system_fonts: false,
        threads: Some(2),
        debug,
        ..EngineConfig::default()
    })
    .unwrap()
    .with_decoder(GreyDecoder)
}

fn small_request(layout: Layout, photos: &[&str]) -> StripRequest {
    let mut req = StripRequest::new(photos.iter().map(|s| s.to_string()).collect(), layout);
    req.dimensions = Some(StripStyle {
        photo_width: 64,
        padding: 4,
        top_margin: 8,
        bottom_margin: 8,
        ..StripStyle::default()
    });
    req
}

#[test]
fn stage_names_are_readable() {
    assert_eq!(Stage::TextRendering.to_string(), "text rendering");
    assert_eq!(Stage::Resolving.to_string(), "resolving");
}

#[test]
fn zero_threads_is_rejected() {
    let err = StripEngine::new(EngineConfig {
        system_fonts: false,
        threads: Some(0),
        ..EngineConfig::default()
    })
    .unwrap_err();
    assert!(matches!(err, StripError::Validation(_)));
}

#[test]
fn successful_run_reports_canvas_and_warnings() {
    let layout = Layout::new(vec![vec![Cell::Photo(0), Cell::Photo(1)]]);
    let out = engine(false)
        .render(&small_request(layout, &["ok", "bad"]))
        .unwrap();

    // 64*2 + 4*3, 36 + 4*2 + 16
    assert_eq!(
        out.canvas(),
        Canvas {
            width: 140,
            height: 60
        }
    );
    assert_eq!(out.decode_warnings.len(), 1);
    assert_eq!(out.warning_messages().len(), 1);
    assert!(out.to_response().is_success());
}

#[test]
fn failures_carry_their_stage() {
    let e = engine(false);

    let failure = e
        .run(&small_request(Layout::new(vec![]), &["ok"]))
        .unwrap_err();
    assert_eq!(failure.stage, Stage::Resolving);
    assert_eq!(failure.error.public_message(), "empty layout");

    let mut huge = small_request(Layout::grid(1, 6), &["ok"]);
    if let Some(style) = huge.dimensions.as_mut() {
        style.photo_width = 20_000;
    }
    let failure = e.run(&huge).unwrap_err();
    assert_eq!(failure.stage, Stage::Compositing);
    assert!(matches!(failure.error, StripError::Resource(_)));
    assert!(failure.details().starts_with("stage: compositing;"));
}

#[test]
fn details_only_in_debug_mode() {
    let req = small_request(Layout::new(vec![]), &["ok"]);

    let StripResponse::Failure(plain) = engine(false).respond(&req) else {
        panic!("expected failure");
    };
    assert_eq!(plain.error, "empty layout");
    assert!(plain.details.is_none());

    let StripResponse::Failure(debug) = engine(true).respond(&req) else {
        panic!("expected failure");
    };
    let details = debug.details.unwrap();
    assert!(details.contains("resolving"), "{details}");
}

#[test]
fn missing_fields_message_is_verbatim() {
    let req = StripRequest::from_json(r#"{"layout": [[0]]}"#).unwrap();
    let StripResponse::Failure(f) = engine(false).respond(&req) else {
        panic!("expected failure");
    };
    assert_eq!(f.error, "Missing required fields: photos and layout");
}
