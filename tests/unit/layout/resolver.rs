use super::*;
use serde_json::json;

fn layout(v: serde_json::Value) -> Layout {
    serde_json::from_value(v).unwrap()
}

#[test]
fn classic_three_row_strip_matches_formula() {
    let g = resolve(&layout(json!([[0], [1], [2]])), 600, 30, 120, 240).unwrap();
    assert_eq!(g.photo_height, 338);
    assert_eq!(g.canvas, Canvas { width: 660, height: 1494 });
    assert_eq!(g.rows, 3);
    assert_eq!(g.max_cols, 1);

    let s = g.slot(1, 0).unwrap();
    assert_eq!((s.x, s.y), (30, 120 + 30 + 338 + 30));
}

#[test]
fn size_formula_holds_across_shapes() {
    for (rows, cols, pw, pad, top, bottom) in [
        (1u32, 1u32, 600u32, 30u32, 120u32, 240u32),
        (2, 3, 320, 10, 0, 0),
        (6, 6, 17, 0, 5, 9),
        (4, 2, 1001, 7, 1, 1),
    ] {
        let g = resolve(&Layout::grid(rows, cols), pw, pad, top, bottom).unwrap();
        let ph = photo_height_for(pw);
        assert_eq!(g.canvas.width, pw * cols + pad * (cols + 1));
        assert_eq!(g.canvas.height, ph * rows + pad * (rows + 1) + top + bottom);
        assert_eq!(g.slots.len(), (rows * cols) as usize);
    }
}

#[test]
fn photo_height_rounds_half_up() {
    assert_eq!(photo_height_for(600), 338);
    assert_eq!(photo_height_for(8), 5);
    assert_eq!(photo_height_for(1), 1);
    assert_eq!(photo_height_for(16), 9);
}

#[test]
fn jagged_rows_leave_trailing_cells_undefined() {
    let g = resolve(&layout(json!([[0, 1], [2]])), 600, 30, 120, 240).unwrap();
    assert_eq!(g.max_cols, 2);
    assert_eq!(g.canvas.width, 600 * 2 + 30 * 3);
    assert!(g.slot(1, 1).is_none());
    assert!(g.slot(1, 0).is_some());
    assert_eq!(g.slots.len(), 3);
}

#[test]
fn cell_origins_follow_grid_steps() {
    let g = resolve(&Layout::grid(2, 2), 100, 10, 50, 0).unwrap();
    let ph = photo_height_for(100);
    let s = g.slot(1, 1).unwrap();
    assert_eq!(s.x, 10 + 110);
    assert_eq!(s.y, 50 + 10 + ph + 10);
    let r = g.cell_rect(s);
    assert_eq!(r.width(), 100.0);
    assert_eq!(r.height(), f64::from(ph));
}

#[test]
fn empty_layout_is_validation_error() {
    let err = resolve(&layout(json!([])), 600, 30, 120, 240).unwrap_err();
    assert!(matches!(err, StripError::Validation(ref m) if m == "empty layout"));

    let err = resolve(&layout(json!([[], []])), 600, 30, 120, 240).unwrap_err();
    assert!(matches!(err, StripError::Validation(_)));
}

#[test]
fn zero_photo_width_is_validation_error() {
    let err = resolve(&Layout::grid(1, 1), 0, 30, 120, 240).unwrap_err();
    assert!(matches!(err, StripError::Validation(_)));
}

#[test]
fn overflowing_canvas_is_resource_error() {
    let err = resolve(&Layout::grid(1, 6), u32::MAX / 2, 30, 0, 0).unwrap_err();
    assert!(matches!(err, StripError::Resource(_)));
}

#[test]
fn resolve_for_style_uses_style_sizes() {
    let style = StripStyle {
        photo_width: 160,
        padding: 4,
        top_margin: 8,
        bottom_margin: 12,
        ..StripStyle::default()
    };
    let g = resolve_for_style(&Layout::grid(1, 1), &style).unwrap();
    assert_eq!(g.canvas.width, 168);
    assert_eq!(g.canvas.height, 90 + 8 + 8 + 12);
}

#[test]
fn text_cells_get_slots_too() {
    let g = resolve(&layout(json!([[0, "text"]])), 100, 0, 0, 0).unwrap();
    assert!(g.slot(0, 1).unwrap().cell.is_text());
}
