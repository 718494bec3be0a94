use super::*;

fn canvas(width: u32, height: u32) -> Canvas {
    Canvas { width, height }
}

#[test]
fn new_surface_is_transparent() {
    let s = Surface::new(canvas(3, 2), DEFAULT_MAX_PIXELS).unwrap();
    assert_eq!(s.data().len(), 3 * 2 * 4);
    assert!(s.data().iter().all(|&b| b == 0));
    assert_eq!(s.canvas(), canvas(3, 2));
}

#[test]
fn zero_area_and_oversized_canvases_are_resource_errors() {
    for c in [canvas(0, 10), canvas(10, 0), canvas(70_000, 10), canvas(10, 70_000)] {
        let err = Surface::new(c, DEFAULT_MAX_PIXELS).unwrap_err();
        assert!(matches!(err, StripError::Resource(_)), "{c:?}: {err}");
    }
}

#[test]
fn pixel_limit_is_enforced() {
    let err = Surface::new(canvas(100, 100), 9_999).unwrap_err();
    assert!(matches!(err, StripError::Resource(_)));
    assert!(Surface::new(canvas(100, 100), 10_000).is_ok());
}

#[test]
fn fill_writes_premultiplied_color() {
    let mut s = Surface::new(canvas(2, 2), DEFAULT_MAX_PIXELS).unwrap();
    s.fill(Rgba8::new(200, 100, 0, 128));
    let p = s.pixel(1, 1).unwrap();
    assert_eq!(p.to_array(), [100, 50, 0, 128]);
    assert!(s.pixel(2, 0).is_none());
}

#[test]
fn paint_layer_fills_rect_over_background() {
    let mut s = Surface::new(canvas(8, 8), DEFAULT_MAX_PIXELS).unwrap();
    s.fill(Rgba8::WHITE);
    s.paint_layer(|ctx| {
        ctx.set_paint(Rgba8::new(255, 0, 0, 255).to_cpu_color());
        ctx.fill_rect(&rect_to_cpu(Rect::new(2.0, 2.0, 6.0, 6.0)));
        Ok(())
    })
    .unwrap();

    assert_eq!(s.pixel(3, 3).unwrap().to_array(), [255, 0, 0, 255]);
    assert_eq!(s.pixel(0, 0).unwrap().to_array(), [255, 255, 255, 255]);
    assert_eq!(s.pixel(7, 7).unwrap().to_array(), [255, 255, 255, 255]);
}

#[test]
fn draw_errors_propagate_and_leave_surface_untouched() {
    let mut s = Surface::new(canvas(4, 4), DEFAULT_MAX_PIXELS).unwrap();
    s.fill(Rgba8::WHITE);
    let err = s
        .paint_layer(|_| Err(StripError::validation("nope")))
        .unwrap_err();
    assert!(matches!(err, StripError::Validation(_)));
    assert!(s.data().iter().all(|&b| b == 255));
}

#[test]
fn blurred_layer_spreads_beyond_source_rect() {
    let mut s = Surface::new(canvas(16, 16), DEFAULT_MAX_PIXELS).unwrap();
    let layer = s
        .render_layer(|ctx| {
            ctx.set_paint(Rgba8::BLACK.to_cpu_color());
            ctx.fill_rect(&rect_to_cpu(Rect::new(6.0, 6.0, 10.0, 10.0)));
            Ok(())
        })
        .unwrap();
    s.paint_blurred(&layer, 1.5).unwrap();

    assert!(s.pixel(4, 8).unwrap().a > 0);
    assert!(s.pixel(8, 8).unwrap().a < 255);
}

fn square_layer(s: &Surface) -> Vec<u8> {
    s.render_layer(|ctx| {
        ctx.set_paint(Rgba8::new(0, 0, 200, 255).to_cpu_color());
        ctx.fill_rect(&rect_to_cpu(Rect::new(20.0, 10.0, 26.0, 14.0)));
        Ok(())
    })
    .unwrap()
}

#[test]
fn cropped_blur_matches_whole_frame_blur() {
    let mut s = Surface::new(canvas(48, 32), DEFAULT_MAX_PIXELS).unwrap();
    s.fill(Rgba8::WHITE);
    let layer = square_layer(&s);

    let mut whole = layer.clone();
    let widths = crate::render::blend::box_widths(2.5);
    crate::render::blend::box_blur_rgba8_premul(&mut whole, 48, 32, widths).unwrap();
    let mut expected = s.data().to_vec();
    crate::render::blend::over_in_place(&mut expected, &whole).unwrap();

    s.paint_blurred(&layer, 2.5).unwrap();
    assert_eq!(s.data(), expected.as_slice());
}

#[test]
fn enormous_sigma_finishes_without_panicking() {
    let mut s = Surface::new(canvas(48, 32), DEFAULT_MAX_PIXELS).unwrap();
    s.fill(Rgba8::WHITE);
    let layer = square_layer(&s);
    for sigma in [1e30, f32::MAX, f32::INFINITY, 5e3] {
        s.paint_blurred(&layer, sigma).unwrap();
    }
    assert_eq!(s.pixel(0, 0).unwrap().a, 255);
}

#[test]
fn blank_layer_blur_is_a_noop() {
    let mut s = Surface::new(canvas(8, 8), DEFAULT_MAX_PIXELS).unwrap();
    s.fill(Rgba8::WHITE);
    let layer = vec![0u8; 8 * 8 * 4];
    s.paint_blurred(&layer, 3.0).unwrap();
    assert!(s.data().iter().all(|&b| b == 255));
}
