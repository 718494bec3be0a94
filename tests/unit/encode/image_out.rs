use super::*;

use crate::{foundation::core::Rgba8, render::surface::DEFAULT_MAX_PIXELS};

fn surface(width: u32, height: u32, color: Rgba8) -> Surface {
    let mut s = Surface::new(Canvas { width, height }, DEFAULT_MAX_PIXELS).unwrap();
    s.fill(color);
    s
}

#[test]
fn quality_maps_onto_jpeg_scale() {
    assert_eq!(jpeg_quality(0.9), 90);
    assert_eq!(jpeg_quality(1.0), 100);
    assert_eq!(jpeg_quality(0.0), 90);
    assert_eq!(jpeg_quality(0.004), 1);
    assert_eq!(jpeg_quality(7.0), 100);
    assert_eq!(jpeg_quality(-1.0), 1);
    assert_eq!(jpeg_quality(f64::NAN), 90);
}

#[test]
fn jpeg_output_decodes_to_canvas_size() {
    let s = surface(40, 20, Rgba8::new(200, 10, 10, 255));
    let out = encode(&s, OutputFormat::Jpeg, 0.9).unwrap();
    assert_eq!(out.mime(), "image/jpeg");
    assert_eq!(&out.bytes[..2], &[0xff, 0xd8]);

    let img = image::load_from_memory(&out.bytes).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (40, 20));
    let p = img.get_pixel(20, 10);
    assert!(p[0] > 180 && p[1] < 40 && p[2] < 40, "{p:?}");
}

#[test]
fn lower_quality_produces_smaller_jpeg() {
    let mut s = surface(64, 64, Rgba8::WHITE);
    s.paint_layer(|ctx| {
        for i in 0..16 {
            let v = (i * 16) as u8;
            ctx.set_paint(Rgba8::new(v, 255 - v, v / 2, 255).to_cpu_color());
            let x = f64::from(i * 4);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(x, 0.0, x + 3.0, 64.0));
        }
        Ok(())
    })
    .unwrap();

    let high = encode(&s, OutputFormat::Jpeg, 1.0).unwrap();
    let low = encode(&s, OutputFormat::Jpeg, 0.1).unwrap();
    assert!(low.bytes.len() < high.bytes.len());
}

#[test]
fn png_keeps_straight_alpha() {
    let s = surface(4, 4, Rgba8::new(200, 100, 0, 128));
    let out = encode(&s, OutputFormat::Png, 0.5).unwrap();
    assert_eq!(out.mime(), "image/png");

    let img = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
    let p = img.get_pixel(1, 1);
    assert_eq!(p[3], 128);
    assert!((i32::from(p[0]) - 200).abs() <= 2);
    assert!((i32::from(p[1]) - 100).abs() <= 2);
}

#[test]
fn data_url_prefix_matches_format() {
    let s = surface(2, 2, Rgba8::WHITE);
    let jpeg = encode(&s, OutputFormat::Jpeg, 0.9).unwrap();
    assert!(jpeg.to_data_url().starts_with("data:image/jpeg;base64,/9j/"));
    let png = encode(&s, OutputFormat::Png, 0.9).unwrap();
    assert!(png.to_data_url().starts_with("data:image/png;base64,iVBOR"));
}

#[test]
fn unpremultiply_handles_edges() {
    let mut px = vec![0, 0, 0, 0, 10, 20, 30, 255, 64, 32, 0, 128];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..8], &[0, 0, 0, 0, 10, 20, 30, 255]);
    assert_eq!(px[8], 128);
    assert_eq!(px[9], 64);
}
