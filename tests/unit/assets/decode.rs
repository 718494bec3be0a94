use std::io::Cursor;

use base64::Engine as _;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn target(w: u32, h: u32, fit: PhotoFit) -> CellTarget {
    CellTarget {
        width: w,
        height: h,
        fit,
    }
}

#[test]
fn decode_png_premultiplies() {
    let buf = png_bytes(1, 1, [100, 50, 200, 128]);
    let prepared = decode_photo(&buf, target(1, 1, PhotoFit::Stretch)).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn stretch_and_cover_both_produce_cell_size() {
    let buf = png_bytes(40, 10, [10, 20, 30, 255]);
    for fit in [PhotoFit::Stretch, PhotoFit::Cover] {
        let p = decode_photo(&buf, target(16, 9, fit)).unwrap();
        assert_eq!((p.width, p.height), (16, 9));
        assert_eq!(p.rgba8_premul.len(), 16 * 9 * 4);
        assert!(p.rgba8_premul.chunks_exact(4).all(|px| px == [10, 20, 30, 255]));
    }
}

#[test]
fn garbage_bytes_fail_to_decode() {
    assert!(decode_photo(b"not an image", target(4, 4, PhotoFit::Stretch)).is_err());
}

#[test]
fn data_url_and_bare_base64_resolve_to_same_bytes() {
    let buf = png_bytes(2, 2, [1, 2, 3, 255]);
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    let url = format!("data:image/png;base64,{b64}");

    assert_eq!(photo_bytes(&url, None).unwrap(), buf);
    assert_eq!(photo_bytes(&b64, None).unwrap(), buf);
}

#[test]
fn url_encoded_data_urls_are_percent_decoded() {
    assert_eq!(
        photo_bytes("data:image/svg+xml,%3Csvg%2F%3E%20x", None).unwrap(),
        b"<svg/> x"
    );
    // Truncated or non-hex escapes stay literal.
    assert_eq!(photo_bytes("data:,100%", None).unwrap(), b"100%");
    assert_eq!(photo_bytes("data:,%zz%4", None).unwrap(), b"%zz%4");
    assert_eq!(photo_bytes("data:,%ff", None).unwrap(), vec![0xff]);

    let buf = png_bytes(1, 1, [9, 9, 9, 255]);
    let encoded = buf.iter().map(|b| format!("%{b:02X}")).collect::<String>();
    let url = format!("data:image/png,{encoded}");
    assert_eq!(photo_bytes(&url, None).unwrap(), buf);
}

#[test]
fn malformed_references_are_rejected() {
    assert!(photo_bytes("", None).is_err());
    assert!(photo_bytes("data:image/png;base64", None).is_err());
    assert!(photo_bytes("data:image/png;base64,@@@", None).is_err());
    assert!(photo_bytes("photo.jpg", None).is_err());
}

#[test]
fn relative_paths_resolve_against_root() {
    let dir = std::path::PathBuf::from("target").join("unit_decode_paths");
    std::fs::create_dir_all(&dir).unwrap();
    let buf = png_bytes(3, 3, [9, 9, 9, 255]);
    std::fs::write(dir.join("shot.png"), &buf).unwrap();

    assert_eq!(photo_bytes("./shot.png", Some(dir.as_path())).unwrap(), buf);
    assert!(photo_bytes("../shot.png", Some(dir.as_path())).is_err());

    let decoder = DefaultPhotoDecoder::with_root(&dir);
    let p = decoder
        .decode("shot.png", target(6, 3, PhotoFit::Stretch))
        .unwrap();
    assert_eq!((p.width, p.height), (6, 3));
}

#[test]
fn normalize_rel_path_rules() {
    assert_eq!(normalize_rel_path("a\\b/./c.jpg").unwrap(), "a/b/c.jpg");
    assert!(normalize_rel_path("/abs.jpg").is_err());
    assert!(normalize_rel_path("a/../b.jpg").is_err());
    assert!(normalize_rel_path("./.").is_err());
}
