use std::io::Cursor;

use super::*;

fn encode(img: image::RgbaImage, format: image::ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

#[test]
fn decode_png_keeps_dimensions_and_straight_alpha() {
    let src = image::RgbaImage::from_raw(2, 1, vec![100, 50, 200, 128, 1, 2, 3, 255]).unwrap();
    let bytes = encode(src, image::ImageFormat::Png);

    let img = decode_image(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (2, 1));
    assert_eq!(img.pixels().get_pixel(0, 0).0, [100, 50, 200, 128]);
    assert_eq!(img.pixels().get_pixel(1, 0).0, [1, 2, 3, 255]);
}

#[test]
fn decode_rejects_garbage() {
    let err = decode_image(b"not an image").unwrap_err();
    assert!(err.to_string().contains("decode error:"));
}

#[test]
fn mime_whitelist() {
    assert_eq!(ImageMime::from_mime("image/jpeg").unwrap(), ImageMime::Jpeg);
    assert_eq!(ImageMime::from_mime("IMAGE/PNG").unwrap(), ImageMime::Png);
    assert_eq!(
        ImageMime::from_mime("image/webp; charset=binary").unwrap(),
        ImageMime::Webp
    );
    assert_eq!(ImageMime::from_mime("image/gif").unwrap(), ImageMime::Gif);

    for bad in ["image/bmp", "image/svg+xml", "text/plain", ""] {
        let err = ImageMime::from_mime(bad).unwrap_err();
        assert!(err.is_user_facing());
        assert!(err.to_string().contains("unsupported image type:"));
    }
}

#[test]
fn mime_from_extension() {
    assert_eq!(
        ImageMime::from_path(Path::new("a/photo.JPG")).unwrap(),
        ImageMime::Jpeg
    );
    assert_eq!(
        ImageMime::from_path(Path::new("x.webp")).unwrap(),
        ImageMime::Webp
    );
    assert!(ImageMime::from_path(Path::new("x.tiff")).is_err());
    assert!(ImageMime::from_path(Path::new("noext")).is_err());
}

#[test]
fn mime_sniffed_from_bytes() {
    let png = encode(image::RgbaImage::new(1, 1), image::ImageFormat::Png);
    assert_eq!(ImageMime::sniff(&png).unwrap(), ImageMime::Png);

    let bmp = encode(image::RgbaImage::new(1, 1), image::ImageFormat::Bmp);
    assert!(ImageMime::sniff(&bmp).is_err());
    assert!(ImageMime::sniff(b"??").is_err());
}

#[test]
fn zero_sized_images_are_rejected() {
    assert!(SourceImage::from_rgba(image::RgbaImage::new(0, 3)).is_err());
}

#[test]
fn resized_matches_requested_size() {
    let img = SourceImage::from_rgba(image::RgbaImage::from_pixel(
        20,
        10,
        image::Rgba([9, 9, 9, 255]),
    ))
    .unwrap();
    let half = img.resized(10, 5);
    assert_eq!(half.dimensions(), (10, 5));
    assert_eq!(half.get_pixel(3, 3).0, [9, 9, 9, 255]);
    assert_eq!(img.resized(20, 10).dimensions(), (20, 10));
}
