#![no_main]

use libfuzzer_sys::fuzz_target;
use zenavif_raster::container::{CodedImage, parse, serialize};

fn same_item(a: &CodedImage, b: &CodedImage) -> bool {
    a.data == b.data
        && (a.width, a.height) == (b.width, b.height)
        && a.config.depth() == b.config.depth()
        && a.config.format() == b.config.format()
}

// Anything the reader accepts must keep its payloads and properties through
// a write and a second read. av1C levels and inexpressible nclx codes may
// be normalized by the writer.
fuzz_target!(|data: &[u8]| {
    if let Ok(file) = parse(data) {
        if let Ok(bytes) = serialize(&file) {
            let again = parse(&bytes).expect("re-reading a written file");
            assert!(same_item(&again.color, &file.color));
            assert_eq!(again.alpha.is_some(), file.alpha.is_some());
            if let (Some(a), Some(b)) = (&again.alpha, &file.alpha) {
                assert_eq!(a.data, b.data);
            }
            assert_eq!(again.icc, file.icc);
            assert_eq!(again.transforms, file.transforms);
            assert_eq!(again.exif_item, file.exif_item);
            assert_eq!(again.xmp, file.xmp);
            assert_eq!(again.premultiplied, file.premultiplied);
        }
    }
});
