//! Integration tests for the palette construction protocol

mod common;

use std::sync::atomic::Ordering;

use common::{FailingQuantizer, MemoryLoader, MockQuantizer};
use palgen::{
    ColorMode, ConvertJob, FixedColor, ImageRef, Palette, PaletteBuilder, PaletteError, Rgba,
    Tileset, TilesetGroup, PALETTE_MAX_ENTRIES,
};
use pretty_assertions::assert_eq;

fn builder(loader: MemoryLoader) -> PaletteBuilder<MockQuantizer, MemoryLoader> {
    PaletteBuilder::with_backends(MockQuantizer::new(), loader)
}

/// `num_entries` must be one past the highest occupied slot, with
/// everything below it either occupied or an accounted hole.
fn assert_index_invariant(palette: &Palette) {
    let highest = palette
        .entries
        .iter()
        .rposition(|slot| slot.is_some())
        .map_or(0, |i| i + 1);
    assert_eq!(palette.num_entries, highest);
    assert!(palette
        .entries
        .iter()
        .skip(palette.num_entries)
        .all(|slot| slot.is_none()));
}

#[test]
fn test_end_to_end_exact_exclusion_example() {
    let black = Rgba::opaque(0, 0, 0);
    let red = Rgba::opaque(255, 0, 0);
    let blue = Rgba::opaque(0, 0, 255);

    // 10000 black pixels followed by one red and one blue
    let mut pixels = vec![black; 10000];
    pixels.push(red);
    pixels.push(blue);

    let mut loader = MemoryLoader::new();
    loader.insert("scene.png", &pixels);

    let mut palette = Palette::new("scene");
    palette.add_fixed_color(FixedColor::new(0, black, true));
    palette.add_image(ImageRef::new("scene.png"));

    builder(loader).generate(&mut palette, &[]).unwrap();

    let mode = palette.mode;
    assert_eq!(palette.num_entries, 3);
    assert_eq!(palette.holes(), 0);

    // Exact black sits at its pinned index
    assert_eq!(palette.entries[0], Some(mode.convert(black)));

    // The two quantized colors occupy indices 1 and 2 in some order
    let mut rest = vec![
        palette.entries[1].unwrap().packed,
        palette.entries[2].unwrap().packed,
    ];
    rest.sort_unstable();
    let mut expected = vec![mode.convert(red).packed, mode.convert(blue).packed];
    expected.sort_unstable();
    assert_eq!(rest, expected);

    assert_index_invariant(&palette);
}

#[test]
fn test_exact_exclusion_with_capacity_one_skips_quantization() {
    let key = Rgba::opaque(255, 0, 255);

    let mut loader = MemoryLoader::new();
    loader.insert("key-only.png", &vec![key; 64]);

    // One exact entry against a 2-slot palette leaves a quantization
    // budget of 1: images are never even decoded.
    let mut palette = Palette::new("keyed").with_max_entries(2);
    palette.add_fixed_color(FixedColor::new(0, key, true));
    palette.add_image(ImageRef::new("key-only.png"));

    builder(loader).generate(&mut palette, &[]).unwrap();

    assert_eq!(palette.num_entries, 1);
    assert_eq!(palette.entries[0], Some(palette.mode.convert(key)));
    assert_eq!(palette.holes(), 0);
}

#[test]
fn test_all_pixels_filtered_skips_quantization() {
    let key = Rgba::opaque(255, 0, 255);

    let mut loader = MemoryLoader::new();
    // Alpha differs but RGB matches the key: still excluded
    loader.insert("key-only.png", &vec![Rgba::new(255, 0, 255, 10); 32]);

    let mut palette = Palette::new("keyed");
    palette.add_fixed_color(FixedColor::new(0, key, true));
    palette.add_image(ImageRef::new("key-only.png"));

    builder(loader).generate(&mut palette, &[]).unwrap();

    assert_eq!(palette.num_entries, 1);
    assert_eq!(palette.entries[0], Some(palette.mode.convert(key)));
}

#[test]
fn test_exact_color_fidelity_at_pinned_index() {
    let key = Rgba::opaque(12, 200, 99);
    let mut loader = MemoryLoader::new();
    loader.insert(
        "art.png",
        &[
            Rgba::opaque(10, 10, 10),
            Rgba::opaque(80, 80, 80),
            Rgba::opaque(200, 200, 200),
        ],
    );

    let mut palette = Palette::new("art").with_mode(ColorMode::Rgb565);
    palette.add_fixed_color(FixedColor::new(3, key, true));
    palette.add_image(ImageRef::new("art.png"));

    builder(loader).generate(&mut palette, &[]).unwrap();

    assert_eq!(palette.entries[3], Some(ColorMode::Rgb565.convert(key)));
    assert_index_invariant(&palette);
}

#[test]
fn test_exact_relocation_preserves_displaced_color() {
    let black = Rgba::opaque(0, 0, 0);
    let colors = [
        Rgba::opaque(50, 0, 0),
        Rgba::opaque(0, 50, 0),
        Rgba::opaque(0, 0, 50),
    ];

    let mut loader = MemoryLoader::new();
    loader.insert("three.png", &colors);

    let mut palette = Palette::new("three");
    palette.add_fixed_color(FixedColor::new(0, black, true));
    palette.add_image(ImageRef::new("three.png"));

    builder(loader).generate(&mut palette, &[]).unwrap();

    // All three quantized colors plus the fixed color survive placement
    let mode = palette.mode;
    let mut found: Vec<u16> = palette.entries.iter().flatten().map(|c| c.packed).collect();
    found.sort_unstable();
    let mut expected: Vec<u16> = colors
        .iter()
        .chain(std::iter::once(&black))
        .map(|&c| mode.convert(c).packed)
        .collect();
    expected.sort_unstable();
    assert_eq!(found, expected);

    assert_eq!(palette.num_entries, 4);
    assert_eq!(palette.holes(), 0);
}

#[test]
fn test_non_exact_fixed_swapped_to_pinned_index() {
    let gray = Rgba::opaque(100, 100, 100);
    let mut loader = MemoryLoader::new();
    loader.insert("two.png", &[Rgba::opaque(10, 0, 0), Rgba::opaque(0, 10, 0)]);

    // Seeded gray lands at output position 0; pinning it to slot 4 swaps
    // the (empty) slot 4 back to position 0, leaving a hole there.
    let mut palette = Palette::new("pinned");
    palette.add_fixed_color(FixedColor::new(4, gray, false));
    palette.add_image(ImageRef::new("two.png"));

    builder(loader).generate(&mut palette, &[]).unwrap();

    assert_eq!(palette.entries[4], Some(palette.mode.convert(gray)));
    assert!(palette.entries[0].is_none());
    assert_eq!(palette.num_entries, 5);
    // Two holes: the vacated slot 0 and the never-filled slot 3
    assert_eq!(palette.holes(), 2);
    assert_index_invariant(&palette);
}

#[test]
fn test_unresolved_non_exact_fixed_color_still_succeeds() {
    let gray = Rgba::opaque(100, 100, 100);
    let mut loader = MemoryLoader::new();
    loader.insert("two.png", &[Rgba::opaque(10, 0, 0), Rgba::opaque(0, 10, 0)]);

    let mut palette = Palette::new("lossy");
    palette.add_fixed_color(FixedColor::new(4, gray, false));
    palette.add_image(ImageRef::new("two.png"));

    // A quantizer that loses its seeds leaves the pinned slot unresolved;
    // construction still succeeds (the constraint is only warned about)
    let builder = PaletteBuilder::with_backends(MockQuantizer::dropping_seeds(), loader);
    builder.generate(&mut palette, &[]).unwrap();

    assert!(palette.entries[4].is_none());
    assert_eq!(palette.num_entries, 2);
}

#[test]
fn test_image_load_failure_aborts_without_partial_table() {
    let mut loader = MemoryLoader::new();
    loader.insert("first.png", &[Rgba::opaque(1, 2, 3)]);

    let mut palette = Palette::new("broken");
    palette.add_image(ImageRef::new("first.png"));
    palette.add_image(ImageRef::new("missing.png"));

    let err = builder(loader).generate(&mut palette, &[]).unwrap_err();
    assert!(matches!(err, PaletteError::ImageLoad { path, .. } if path == "missing.png"));
    assert!(palette.entries.iter().all(Option::is_none));
    assert_eq!(palette.num_entries, 0);
}

#[test]
fn test_quantize_failure_releases_session() {
    let mut loader = MemoryLoader::new();
    loader.insert("img.png", &[Rgba::opaque(1, 2, 3), Rgba::opaque(4, 5, 6)]);

    let quantizer = FailingQuantizer::new();
    let dropped = quantizer.session_dropped.clone();

    let mut palette = Palette::new("doomed");
    palette.add_image(ImageRef::new("img.png"));

    let builder = PaletteBuilder::with_backends(quantizer, loader);
    let err = builder.generate(&mut palette, &[]).unwrap_err();

    assert!(matches!(err, PaletteError::Quantize { name, .. } if name == "doomed"));
    assert!(dropped.load(Ordering::SeqCst));
    assert!(palette.entries.iter().all(Option::is_none));
}

#[test]
fn test_automatic_palette_collects_from_matching_jobs() {
    let mut loader = MemoryLoader::new();
    loader.insert("bg.png", &[Rgba::opaque(10, 0, 0)]);
    loader.insert("tiles.png", &[Rgba::opaque(0, 10, 0)]);

    let mut palette = Palette::new("shared").automatic(true);

    let jobs = vec![
        ConvertJob {
            palette_name: "unrelated".into(),
            images: vec![ImageRef::new("never-loaded.png")],
            tileset_group: None,
        },
        ConvertJob {
            palette_name: "shared".into(),
            images: vec![ImageRef::new("bg.png")],
            tileset_group: Some(TilesetGroup {
                tilesets: vec![Tileset {
                    image: ImageRef::new("tiles.png"),
                }],
            }),
        },
    ];

    builder(loader).generate(&mut palette, &jobs).unwrap();

    let names: Vec<&str> = palette.images.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["bg", "tiles"]);
    assert_eq!(palette.num_entries, 2);
    assert_eq!(palette.holes(), 0);
}

#[test]
fn test_builtin_bypass_produces_full_reference_table() {
    for name in ["xlibc", "rgb332"] {
        // Builtin names ignore fixed entries and images entirely
        let mut palette = Palette::new(name);
        palette.add_fixed_color(FixedColor::new(0, Rgba::opaque(9, 9, 9), true));
        palette.add_image(ImageRef::new("never-loaded.png"));

        builder(MemoryLoader::new())
            .generate(&mut palette, &[])
            .unwrap();

        assert_eq!(palette.num_entries, PALETTE_MAX_ENTRIES);
        assert_eq!(palette.holes(), 0);
        assert_eq!(
            palette.entries[0],
            Some(palette.mode.convert(Rgba::opaque(0, 0, 0)))
        );
        assert_eq!(
            palette.entries[255],
            Some(palette.mode.convert(Rgba::opaque(255, 255, 255)))
        );
    }
}

#[test]
fn test_builtin_second_entries_differ_between_tables() {
    let mut xlibc = Palette::new("xlibc");
    builder(MemoryLoader::new())
        .generate(&mut xlibc, &[])
        .unwrap();
    assert_eq!(
        xlibc.entries[1],
        Some(xlibc.mode.convert(Rgba::opaque(0x00, 0x20, 0x08)))
    );

    let mut rgb332 = Palette::new("rgb332");
    builder(MemoryLoader::new())
        .generate(&mut rgb332, &[])
        .unwrap();
    assert_eq!(
        rgb332.entries[1],
        Some(rgb332.mode.convert(Rgba::opaque(0x00, 0x00, 0x68)))
    );
}

#[test]
fn test_images_processed_in_registration_order() {
    // More distinct colors than the budget: the mock keeps first-seen,
    // so only the first image's colors survive a budget of 2
    let mut loader = MemoryLoader::new();
    loader.insert("first.png", &[Rgba::opaque(10, 0, 0), Rgba::opaque(20, 0, 0)]);
    loader.insert("second.png", &[Rgba::opaque(30, 0, 0), Rgba::opaque(40, 0, 0)]);

    let mut palette = Palette::new("ordered").with_max_entries(2);
    palette.add_image(ImageRef::new("first.png"));
    palette.add_image(ImageRef::new("second.png"));

    builder(loader).generate(&mut palette, &[]).unwrap();

    let mode = palette.mode;
    assert_eq!(palette.num_entries, 2);
    assert_eq!(palette.entries[0], Some(mode.convert(Rgba::opaque(10, 0, 0))));
    assert_eq!(palette.entries[1], Some(mode.convert(Rgba::opaque(20, 0, 0))));
}
