use archviz_studio::mask::{Brush, MaskSurface, MaskUpdate};
use egui::{Color32, Pos2, Rect, Vec2};

const RED: [u8; 4] = [0xef, 0x44, 0x44, 255];

// Surface over a `w` x `h` raster displayed at `scale` display units per pixel
fn authoring_surface(w: u32, h: u32, display_per_pixel: f32) -> MaskSurface {
    let mut surface = MaskSurface::new(Brush::default());
    surface.attach(Some((w, h)));
    surface.set_display_rect(Rect::from_min_size(
        Pos2::new(10.0, 20.0),
        Vec2::new(w as f32 * display_per_pixel, h as f32 * display_per_pixel),
    ));
    assert!(surface.set_authoring(true).is_none());
    surface
}

fn stroke(surface: &mut MaskSurface, from: Pos2, to: Pos2) -> MaskUpdate {
    surface.pointer_down(from);
    surface.pointer_move(to);
    surface.pointer_up().unwrap().expect("stroke should publish")
}

#[test]
fn test_display_centre_maps_to_raster_centre() {
    for display_per_pixel in [0.5, 1.0, 2.0] {
        let mut surface = authoring_surface(100, 80, display_per_pixel);
        let rect = surface.mapping().unwrap().display_rect();

        surface.set_brush_size(4.0);
        surface.pointer_down(rect.center());
        surface.pointer_up().unwrap();

        let raster = surface.raster().unwrap();
        assert_eq!(raster.pixel(50, 40), Some(RED), "scale {}", display_per_pixel);
        assert_eq!(raster.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(raster.pixel(99, 79), Some([0, 0, 0, 0]));
    }
}

#[test]
fn test_brush_width_scales_horizontally() {
    let surface = authoring_surface(200, 100, 0.5);
    let mapping = surface.mapping().unwrap();
    assert_eq!(mapping.scale(), Vec2::new(2.0, 2.0));
    assert_eq!(mapping.brush_width(20.0), 40.0);
}

#[test]
fn test_mask_published_only_when_stroke_ends() {
    let mut surface = authoring_surface(64, 64, 1.0);

    surface.pointer_down(Pos2::new(20.0, 30.0));
    surface.pointer_move(Pos2::new(40.0, 30.0));
    assert!(surface.mode().is_stroking());
    assert!(surface.history().is_empty());

    let update = surface.pointer_up().unwrap();
    let Some(MaskUpdate::Updated(snapshot)) = update else {
        panic!("expected an updated mask, got {:?}", update);
    };
    assert_eq!(snapshot.size(), (64, 64));
    assert!(snapshot.to_data_uri().starts_with("data:image/png;base64,"));
    assert_eq!(surface.history().len(), 1);

    // Releasing again without a stroke publishes nothing
    assert!(surface.pointer_up().unwrap().is_none());
}

#[test]
fn test_pointer_leave_ends_stroke() {
    let mut surface = authoring_surface(32, 32, 1.0);
    surface.pointer_down(Pos2::new(15.0, 25.0));
    let update = surface.pointer_leave().unwrap();
    assert!(matches!(update, Some(MaskUpdate::Updated(_))));
    assert!(!surface.mode().is_stroking());
}

#[test]
fn test_undo_restores_previous_pixels_exactly() {
    let mut surface = authoring_surface(80, 60, 1.0);

    stroke(&mut surface, Pos2::new(15.0, 30.0), Pos2::new(60.0, 40.0));
    let after_first = surface.raster().unwrap().clone();

    stroke(&mut surface, Pos2::new(70.0, 25.0), Pos2::new(30.0, 70.0));
    assert_ne!(surface.raster().unwrap(), &after_first);

    let update = surface.undo().unwrap();
    assert!(matches!(update, Some(MaskUpdate::Updated(_))));
    assert_eq!(surface.raster().unwrap(), &after_first);

    // Undoing the only stroke clears the mask entirely
    assert_eq!(surface.undo().unwrap(), Some(MaskUpdate::Cleared));
    assert!(surface.raster().unwrap().is_blank());

    // Nothing left to undo
    assert_eq!(surface.undo().unwrap(), None);
}

#[test]
fn test_no_raster_means_no_op() {
    let mut surface = MaskSurface::new(Brush::default());
    surface.attach(None);
    surface.set_display_rect(Rect::from_min_size(Pos2::ZERO, Vec2::splat(100.0)));
    surface.set_authoring(true);

    surface.pointer_down(Pos2::new(50.0, 50.0));
    surface.pointer_move(Pos2::new(60.0, 60.0));
    assert!(surface.pointer_up().unwrap().is_none());
    assert!(surface.raster().is_none());
    assert!(surface.history().is_empty());
}

#[test]
fn test_zero_size_display_is_no_op() {
    let mut surface = MaskSurface::new(Brush::default());
    surface.attach(Some((50, 50)));
    surface.set_display_rect(Rect::from_min_size(Pos2::ZERO, Vec2::ZERO));
    surface.set_authoring(true);

    surface.pointer_down(Pos2::ZERO);
    assert!(surface.pointer_up().unwrap().is_none());
    assert!(surface.raster().unwrap().is_blank());
}

#[test]
fn test_idle_surface_ignores_pointer() {
    let mut surface = authoring_surface(40, 40, 1.0);
    surface.set_authoring(false);

    surface.pointer_down(Pos2::new(20.0, 30.0));
    assert!(surface.pointer_up().unwrap().is_none());
    assert!(surface.raster().unwrap().is_blank());
}

#[test]
fn test_leaving_authoring_clears_mask() {
    let mut surface = authoring_surface(40, 40, 1.0);
    surface.set_brush_color(Color32::from_rgb(0, 0, 255));
    stroke(&mut surface, Pos2::new(20.0, 30.0), Pos2::new(30.0, 40.0));
    assert!(!surface.raster().unwrap().is_blank());

    assert_eq!(surface.set_authoring(false), Some(MaskUpdate::Cleared));
    assert!(surface.raster().unwrap().is_blank());
    assert!(surface.history().is_empty());
}

#[test]
fn test_undo_mid_stroke_wipes_uncommitted_pixels() {
    let mut surface = authoring_surface(64, 64, 1.0);

    // First stroke never released
    surface.pointer_down(Pos2::new(20.0, 30.0));
    surface.pointer_move(Pos2::new(40.0, 50.0));
    assert!(!surface.raster().unwrap().is_blank());

    assert_eq!(surface.undo().unwrap(), None);
    assert!(surface.raster().unwrap().is_blank());
    assert!(!surface.mode().is_stroking());
    assert!(surface.history().is_empty());
}

#[test]
fn test_undo_mid_stroke_keeps_committed_strokes() {
    let mut surface = authoring_surface(64, 64, 1.0);
    stroke(&mut surface, Pos2::new(15.0, 25.0), Pos2::new(30.0, 25.0));
    let committed = surface.raster().unwrap().clone();

    surface.pointer_down(Pos2::new(50.0, 60.0));
    surface.pointer_move(Pos2::new(70.0, 80.0));
    assert_ne!(surface.raster().unwrap(), &committed);

    assert_eq!(surface.undo().unwrap(), None);
    assert_eq!(surface.raster().unwrap(), &committed);
    assert_eq!(surface.history().len(), 1);

    // The next undo removes the committed stroke as usual
    assert_eq!(surface.undo().unwrap(), Some(MaskUpdate::Cleared));
}
