use std::time::Duration;

use pdf_inspector::coords::OriginMode;
use pdf_inspector::test_utils::{FakeBackend, FakePage, text_item};
use pdf_inspector::units::{Unit, UnitSet};
use pdf_inspector::viewer::{FontReport, ViewOptions, Viewer};

const TIMEOUT: Duration = Duration::from_secs(5);

fn open(pages: Vec<FakePage>) -> Viewer {
    let backend = FakeBackend::new().with_document(b"doc", pages);
    let mut viewer = Viewer::new(backend, ViewOptions::default());
    viewer.open_blocking(&b"doc"[..], TIMEOUT).unwrap();
    viewer
}

#[test]
fn zoom_controls_stay_in_range() {
    let mut viewer = open(vec![FakePage::letter()]);

    assert!(viewer.set_zoom(10.0).is_some());
    viewer.settle();
    assert_eq!(viewer.zoom_label(), "400%");
    assert!(viewer.zoom_in().is_none());

    assert!(viewer.set_zoom(0.1).is_some());
    viewer.settle();
    assert_eq!(viewer.zoom_label(), "25%");
    assert!(viewer.zoom_out().is_none());
}

#[test]
fn fit_to_width_then_reset_view() {
    let mut viewer = open(vec![FakePage::letter(), FakePage::letter()]);

    assert!(viewer.fit_to_width(1264.0).is_some());
    viewer.settle();
    assert_eq!(viewer.zoom_label(), "200%");
    assert_eq!(viewer.page_info().unwrap().size_label(), "1224 × 1584 px");

    viewer.go_to_page(2);
    viewer.settle();
    assert_eq!(viewer.page_label(), "2 / 2");

    assert!(viewer.reset_view().is_some());
    viewer.settle();
    assert_eq!(viewer.page_label(), "1 / 2");
    assert_eq!(viewer.zoom_label(), "100%");
}

#[test]
fn hover_and_click_follow_zoom() {
    let mut viewer = open(vec![
        FakePage::letter().with_text(vec![text_item(72.0, 700.0, 12.0, 5.0, "Arial-Italic")]),
    ]);
    viewer.set_origin(OriginMode::BottomLeft);
    viewer.set_zoom(2.0);
    viewer.settle();

    let readout = viewer.pointer_moved(144.0, 184.0).unwrap();
    let units = UnitSet::from_units([Unit::Pt, Unit::Mm]);
    assert_eq!(
        readout.lines(&units),
        vec!["X: 72.00 pt", "Y: 700.00 pt", "X: 25.40 mm", "Y: 246.94 mm"]
    );

    match viewer.clicked(144.0, 184.0) {
        FontReport::Found { font, position } => {
            assert_eq!(font.font_family, "Arial");
            assert!(font.is_italic());
            assert_eq!((position.x, position.y), (72.0, 700.0));
        }
        FontReport::NotFound { .. } => panic!("expected a font at the text origin"),
    }
}

#[test]
fn unit_toggles_change_readout_only() {
    let mut viewer = open(vec![FakePage::letter()]);
    viewer.toggle_unit(Unit::Inch);
    viewer.toggle_unit(Unit::Pt);

    let readout = viewer.pointer_moved(36.0, 72.0).unwrap();
    assert_eq!(
        readout.lines(&viewer.options().units),
        vec!["X: 0.50 in", "Y: 1.00 in"]
    );
    assert_eq!(readout.point().x, 36.0);
}

#[test]
fn close_then_open_again() {
    let mut viewer = open(vec![FakePage::letter()]);
    viewer.close();
    assert!(viewer.page_info().is_none());

    viewer.open(&b"doc"[..]);
    viewer.settle();
    assert_eq!(viewer.page_label(), "1 / 1");
    assert!(viewer.pointer_moved(10.0, 10.0).is_some());
}

#[test]
fn readout_matches_page_rendered_outside_the_session_scale() {
    let mut viewer = open(vec![
        FakePage::letter().with_text(vec![text_item(72.0, 700.0, 12.0, 5.0, "Helvetica")]),
    ]);
    assert_eq!(viewer.zoom_label(), "100%");

    let viewport = viewer
        .service_mut()
        .render_page_blocking(1, 2.0, TIMEOUT)
        .unwrap()
        .unwrap();
    assert_eq!(viewport.width_px, 1224.0);
    assert_eq!(viewer.session().page_size_pt(), (612.0, 792.0));

    let point = viewer.pointer_moved(1000.0, 184.0).unwrap().point();
    assert_eq!((point.x, point.y), (500.0, 92.0));

    match viewer.clicked(144.0, 184.0) {
        FontReport::Found { font, .. } => assert_eq!(font.font_family, "Helvetica"),
        FontReport::NotFound { .. } => panic!("expected a font at the text origin"),
    }
}

#[test]
fn readout_uses_displayed_frame_until_zoom_render_lands() {
    let mut viewer = open(vec![FakePage::letter()]);

    assert!(viewer.set_zoom(2.0).is_some());
    let point = viewer.pointer_moved(600.0, 100.0).unwrap().point();
    assert_eq!((point.x, point.y), (600.0, 100.0));

    viewer.settle();
    let point = viewer.pointer_moved(600.0, 100.0).unwrap().point();
    assert_eq!((point.x, point.y), (300.0, 50.0));
}
