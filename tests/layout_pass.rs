//! End-to-end layout passes over an in-memory view hierarchy.
//!
//! Exercises the full path a host takes:
//! - manage views (`ShadowTree::attach_view`)
//! - style their nodes
//! - `LayoutApplier::apply_layout` (synchronize → solve → frames)
//! - read frames back from the `ViewArena`
//!
//! Run with: cargo test --test layout_pass -- --nocapture

use std::thread;

use flex_shadow::{
    Align, Dimension, Display, DisplayType, Edge, EdgeInsets, FlexDirection, Flexibility,
    FrameReport, FrameUpdate, LayoutApplier, LayoutDirection, LayoutMetrics, NodeStyle, Point,
    Rect, ShadowTree, Size, ViewArena, ViewHost, ViewId, ViewKind,
};

// =============================================================================
// HELPERS
// =============================================================================

struct Scene {
    tree: ShadowTree,
    host: ViewArena,
    applier: LayoutApplier,
    root: ViewId,
}

fn setup() -> Scene {
    let _ = env_logger::builder().is_test(true).try_init();

    let tree = ShadowTree::new();
    let mut host = ViewArena::new();
    let root = host.add_view(ViewKind::Plain, Rect::new(0.0, 0.0, 440.0, 440.0));
    let applier = LayoutApplier::for_tree(&tree);
    let mut scene = Scene {
        tree,
        host,
        applier,
        root,
    };
    scene.tree.attach_view(root);
    scene
}

impl Scene {
    fn add(
        &mut self,
        parent: ViewId,
        kind: ViewKind,
        edit: impl FnOnce(&mut NodeStyle),
    ) -> ViewId {
        let view = self.host.add_view(kind, Rect::ZERO);
        self.host.add_subview(parent, view);
        let node = self.tree.attach_view(view);
        self.tree.update_style(node, edit).unwrap();
        view
    }

    fn style_root(&mut self, edit: impl FnOnce(&mut NodeStyle)) {
        let node = self.tree.view_node(self.root).unwrap();
        self.tree.update_style(node, edit).unwrap();
    }

    fn apply(&mut self) -> FrameReport {
        self.applier
            .apply_layout(
                &mut self.tree,
                &mut self.host,
                false,
                Flexibility::NONE,
                self.root,
            )
            .unwrap()
    }
}

struct Fixture {
    header: ViewId,
    main: ViewId,
    footer: ViewId,
    left: ViewId,
    center: ViewId,
    right: ViewId,
}

/// Column root, 10pt padding: header / main (row of three) / footer.
fn build_fixture(scene: &mut Scene) -> Fixture {
    scene.style_root(|style| {
        style.flex_direction = FlexDirection::Column;
        style.set_padding(Edge::All, Dimension::Points(10.0));
    });
    let root = scene.root;
    let header = scene.add(root, ViewKind::Content, |style| style.flex = Some(1.0));
    let main = scene.add(root, ViewKind::Plain, |style| {
        style.flex_direction = FlexDirection::Row;
        style.flex = Some(2.0);
        style.set_margin(Edge::Top, Dimension::Points(10.0));
        style.set_margin(Edge::Bottom, Dimension::Points(10.0));
    });
    let footer = scene.add(root, ViewKind::Content, |style| style.flex = Some(1.0));
    let left = scene.add(main, ViewKind::Content, |style| style.flex = Some(1.0));
    let center = scene.add(main, ViewKind::Content, |style| {
        style.flex = Some(2.0);
        style.set_margin(Edge::Left, Dimension::Points(10.0));
        style.set_margin(Edge::Right, Dimension::Points(10.0));
    });
    let right = scene.add(main, ViewKind::Content, |style| style.flex = Some(1.0));
    Fixture {
        header,
        main,
        footer,
        left,
        center,
        right,
    }
}

// =============================================================================
// FULL PASS
// =============================================================================

#[test]
fn test_fixture_frames_are_relative_to_superview() {
    let mut scene = setup();
    let fixture = build_fixture(&mut scene);

    let report = scene.apply();
    assert_eq!(report.applied, 7);
    assert_eq!(report.skipped, 0);

    let host = &scene.host;
    assert_eq!(host.frame(scene.root), Rect::new(0.0, 0.0, 440.0, 440.0));
    assert_eq!(host.frame(fixture.header), Rect::new(10.0, 10.0, 420.0, 100.0));
    assert_eq!(host.frame(fixture.main), Rect::new(10.0, 120.0, 420.0, 200.0));
    assert_eq!(host.frame(fixture.footer), Rect::new(10.0, 330.0, 420.0, 100.0));
    assert_eq!(host.frame(fixture.left), Rect::new(0.0, 0.0, 100.0, 200.0));
    assert_eq!(host.frame(fixture.center), Rect::new(110.0, 0.0, 200.0, 200.0));
    assert_eq!(host.frame(fixture.right), Rect::new(320.0, 0.0, 100.0, 200.0));

    let tree = &scene.tree;
    let root_node = tree.view_node(scene.root).unwrap();
    let center_node = tree.view_node(fixture.center).unwrap();
    assert_eq!(
        tree.measure_layout_relative_to_ancestor(center_node, root_node),
        Some(Rect::new(120.0, 120.0, 200.0, 200.0))
    );
    assert_eq!(tree.padding_as_insets(root_node), Some(EdgeInsets::uniform(10.0)));
}

#[test]
fn test_second_pass_writes_no_frames() {
    let mut scene = setup();
    build_fixture(&mut scene);

    scene.apply();
    let writes = scene.host.frame_writes();

    assert_eq!(scene.apply(), FrameReport::default());
    assert_eq!(scene.host.frame_writes(), writes);
}

#[test]
fn test_new_child_is_the_only_frame_written() {
    let mut scene = setup();
    let fixture = build_fixture(&mut scene);
    scene.apply();

    let badge = scene.add(fixture.center, ViewKind::Content, |style| {
        style.height = Dimension::Points(10.0)
    });
    let report = scene.apply();

    assert_eq!(report.applied, 1);
    assert_eq!(scene.host.frame(badge), Rect::new(0.0, 0.0, 200.0, 10.0));
    assert_eq!(scene.host.frame(fixture.center), Rect::new(110.0, 0.0, 200.0, 200.0));
}

#[test]
fn test_ancestor_outside_the_chain_is_rejected() {
    let mut scene = setup();
    let fixture = build_fixture(&mut scene);
    scene.apply();

    let tree = &scene.tree;
    let header = tree.view_node(fixture.header).unwrap();
    let left = tree.view_node(fixture.left).unwrap();
    assert_eq!(tree.measure_layout_relative_to_ancestor(left, header), None);
    assert!(!tree.is_descendant_of(left, header));
}

// =============================================================================
// LEAF MEASUREMENT
// =============================================================================

#[test]
fn test_leaves_measure_through_the_view() {
    let mut scene = setup();
    scene.style_root(|style| style.align_items = Align::FlexStart);
    let root = scene.root;
    let plain = scene.add(root, ViewKind::Plain, |_| {});
    scene.host.set_fitting_size(plain, Size::new(60.0, 20.0));
    let content = scene.add(root, ViewKind::Content, |_| {});
    scene.host.set_fitting_size(content, Size::new(80.0, 30.0));

    scene.apply();

    assert_eq!(scene.host.frame(plain), Rect::new(0.0, 0.0, 60.0, 20.0));
    // Content views without children report no natural size.
    assert_eq!(scene.host.frame(content), Rect::new(0.0, 20.0, 0.0, 0.0));
}

#[test]
fn test_display_none_hides_view() {
    let mut scene = setup();
    let root = scene.root;
    let gone = scene.add(root, ViewKind::Content, |style| {
        style.display = Display::None;
        style.height = Dimension::Points(40.0);
    });
    let shown = scene.add(root, ViewKind::Content, |style| {
        style.height = Dimension::Points(40.0)
    });

    scene.apply();

    assert!(scene.host.is_hidden(gone));
    assert!(!scene.host.is_hidden(shown));
    assert_eq!(scene.host.frame(shown), Rect::new(0.0, 0.0, 440.0, 40.0));
}

// =============================================================================
// RECONCILIATION
// =============================================================================

#[test]
fn test_unmanaged_children_are_left_alone() {
    let mut scene = setup();
    let root = scene.root;
    let managed = scene.add(root, ViewKind::Content, |style| {
        style.height = Dimension::Points(50.0)
    });
    let unmanaged = scene
        .host
        .add_view(ViewKind::Content, Rect::new(5.0, 5.0, 10.0, 10.0));
    scene.host.add_subview(root, unmanaged);

    scene.apply();

    assert_eq!(scene.host.frame(managed), Rect::new(0.0, 0.0, 440.0, 50.0));
    assert_eq!(scene.host.frame(unmanaged), Rect::new(5.0, 5.0, 10.0, 10.0));
}

#[test]
fn test_detaching_last_child_turns_root_into_leaf() {
    let mut scene = setup();
    let root = scene.root;
    let child = scene.add(root, ViewKind::Content, |style| {
        style.height = Dimension::Points(50.0)
    });
    scene.apply();
    let root_node = scene.tree.view_node(root).unwrap();
    assert_eq!(scene.tree.subviews(root_node).len(), 1);

    scene.tree.detach_view(child);
    scene.apply();

    assert!(scene.tree.subviews(root_node).is_empty());
    assert_eq!(scene.host.frame(root), Rect::new(0.0, 0.0, 440.0, 440.0));
}

#[test]
fn test_reordered_views_swap_positions() {
    let mut scene = setup();
    let root = scene.root;
    let first = scene.add(root, ViewKind::Content, |style| {
        style.height = Dimension::Points(30.0)
    });
    let second = scene.add(root, ViewKind::Content, |style| {
        style.height = Dimension::Points(50.0)
    });
    scene.apply();
    assert_eq!(scene.host.frame(second).origin.y, 30.0);

    scene.host.insert_subview(root, second, 0);
    let report = scene.apply();

    assert_eq!(report.applied, 2);
    assert_eq!(scene.host.frame(second), Rect::new(0.0, 0.0, 440.0, 50.0));
    assert_eq!(scene.host.frame(first), Rect::new(0.0, 50.0, 440.0, 30.0));
}

// =============================================================================
// THREADING
// =============================================================================

#[test]
fn test_apply_layout_off_the_ui_thread_panics() {
    let Scene {
        mut tree,
        mut host,
        mut applier,
        root,
    } = setup();

    let result = thread::spawn(move || {
        applier
            .apply_layout(&mut tree, &mut host, false, Flexibility::NONE, root)
            .map(|_| ())
    })
    .join();

    assert!(result.is_err());
}

#[test]
fn test_frames_queued_from_worker_drain_in_order() {
    let mut scene = setup();
    let root = scene.root;
    let child = scene.add(root, ViewKind::Content, |style| {
        style.height = Dimension::Points(30.0)
    });
    scene.apply();

    let metrics = |frame: Rect| LayoutMetrics {
        frame,
        content_frame: Rect::from_origin_size(Point::ZERO, frame.size),
        border: EdgeInsets::uniform(0.0),
        display_type: DisplayType::Flex,
        layout_direction: LayoutDirection::LeftToRight,
    };
    let sender = scene.applier.frame_sender();
    let updates = [
        Rect::new(1.0, 0.0, 10.0, 10.0),
        Rect::new(f32::NAN, 0.0, 10.0, 10.0),
        Rect::new(3.0, 0.0, 10.0, 10.0),
    ]
    .map(|frame| FrameUpdate {
        view: child,
        metrics: metrics(frame),
        preserve_origin: false,
    });

    thread::spawn(move || {
        for update in updates {
            assert!(sender.send(update));
        }
    })
    .join()
    .unwrap();

    assert_eq!(scene.applier.dispatcher().pending(), 3);
    let report = scene.applier.dispatcher().drain(&mut scene.host);

    assert_eq!(report.applied, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(scene.applier.dispatcher().pending(), 0);
    assert_eq!(scene.host.frame(child), Rect::new(3.0, 0.0, 10.0, 10.0));
}
