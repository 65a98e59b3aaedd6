use egui::{pos2, vec2, Color32};
use mathboard::controller::{Controller, ControllerState, PointerEvent, Redraw};
use mathboard::geometry::hit_testing::{hit_test, HIT_TOLERANCE};
use mathboard::tool::{Tool, ToolContext};
use mathboard::{ActionLog, EquationAction, LineAction, LineTool, RasterImage};

fn line(a: (f32, f32), b: (f32, f32)) -> LineAction {
    LineAction::new(
        LineTool::Pencil,
        Color32::BLACK,
        5.0,
        pos2(a.0, a.1),
        pos2(b.0, b.1),
    )
}

#[test]
fn test_hit_within_tolerance_selects() {
    let mut log = ActionLog::new();
    log.append(line((100.0, 100.0), (200.0, 100.0)));

    // Exactly on an endpoint, and HIT_TOLERANCE px away from one.
    assert_eq!(hit_test(&log, pos2(100.0, 100.0)), Some(0));
    assert_eq!(hit_test(&log, pos2(200.0, 100.0 + HIT_TOLERANCE)), Some(0));
}

#[test]
fn test_hit_beyond_tolerance_selects_nothing() {
    let mut log = ActionLog::new();
    log.append(line((100.0, 100.0), (200.0, 100.0)));

    assert_eq!(hit_test(&log, pos2(100.0, 111.0)), None);
    assert_eq!(hit_test(&log, pos2(300.0, 300.0)), None);
}

#[test]
fn test_hit_prefers_most_recent_action() {
    let mut log = ActionLog::new();
    log.append(line((100.0, 100.0), (200.0, 100.0)));
    log.append(line((100.0, 100.0), (100.0, 200.0)));

    // Both share the endpoint (100, 100); the newer one wins.
    assert_eq!(hit_test(&log, pos2(100.0, 100.0)), Some(1));
}

#[test]
fn test_hit_skips_equations() {
    let mut log = ActionLog::new();
    log.append(EquationAction::place(
        RasterImage::new([4, 4], vec![Color32::BLACK; 16]),
        vec2(4.0, 4.0),
        pos2(100.0, 100.0),
        2.0,
    ));
    log.append(line((100.0, 100.0), (200.0, 100.0)));

    // A press inside the equation rect finds the line, not the equation.
    assert_eq!(hit_test(&log, pos2(101.0, 101.0)), Some(1));

    let mut only_equation = ActionLog::new();
    only_equation.append(EquationAction::place(
        RasterImage::new([4, 4], vec![Color32::BLACK; 16]),
        vec2(4.0, 4.0),
        pos2(100.0, 100.0),
        2.0,
    ));
    assert_eq!(hit_test(&only_equation, pos2(101.0, 101.0)), None);
}

#[test]
fn test_selection_drag_translates_whole_action() {
    let mut controller = Controller::new();
    let ctx = ToolContext::default().with_tool(Tool::Selection);
    let mut log = ActionLog::new();
    log.append(line((100.0, 100.0), (200.0, 100.0)));

    // Grab near the start, drag in two steps.
    let _ = controller.handle_event(PointerEvent::Pressed(pos2(103.0, 104.0)), &ctx, &mut log);
    assert!(matches!(
        controller.state(),
        ControllerState::Dragging { index: 0, .. }
    ));

    assert_eq!(
        controller.handle_event(PointerEvent::Moved(pos2(113.0, 104.0)), &ctx, &mut log),
        Redraw::Full
    );
    assert_eq!(
        controller.handle_event(PointerEvent::Moved(pos2(113.0, 124.0)), &ctx, &mut log),
        Redraw::Full
    );
    let _ = controller.handle_event(PointerEvent::Released, &ctx, &mut log);

    // Net pointer travel (+10, +20) moved both endpoints by the same delta.
    let moved = log.get(0).unwrap().as_line().unwrap();
    assert_eq!(moved.start, pos2(110.0, 120.0));
    assert_eq!(moved.end, pos2(210.0, 120.0));
    assert_eq!(controller.state(), &ControllerState::Idle);
}

#[test]
fn test_selection_press_on_empty_space_is_a_no_op() {
    let mut controller = Controller::new();
    let ctx = ToolContext::default().with_tool(Tool::Selection);
    let mut log = ActionLog::new();
    log.append(line((100.0, 100.0), (200.0, 100.0)));

    let _ = controller.handle_event(PointerEvent::Pressed(pos2(300.0, 300.0)), &ctx, &mut log);
    assert_eq!(controller.state(), &ControllerState::Idle);

    let _ = controller.handle_event(PointerEvent::Moved(pos2(310.0, 310.0)), &ctx, &mut log);
    let unchanged = log.get(0).unwrap().as_line().unwrap();
    assert_eq!(unchanged.start, pos2(100.0, 100.0));
    assert_eq!(unchanged.end, pos2(200.0, 100.0));
}
