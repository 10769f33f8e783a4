//! Selection state machine
//!
//! `transition` is a pure function of the current state, one event and the
//! container environment. It returns the next state together with the effects
//! the presentation layer should apply (redraws, cursor changes, toolbar
//! visibility, handing the region to the annotation canvas, exit).
//!
//! Modes:
//! - `Select`: hover snaps to window candidates, drag draws a fresh region
//! - `WaitEdit`: a region exists; handles resize it, the body moves it
//! - `Resizing` / `Move`: gesture sub-states, always return to `WaitEdit`
//! - `Edit`: region frozen, pointer input belongs to the annotation canvas

use crate::domain::{Cursor, CursorTarget, HitTarget, Mode, Point, Rect, ResizeHandle, Size};
use crate::render::geometry::{
    fixed_point_for_handle, hit_test, match_window, rect_for_resize, rect_from_drag,
};
use crate::session::messages::{Effect, SelectionEvent};

/// Everything the selection controller remembers between events
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub mode: Mode,
    /// Current selection in container coordinates
    pub selection: Rect,
    /// A manual drag is in progress in `Select` mode
    pub is_selecting: bool,
    /// Pointer position the current gesture deltas are measured from
    pub start: Point,
    /// Resize anchor, or the selection origin snapshot while moving
    pub fixed: Point,
    /// Selection size snapshot taken at gesture start
    pub fixed_size: Size,
    /// Handle being dragged in `Resizing` mode
    pub handle: Option<ResizeHandle>,
}

/// Read-only inputs of a transition
#[derive(Debug, Clone, Copy)]
pub struct Environment<'a> {
    /// Overlay container size in logical pixels
    pub container: Size,
    /// Window candidates in priority order
    pub windows: &'a [Rect],
}

/// Result of one transition
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: SelectionState,
    pub effects: Vec<Effect>,
}

/// Cursors a mode asks for when it is entered
fn mode_cursors(mode: Mode, handle: Option<ResizeHandle>) -> Vec<Effect> {
    let set = |target, cursor| Effect::SetCursor { target, cursor };
    match (mode, handle) {
        (Mode::WaitEdit, _) => vec![
            set(CursorTarget::Container, Cursor::Default),
            set(CursorTarget::Selection, Cursor::Move),
        ],
        (Mode::Move, _) => vec![set(CursorTarget::Container, Cursor::Move)],
        (Mode::Edit, _) => vec![
            set(CursorTarget::Container, Cursor::Default),
            set(CursorTarget::Selection, Cursor::Crosshair),
        ],
        (Mode::Resizing, Some(handle)) => vec![
            set(CursorTarget::Container, handle.cursor()),
            set(CursorTarget::Selection, handle.cursor()),
        ],
        (Mode::Resizing, None) | (Mode::Select, _) => Vec::new(),
    }
}

fn enter(next: &mut SelectionState, mode: Mode, effects: &mut Vec<Effect>) {
    if next.mode != mode {
        next.mode = mode;
        effects.extend(mode_cursors(mode, next.handle));
    }
}

/// Compute the next state and its effects
pub fn transition(
    state: &SelectionState,
    event: SelectionEvent,
    env: &Environment<'_>,
) -> Transition {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match event {
        SelectionEvent::Cancel => effects.push(Effect::Exit),
        _ if state.mode == Mode::Edit => {}
        SelectionEvent::EnterEdit => {
            // the frozen region must lie on the screenshot
            let frozen = state.selection.clip_to(env.container);
            if frozen.is_empty() {
                log::debug!("Ignoring edit request for empty selection");
            } else {
                next.selection = frozen;
                next.is_selecting = false;
                next.handle = None;
                enter(&mut next, Mode::Edit, &mut effects);
                effects.push(Effect::ToolbarVisible(true));
                effects.push(Effect::BeginAnnotation(next.selection));
            }
        }
        SelectionEvent::PointerDown(pos) => pointer_down(&mut next, pos, &mut effects),
        SelectionEvent::PointerMove(pos) => pointer_move(&mut next, pos, env, &mut effects),
        SelectionEvent::PointerUp(pos) => pointer_up(&mut next, pos, env, &mut effects),
        SelectionEvent::PointerLeave(pos) => pointer_leave(&mut next, pos, env, &mut effects),
    }

    Transition {
        state: next,
        effects,
    }
}

fn pointer_down(next: &mut SelectionState, pos: Point, effects: &mut Vec<Effect>) {
    let hit = hit_test(next.selection, pos);
    effects.push(Effect::ToolbarVisible(
        next.mode == Mode::WaitEdit && hit == HitTarget::Outside,
    ));

    if next.mode == Mode::Select {
        next.is_selecting = true;
        next.start = pos;
        return;
    }

    match hit {
        HitTarget::Handle(handle) => {
            next.handle = Some(handle);
            next.start = pos;
            next.fixed = fixed_point_for_handle(handle, next.selection);
            next.fixed_size = Size::new(next.selection.width, next.selection.height);
            // a new handle always re-announces its cursor
            next.mode = Mode::Resizing;
            effects.extend(mode_cursors(Mode::Resizing, Some(handle)));
        }
        HitTarget::Body => {
            next.handle = None;
            next.start = pos;
            next.fixed = next.selection.origin();
            next.fixed_size = Size::new(next.selection.width, next.selection.height);
            enter(next, Mode::Move, effects);
        }
        HitTarget::Outside => {}
    }
}

fn pointer_move(
    next: &mut SelectionState,
    pos: Point,
    env: &Environment<'_>,
    effects: &mut Vec<Effect>,
) {
    let container = env.container;
    match next.mode {
        Mode::Select if !next.is_selecting => {
            if let Some(window) = match_window(pos, env.windows)
                && *window != next.selection
            {
                next.selection = *window;
                effects.push(Effect::Redraw(next.selection));
            }
        }
        Mode::Select => {
            let (move_x, move_y) = pos.delta_from(next.start);
            next.selection = rect_from_drag(
                next.start.x,
                next.start.y,
                move_x,
                move_y,
                container.width,
                container.height,
            );
            effects.push(Effect::Redraw(next.selection));
        }
        Mode::Resizing => {
            let Some(handle) = next.handle else {
                return;
            };
            let (move_x, move_y) = pos.delta_from(next.start);
            next.selection = rect_for_resize(
                handle,
                next.fixed,
                next.fixed_size.width,
                next.fixed_size.height,
                move_x,
                move_y,
                container.width,
                container.height,
            );
            effects.push(Effect::Redraw(next.selection));
        }
        Mode::Move => {
            move_selection(next, pos, container);
            effects.push(Effect::Redraw(next.selection));
        }
        Mode::WaitEdit | Mode::Edit => {}
    }
}

/// Translate the selection by the pointer delta, sticking to container edges
///
/// When the translated selection would cross an edge, the anchor on that
/// axis is moved to the clamped position and the delta restarts from the
/// current pointer, so pulling back off the edge moves the selection at once.
fn move_selection(next: &mut SelectionState, pos: Point, container: Size) {
    let (move_x, move_y) = pos.delta_from(next.start);
    let width = next.fixed_size.width;
    let height = next.fixed_size.height;

    let left = next.fixed.x + move_x;
    let top = next.fixed.y + move_y;
    let clamped_left = left.min(container.width - width).max(0.0);
    let clamped_top = top.min(container.height - height).max(0.0);

    if clamped_left != left {
        next.fixed.x = clamped_left;
        next.start.x = pos.x;
    }
    if clamped_top != top {
        next.fixed.y = clamped_top;
        next.start.y = pos.y;
    }
    next.selection.x = clamped_left;
    next.selection.y = clamped_top;
}

fn pointer_up(
    next: &mut SelectionState,
    pos: Point,
    env: &Environment<'_>,
    effects: &mut Vec<Effect>,
) {
    match next.mode {
        Mode::Select => {
            next.is_selecting = false;
            let (move_x, move_y) = pos.delta_from(next.start);
            let dragged = rect_from_drag(
                next.start.x,
                next.start.y,
                move_x,
                move_y,
                env.container.width,
                env.container.height,
            );
            if !dragged.is_empty() {
                next.selection = dragged;
                enter(next, Mode::WaitEdit, effects);
            } else if let Some(window) = match_window(pos, env.windows) {
                // click: snap to the window under the pointer, keep selecting
                next.selection = *window;
                effects.push(Effect::Redraw(next.selection));
            }
            effects.push(Effect::ToolbarVisible(!next.selection.is_empty()));
        }
        Mode::WaitEdit | Mode::Resizing | Mode::Move => {
            next.handle = None;
            enter(next, Mode::WaitEdit, effects);
            effects.push(Effect::ToolbarVisible(true));
        }
        Mode::Edit => {}
    }
}

fn pointer_leave(
    next: &mut SelectionState,
    pos: Point,
    env: &Environment<'_>,
    effects: &mut Vec<Effect>,
) {
    if next.mode != Mode::Move {
        return;
    }
    let container = env.container;
    let sel = &mut next.selection;

    if pos.x > container.width {
        sel.x = container.width - sel.width;
    } else if pos.x < 0.0 {
        sel.x = 0.0;
    }
    if pos.y > container.height {
        sel.y = container.height - sel.height;
    } else if pos.y < 0.0 {
        sel.y = 0.0;
    }
    sel.x = sel.x.min(container.width - sel.width).max(0.0);
    sel.y = sel.y.min(container.height - sel.height).max(0.0);

    next.fixed = sel.origin();
    next.fixed_size = Size::new(sel.width, sel.height);
    next.start = pos;
    effects.push(Effect::Redraw(next.selection));
}

/// Owns the selection state and applies transitions in place
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    state: SelectionState,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: SelectionEvent, env: &Environment<'_>) -> Vec<Effect> {
        let Transition { state, effects } = transition(&self.state, event, env);
        if state.mode != self.state.mode {
            log::debug!("Selection mode {:?} -> {:?}", self.state.mode, state.mode);
        }
        self.state = state;
        effects
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn selection(&self) -> Rect {
        self.state.selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTAINER: Size = Size {
        width: 500.0,
        height: 500.0,
    };

    fn env(windows: &[Rect]) -> Environment<'_> {
        Environment {
            container: CONTAINER,
            windows,
        }
    }

    fn waiting_with(selection: Rect) -> SelectionController {
        SelectionController {
            state: SelectionState {
                mode: Mode::WaitEdit,
                selection,
                ..Default::default()
            },
        }
    }

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_drag_selects_region() {
        let mut ctl = SelectionController::new();
        let env = env(&[]);
        ctl.handle(SelectionEvent::PointerDown(p(10.0, 10.0)), &env);
        ctl.handle(SelectionEvent::PointerMove(p(110.0, 60.0)), &env);
        let effects = ctl.handle(SelectionEvent::PointerUp(p(110.0, 60.0)), &env);

        assert_eq!(ctl.selection(), Rect::new(10.0, 10.0, 100.0, 50.0));
        assert_eq!(ctl.mode(), Mode::WaitEdit);
        assert!(effects.contains(&Effect::SetCursor {
            target: CursorTarget::Selection,
            cursor: Cursor::Move,
        }));
        assert!(effects.contains(&Effect::ToolbarVisible(true)));
    }

    #[test]
    fn test_reverse_drag_normalizes() {
        let mut ctl = SelectionController::new();
        let env = env(&[]);
        ctl.handle(SelectionEvent::PointerDown(p(200.0, 150.0)), &env);
        ctl.handle(SelectionEvent::PointerMove(p(120.0, 100.0)), &env);
        ctl.handle(SelectionEvent::PointerUp(p(120.0, 100.0)), &env);
        assert_eq!(ctl.selection(), Rect::new(120.0, 100.0, 80.0, 50.0));
    }

    #[test]
    fn test_click_snaps_to_window_and_stays_selecting() {
        let windows = [Rect::new(0.0, 0.0, 200.0, 200.0)];
        let mut ctl = SelectionController::new();
        let env = env(&windows);
        ctl.handle(SelectionEvent::PointerDown(p(50.0, 50.0)), &env);
        let effects = ctl.handle(SelectionEvent::PointerUp(p(50.0, 50.0)), &env);

        assert_eq!(ctl.selection(), Rect::new(0.0, 0.0, 200.0, 200.0));
        assert_eq!(ctl.mode(), Mode::Select);
        assert!(!ctl.state().is_selecting);
        assert!(effects.contains(&Effect::Redraw(windows[0])));
    }

    #[test]
    fn test_click_outside_windows_selects_nothing() {
        let windows = [Rect::new(0.0, 0.0, 200.0, 200.0)];
        let mut ctl = SelectionController::new();
        let env = env(&windows);
        ctl.handle(SelectionEvent::PointerDown(p(300.0, 300.0)), &env);
        let effects = ctl.handle(SelectionEvent::PointerUp(p(300.0, 300.0)), &env);
        assert!(ctl.selection().is_empty());
        assert_eq!(ctl.mode(), Mode::Select);
        assert!(effects.contains(&Effect::ToolbarVisible(false)));
    }

    #[test]
    fn test_hover_previews_window_but_drag_wins() {
        let windows = [
            Rect::new(20.0, 20.0, 100.0, 100.0),
            Rect::new(0.0, 0.0, 500.0, 500.0),
        ];
        let mut ctl = SelectionController::new();
        let env = env(&windows);

        let effects = ctl.handle(SelectionEvent::PointerMove(p(50.0, 50.0)), &env);
        assert_eq!(effects, vec![Effect::Redraw(windows[0])]);
        // same window again: nothing to redraw
        assert!(
            ctl.handle(SelectionEvent::PointerMove(p(51.0, 50.0)), &env)
                .is_empty()
        );
        ctl.handle(SelectionEvent::PointerMove(p(300.0, 300.0)), &env);
        assert_eq!(ctl.selection(), windows[1]);

        ctl.handle(SelectionEvent::PointerDown(p(300.0, 300.0)), &env);
        ctl.handle(SelectionEvent::PointerMove(p(50.0, 50.0)), &env);
        assert_eq!(ctl.selection(), Rect::new(50.0, 50.0, 250.0, 250.0));
    }

    #[test]
    fn test_resize_bottom_right_handle() {
        let mut ctl = waiting_with(Rect::new(100.0, 100.0, 50.0, 50.0));
        let env = env(&[]);
        let effects = ctl.handle(SelectionEvent::PointerDown(p(150.0, 150.0)), &env);
        assert_eq!(ctl.mode(), Mode::Resizing);
        assert_eq!(ctl.state().handle, Some(ResizeHandle::SE));
        assert!(effects.contains(&Effect::SetCursor {
            target: CursorTarget::Container,
            cursor: Cursor::ResizeNwse,
        }));

        ctl.handle(SelectionEvent::PointerMove(p(170.0, 160.0)), &env);
        assert_eq!(ctl.selection(), Rect::new(100.0, 100.0, 70.0, 60.0));
        ctl.handle(SelectionEvent::PointerUp(p(170.0, 160.0)), &env);
        assert_eq!(ctl.mode(), Mode::WaitEdit);
        assert_eq!(ctl.state().handle, None);
    }

    #[test]
    fn test_resize_edge_handle_keeps_other_axis() {
        let mut ctl = waiting_with(Rect::new(100.0, 100.0, 80.0, 60.0));
        let env = env(&[]);
        ctl.handle(SelectionEvent::PointerDown(p(140.0, 100.0)), &env);
        assert_eq!(ctl.state().handle, Some(ResizeHandle::N));
        ctl.handle(SelectionEvent::PointerMove(p(190.0, 70.0)), &env);
        assert_eq!(ctl.selection(), Rect::new(100.0, 70.0, 80.0, 90.0));
    }

    #[test]
    fn test_handle_beats_body() {
        let mut ctl = waiting_with(Rect::new(100.0, 100.0, 200.0, 200.0));
        let env = env(&[]);
        // inside the body but within the corner grab square
        ctl.handle(SelectionEvent::PointerDown(p(105.0, 105.0)), &env);
        assert_eq!(ctl.mode(), Mode::Resizing);
        assert_eq!(ctl.state().handle, Some(ResizeHandle::NW));
    }

    #[test]
    fn test_move_translates_and_sticks_to_edges() {
        let mut ctl = waiting_with(Rect::new(100.0, 100.0, 50.0, 50.0));
        let env = env(&[]);
        let effects = ctl.handle(SelectionEvent::PointerDown(p(120.0, 120.0)), &env);
        assert_eq!(ctl.mode(), Mode::Move);
        assert!(effects.contains(&Effect::SetCursor {
            target: CursorTarget::Container,
            cursor: Cursor::Move,
        }));

        ctl.handle(SelectionEvent::PointerMove(p(150.0, 110.0)), &env);
        assert_eq!(ctl.selection(), Rect::new(130.0, 90.0, 50.0, 50.0));

        // push far past the right edge
        ctl.handle(SelectionEvent::PointerMove(p(700.0, 110.0)), &env);
        assert_eq!(ctl.selection(), Rect::new(450.0, 90.0, 50.0, 50.0));

        // pulling back moves away from the edge immediately
        ctl.handle(SelectionEvent::PointerMove(p(690.0, 110.0)), &env);
        assert_eq!(ctl.selection(), Rect::new(440.0, 90.0, 50.0, 50.0));

        ctl.handle(SelectionEvent::PointerUp(p(690.0, 110.0)), &env);
        assert_eq!(ctl.mode(), Mode::WaitEdit);
    }

    #[test]
    fn test_move_stays_inside_for_every_pointer() {
        let env = env(&[]);
        for (x, y) in [(-300.0, 20.0), (900.0, 900.0), (250.0, -40.0), (10.0, 480.0)] {
            let mut ctl = waiting_with(Rect::new(200.0, 200.0, 120.0, 80.0));
            ctl.handle(SelectionEvent::PointerDown(p(250.0, 250.0)), &env);
            ctl.handle(SelectionEvent::PointerMove(p(x, y)), &env);
            let sel = ctl.selection();
            assert!(sel.x >= 0.0 && sel.right() <= CONTAINER.width, "{sel:?}");
            assert!(sel.y >= 0.0 && sel.bottom() <= CONTAINER.height, "{sel:?}");
            assert_eq!((sel.width, sel.height), (120.0, 80.0));
        }
    }

    #[test]
    fn test_leave_while_moving_clamps_and_rebases() {
        let mut ctl = waiting_with(Rect::new(300.0, 100.0, 100.0, 50.0));
        let env = env(&[]);
        ctl.handle(SelectionEvent::PointerDown(p(350.0, 120.0)), &env);
        ctl.handle(SelectionEvent::PointerMove(p(420.0, 120.0)), &env);
        assert_eq!(ctl.selection().x, 370.0);

        ctl.handle(SelectionEvent::PointerLeave(p(510.0, 120.0)), &env);
        assert_eq!(ctl.selection(), Rect::new(400.0, 100.0, 100.0, 50.0));
        assert_eq!(ctl.state().fixed, p(400.0, 100.0));
        assert_eq!(ctl.state().start, p(510.0, 120.0));

        // re-entering continues from the clamped spot without a jump
        ctl.handle(SelectionEvent::PointerMove(p(490.0, 120.0)), &env);
        assert_eq!(ctl.selection().x, 380.0);
    }

    #[test]
    fn test_leave_outside_move_is_ignored() {
        let mut ctl = waiting_with(Rect::new(300.0, 100.0, 100.0, 50.0));
        let env = env(&[]);
        let effects = ctl.handle(SelectionEvent::PointerLeave(p(510.0, 120.0)), &env);
        assert!(effects.is_empty());
        assert_eq!(ctl.selection(), Rect::new(300.0, 100.0, 100.0, 50.0));
    }

    #[test]
    fn test_toolbar_visibility_on_pointer_down() {
        let mut ctl = waiting_with(Rect::new(100.0, 100.0, 50.0, 50.0));
        let env = env(&[]);
        let effects = ctl.handle(SelectionEvent::PointerDown(p(400.0, 400.0)), &env);
        assert_eq!(effects, vec![Effect::ToolbarVisible(true)]);
        assert_eq!(ctl.mode(), Mode::WaitEdit);

        let effects = ctl.handle(SelectionEvent::PointerDown(p(125.0, 125.0)), &env);
        assert_eq!(effects[0], Effect::ToolbarVisible(false));
    }

    #[test]
    fn test_enter_edit_freezes_selection() {
        let mut ctl = waiting_with(Rect::new(100.0, 100.0, 50.0, 50.0));
        let env = env(&[]);
        let effects = ctl.handle(SelectionEvent::EnterEdit, &env);
        assert_eq!(ctl.mode(), Mode::Edit);
        assert!(effects.contains(&Effect::BeginAnnotation(Rect::new(100.0, 100.0, 50.0, 50.0))));
        assert!(effects.contains(&Effect::SetCursor {
            target: CursorTarget::Selection,
            cursor: Cursor::Crosshair,
        }));

        // pointer input no longer touches the selection
        for event in [
            SelectionEvent::PointerDown(p(125.0, 125.0)),
            SelectionEvent::PointerMove(p(300.0, 300.0)),
            SelectionEvent::PointerUp(p(300.0, 300.0)),
            SelectionEvent::EnterEdit,
        ] {
            assert!(ctl.handle(event, &env).is_empty());
        }
        assert_eq!(ctl.selection(), Rect::new(100.0, 100.0, 50.0, 50.0));
        assert_eq!(ctl.mode(), Mode::Edit);
    }

    #[test]
    fn test_enter_edit_from_snapped_window() {
        let windows = [Rect::new(0.0, 0.0, 200.0, 200.0)];
        let mut ctl = SelectionController::new();
        let env = env(&windows);
        ctl.handle(SelectionEvent::PointerDown(p(50.0, 50.0)), &env);
        ctl.handle(SelectionEvent::PointerUp(p(50.0, 50.0)), &env);
        let effects = ctl.handle(SelectionEvent::EnterEdit, &env);
        assert!(effects.contains(&Effect::BeginAnnotation(windows[0])));
    }

    #[test]
    fn test_enter_edit_clips_selection_to_container() {
        // a drag that left the container through the top-left corner
        let mut ctl = waiting_with(Rect::new(-20.0, -10.0, 120.0, 60.0));
        let effects = ctl.handle(SelectionEvent::EnterEdit, &env(&[]));
        let frozen = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert!(effects.contains(&Effect::BeginAnnotation(frozen)));
        assert_eq!(ctl.selection(), frozen);

        let mut outside = waiting_with(Rect::new(510.0, 0.0, 40.0, 40.0));
        assert!(outside.handle(SelectionEvent::EnterEdit, &env(&[])).is_empty());
        assert_eq!(outside.mode(), Mode::WaitEdit);
    }

    #[test]
    fn test_enter_edit_needs_area() {
        let mut ctl = SelectionController::new();
        let effects = ctl.handle(SelectionEvent::EnterEdit, &env(&[]));
        assert!(effects.is_empty());
        assert_eq!(ctl.mode(), Mode::Select);
    }

    #[test]
    fn test_cancel_exits_from_any_mode() {
        let mut ctl = waiting_with(Rect::new(1.0, 1.0, 5.0, 5.0));
        let env = env(&[]);
        assert_eq!(ctl.handle(SelectionEvent::Cancel, &env), vec![Effect::Exit]);
        ctl.handle(SelectionEvent::EnterEdit, &env);
        assert_eq!(ctl.handle(SelectionEvent::Cancel, &env), vec![Effect::Exit]);
    }

    #[test]
    fn test_transition_is_pure() {
        let state = SelectionState::default();
        let env = env(&[]);
        let a = transition(&state, SelectionEvent::PointerDown(p(3.0, 4.0)), &env);
        let b = transition(&state, SelectionEvent::PointerDown(p(3.0, 4.0)), &env);
        assert_eq!(a, b);
        assert_eq!(state, SelectionState::default());
        assert!(a.state.is_selecting);
    }
}
