//! Pointer-driven piece dragging.
//!
//! The controller tracks the pointer continuously but commits to the board
//! exactly once, on release. It never touches the engine: a drop is a
//! display-only edit that the next engine refresh replaces.

use crate::error::BoardError;
use crate::geometry::{BoardRect, Pixel};
use crate::{BoardState, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Grabbing,
    Dragging,
}

/// The one live drag. `position` is the dragged element's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession<E> {
    pub origin: Square,
    pub element: E,
    pub position: Pixel,
}

/// What the view layer has to do after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEffect<E> {
    Ignored,
    /// Detach `element` from its cell and draw it with its top-left at `at`.
    Float { element: E, at: Pixel },
    Reposition { element: E, at: Pixel },
    /// The session ended; redraw from the board. `result` is the outcome of
    /// the local move.
    Dropped {
        element: E,
        from: Square,
        to: Square,
        result: Result<(), BoardError>,
    },
    /// The session was abandoned; put `element` back on `origin`.
    Abandoned { element: E, origin: Square },
}

/// Drag state machine, generic over the handle the view uses for piece
/// elements.
#[derive(Debug, Clone)]
pub struct DragController<E> {
    rect: BoardRect,
    margin: f32,
    phase: DragPhase,
    session: Option<DragSession<E>>,
}

impl<E: Copy> DragController<E> {
    /// Outer margin is half a cell, so a dragged piece's centre never leaves
    /// the board rectangle.
    pub fn new(rect: BoardRect) -> Self {
        Self {
            rect,
            margin: rect.cell_size / 2.0,
            phase: DragPhase::Idle,
            session: None,
        }
    }

    pub fn rect(&self) -> BoardRect {
        self.rect
    }

    pub fn set_rect(&mut self, rect: BoardRect) {
        self.rect = rect;
        self.margin = rect.cell_size / 2.0;
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&DragSession<E>> {
        self.session.as_ref()
    }

    /// `target` is the piece element under the pointer, `None` when the
    /// press landed on anything else.
    pub fn grab(&mut self, pointer: Pixel, target: Option<E>) -> DragEffect<E> {
        let Some(element) = target else {
            return DragEffect::Ignored;
        };
        if self.session.is_some() {
            return DragEffect::Ignored;
        }

        let origin = self.rect.square_at(pointer);
        if !origin.is_on_board() {
            return DragEffect::Ignored;
        }

        let at = self.element_position(pointer);
        self.session = Some(DragSession {
            origin,
            element,
            position: at,
        });
        self.phase = DragPhase::Grabbing;
        log::debug!("grabbed piece on {origin}");
        DragEffect::Float { element, at }
    }

    pub fn drag(&mut self, pointer: Pixel) -> DragEffect<E> {
        let at = self.element_position(pointer);
        let Some(session) = self.session.as_mut() else {
            return DragEffect::Ignored;
        };

        session.position = at;
        self.phase = DragPhase::Dragging;
        DragEffect::Reposition {
            element: session.element,
            at,
        }
    }

    /// Ends the session and applies the local move. The destination is not
    /// clamped: releasing outside the grid yields an out-of-range square,
    /// which the board rejects without changing.
    pub fn drop(&mut self, pointer: Pixel, board: &mut BoardState) -> DragEffect<E> {
        let Some(session) = self.session.take() else {
            return DragEffect::Ignored;
        };
        self.phase = DragPhase::Idle;

        let to = self.rect.square_at(pointer);
        let result = board.move_piece_local(session.origin, to);
        if let Err(err) = &result {
            log::warn!("drop from {} rejected: {err}", session.origin);
        }

        DragEffect::Dropped {
            element: session.element,
            from: session.origin,
            to,
            result,
        }
    }

    pub fn cancel(&mut self) -> DragEffect<E> {
        let Some(session) = self.session.take() else {
            return DragEffect::Ignored;
        };
        self.phase = DragPhase::Idle;
        DragEffect::Abandoned {
            element: session.element,
            origin: session.origin,
        }
    }

    fn element_position(&self, pointer: Pixel) -> Pixel {
        let half = Pixel::splat(self.rect.cell_size / 2.0);
        self.rect.clamp_element(pointer - half, self.margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CELL_SIZE;
    use crate::{Board, PieceSymbol};

    const LEFT: f32 = 40.0;
    const TOP: f32 = 60.0;

    fn controller() -> DragController<u32> {
        DragController::new(BoardRect::new(Pixel::new(LEFT, TOP), CELL_SIZE))
    }

    fn at(dx: f32, dy: f32) -> Pixel {
        Pixel::new(LEFT + dx, TOP + dy)
    }

    #[test]
    fn grab_and_drop_moves_piece_locally() {
        let mut drag = controller();
        let mut board = BoardState::new(Board::starting_position());
        let rook = board.piece_at(Square::new(0, 0)).unwrap();

        assert!(matches!(drag.grab(at(5.0, 5.0), Some(7)), DragEffect::Float { element: 7, .. }));
        assert_eq!(drag.session().unwrap().origin, Square::new(0, 0));
        assert_eq!(drag.phase(), DragPhase::Grabbing);

        drag.drag(at(120.0, 130.0));
        assert_eq!(drag.phase(), DragPhase::Dragging);

        let effect = drag.drop(at(204.0, 204.0), &mut board);
        assert_eq!(
            effect,
            DragEffect::Dropped {
                element: 7,
                from: Square::new(0, 0),
                to: Square::new(4, 4),
                result: Ok(()),
            }
        );
        assert_eq!(board.piece_at(Square::new(4, 4)), Some(rook));
        assert_eq!(board.piece_at(Square::new(0, 0)), Some(PieceSymbol::Empty));
        assert_eq!(drag.phase(), DragPhase::Idle);
        assert!(drag.session().is_none());
    }

    #[test]
    fn non_piece_target_is_ignored() {
        let mut drag = controller();
        assert_eq!(drag.grab(at(5.0, 5.0), None), DragEffect::Ignored);
        assert_eq!(drag.phase(), DragPhase::Idle);
    }

    #[test]
    fn move_and_drop_without_session_are_ignored() {
        let mut drag = controller();
        let mut board = BoardState::new(Board::starting_position());
        assert_eq!(drag.drag(at(10.0, 10.0)), DragEffect::Ignored);
        assert_eq!(drag.drop(at(10.0, 10.0), &mut board), DragEffect::Ignored);
        assert_eq!(board.get(), &Board::starting_position());
    }

    #[test]
    fn second_grab_does_not_replace_live_session() {
        let mut drag = controller();
        drag.grab(at(5.0, 5.0), Some(1));
        assert_eq!(drag.grab(at(55.0, 5.0), Some(2)), DragEffect::Ignored);
        assert_eq!(drag.session().unwrap().element, 1);
    }

    #[test]
    fn dragged_element_is_clamped_to_board() {
        let mut drag = controller();
        drag.grab(at(5.0, 5.0), Some(1));
        let effect = drag.drag(Pixel::new(-1000.0, 5000.0));
        let margin = CELL_SIZE / 2.0;
        assert_eq!(
            effect,
            DragEffect::Reposition {
                element: 1,
                at: Pixel::new(LEFT - margin, TOP + 7.0 * CELL_SIZE + margin),
            }
        );
    }

    #[test]
    fn drop_outside_board_leaves_grid_unchanged() {
        let mut drag = controller();
        let mut board = BoardState::new(Board::starting_position());
        drag.grab(at(5.0, 5.0), Some(1));
        let effect = drag.drop(at(-30.0, 100.0), &mut board);
        match effect {
            DragEffect::Dropped { to, result, .. } => {
                assert_eq!(to, Square::new(-1, 2));
                assert_eq!(result, Err(BoardError::OutOfRange(Square::new(-1, 2))));
            }
            other => panic!("unexpected effect {other:?}"),
        }
        assert_eq!(board.get(), &Board::starting_position());
        assert_eq!(drag.phase(), DragPhase::Idle);
    }

    #[test]
    fn cancel_returns_element_to_origin() {
        let mut drag = controller();
        drag.grab(at(60.0, 310.0), Some(3));
        assert_eq!(
            drag.cancel(),
            DragEffect::Abandoned {
                element: 3,
                origin: Square::new(1, 6),
            }
        );
        assert_eq!(drag.cancel(), DragEffect::Ignored);
    }
}
