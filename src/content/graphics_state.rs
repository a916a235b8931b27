//! Text-state tracking for content-stream replay.
//!
//! The model builder needs to know, for every operator, which font and size
//! are active and where the text matrix points when that operator executes.
//! [`replay`] computes that as a pure fold over the operator sequence,
//! producing one [`TextState`] snapshot per operator index, so downstream
//! passes can ask "what was active at operator i" without re-walking the
//! stream or sharing mutable state.

use crate::content::operators::Operator;
use crate::object::Object;

/// A 2D transformation matrix.
///
/// PDF uses matrices of the form:
/// ```text
/// [ a  b  0 ]
/// [ c  d  0 ]
/// [ e  f  1 ]
/// ```
///
/// Where (a,b,c,d) define scaling/rotation/skewing and (e,f) define
/// translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    /// Horizontal scaling component
    pub a: f32,
    /// Rotation/skew component
    pub b: f32,
    /// Rotation/skew component
    pub c: f32,
    /// Vertical scaling component
    pub d: f32,
    /// Horizontal translation
    pub e: f32,
    /// Vertical translation
    pub f: f32,
}

impl Matrix {
    /// Create an identity matrix.
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Create a translation matrix.
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: tx,
            f: ty,
        }
    }

    /// Multiply this matrix with another matrix.
    ///
    /// `a.multiply(&b)` represents applying `a` first, then `b`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// The text-relevant slice of the graphics state.
///
/// Tracks what the editor must know to decode and re-encode text: the
/// active font and size, the spacing parameters, and the text/line
/// matrices. Color, clipping, and path state are irrelevant to locating
/// text and are not tracked.
#[derive(Debug, Clone, PartialEq)]
pub struct TextState {
    /// Current font resource name (set by Tf), None before the first Tf
    pub font_name: Option<String>,
    /// Current font size (Tf)
    pub font_size: f32,
    /// Character spacing (Tc)
    pub char_space: f32,
    /// Word spacing (Tw)
    pub word_space: f32,
    /// Text leading (TL, TD)
    pub leading: f32,
    /// Text matrix (maps text space to user space)
    pub text_matrix: Matrix,
    /// Text line matrix (saved position at start of line)
    pub line_matrix: Matrix,
}

impl TextState {
    /// Create a new text state with PDF default values.
    pub fn new() -> Self {
        Self {
            font_name: None,
            font_size: 0.0,
            char_space: 0.0,
            word_space: 0.0,
            leading: 0.0,
            text_matrix: Matrix::identity(),
            line_matrix: Matrix::identity(),
        }
    }

    fn next_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).multiply(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }
}

impl Default for TextState {
    fn default() -> Self {
        Self::new()
    }
}

/// Stack of text states for q/Q save/restore.
#[derive(Debug, Clone)]
pub struct TextStateStack {
    stack: Vec<TextState>,
}

impl TextStateStack {
    /// Create a new stack with an initial default state.
    pub fn new() -> Self {
        Self {
            stack: vec![TextState::new()],
        }
    }

    /// Get a reference to the current state.
    pub fn current(&self) -> &TextState {
        self.stack.last().expect("Stack should never be empty")
    }

    /// Get a mutable reference to the current state.
    pub fn current_mut(&mut self) -> &mut TextState {
        self.stack.last_mut().expect("Stack should never be empty")
    }

    /// Save the current state (q operator).
    pub fn save(&mut self) {
        let state = self.current().clone();
        self.stack.push(state);
    }

    /// Restore the previous state (Q operator).
    ///
    /// A Q with nothing saved is ignored, matching viewer behavior.
    pub fn restore(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Apply one operator's effect on the text state.
    pub fn apply(&mut self, op: &Operator) {
        let num = |idx: usize| op.operands.get(idx).and_then(Object::as_number).unwrap_or(0.0) as f32;

        match op.name.as_str() {
            "q" => self.save(),
            "Q" => self.restore(),
            "BT" => {
                let state = self.current_mut();
                state.text_matrix = Matrix::identity();
                state.line_matrix = Matrix::identity();
            },
            "Tf" => {
                let name = op.operands.first().and_then(Object::as_name).map(str::to_string);
                let size = num(1);
                let state = self.current_mut();
                state.font_name = name;
                state.font_size = size;
            },
            "Td" => {
                let (tx, ty) = (num(0), num(1));
                self.current_mut().next_line(tx, ty);
            },
            "TD" => {
                let (tx, ty) = (num(0), num(1));
                let state = self.current_mut();
                state.leading = -ty;
                state.next_line(tx, ty);
            },
            "Tm" => {
                let state = self.current_mut();
                let m = Matrix {
                    a: num(0),
                    b: num(1),
                    c: num(2),
                    d: num(3),
                    e: num(4),
                    f: num(5),
                };
                state.text_matrix = m;
                state.line_matrix = m;
            },
            "T*" => {
                let state = self.current_mut();
                let leading = state.leading;
                state.next_line(0.0, -leading);
            },
            "TL" => self.current_mut().leading = num(0),
            "Tc" => self.current_mut().char_space = num(0),
            "Tw" => self.current_mut().word_space = num(0),
            "'" => {
                // Implicit T* before showing
                let state = self.current_mut();
                let leading = state.leading;
                state.next_line(0.0, -leading);
            },
            "\"" => {
                let (aw, ac) = (num(0), num(1));
                let state = self.current_mut();
                state.word_space = aw;
                state.char_space = ac;
                let leading = state.leading;
                state.next_line(0.0, -leading);
            },
            _ => {},
        }
    }
}

impl Default for TextStateStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Replay an operator sequence into one text-state snapshot per operator.
///
/// `snapshots[i]` is the state in effect when `ops[i]` executes (i.e. after
/// applying operators `0..i`).
pub fn replay(ops: &[Operator]) -> Vec<TextState> {
    let mut stack = TextStateStack::new();
    let mut snapshots = Vec::with_capacity(ops.len());

    for op in ops {
        snapshots.push(stack.current().clone());
        stack.apply(op);
    }

    snapshots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::tokenize;

    #[test]
    fn test_matrix_identity() {
        let m = Matrix::identity();
        assert_eq!(m.a, 1.0);
        assert_eq!(m.d, 1.0);
        assert_eq!(m.e, 0.0);
    }

    #[test]
    fn test_matrix_translation_compose() {
        let m = Matrix::translation(10.0, 20.0).multiply(&Matrix::translation(1.0, 2.0));
        assert_eq!(m.e, 11.0);
        assert_eq!(m.f, 22.0);
    }

    #[test]
    fn test_stack_save_restore() {
        let mut stack = TextStateStack::new();
        stack.current_mut().font_size = 14.0;
        stack.save();
        stack.current_mut().font_size = 16.0;
        stack.restore();
        assert_eq!(stack.current().font_size, 14.0);
        stack.restore(); // no effect, cannot pop last state
        assert_eq!(stack.current().font_size, 14.0);
    }

    #[test]
    fn test_replay_font_selection() {
        let ops = tokenize(b"BT /F1 12 Tf (a) Tj /F2 8 Tf (b) Tj ET").unwrap();
        let states = replay(&ops);

        // Snapshot at the first Tj: F1 active
        assert_eq!(states[2].font_name.as_deref(), Some("F1"));
        assert_eq!(states[2].font_size, 12.0);
        // Snapshot at the second Tj: F2 active
        assert_eq!(states[4].font_name.as_deref(), Some("F2"));
        assert_eq!(states[4].font_size, 8.0);
    }

    #[test]
    fn test_replay_q_restores_font() {
        let ops = tokenize(b"/F1 10 Tf q /F2 20 Tf (x) Tj Q (y) Tj").unwrap();
        let states = replay(&ops);
        // Inside q..Q: F2
        assert_eq!(states[3].font_name.as_deref(), Some("F2"));
        // After Q: back to F1
        assert_eq!(states[5].font_name.as_deref(), Some("F1"));
    }

    #[test]
    fn test_replay_text_positioning() {
        let ops = tokenize(b"BT 10 20 Td (a) Tj 5 0 Td (b) Tj ET").unwrap();
        let states = replay(&ops);
        assert_eq!(states[2].text_matrix.e, 10.0);
        assert_eq!(states[2].text_matrix.f, 20.0);
        assert_eq!(states[4].text_matrix.e, 15.0);
        assert_eq!(states[4].text_matrix.f, 20.0);
    }

    #[test]
    fn test_replay_leading_and_t_star() {
        let ops = tokenize(b"BT 14 TL 0 100 Td T* (a) Tj ET").unwrap();
        let states = replay(&ops);
        // After T*: y dropped by the leading
        assert_eq!(states[4].text_matrix.f, 86.0);
    }

    #[test]
    fn test_quote_advances_line() {
        let ops = tokenize(b"BT 12 TL 0 50 Td (a) ' (b) ' ET").unwrap();
        let states = replay(&ops);
        // Second ' executes one line below the first
        assert_eq!(states[4].text_matrix.f, 38.0);
    }
}
