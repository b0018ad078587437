//! Input Port - local input capture (canvas, text field, like checkboxes).

pub trait InputPort: Send {
    /// PNG data URL of the current canvas, if a canvas exists.
    fn painting_snapshot(&mut self) -> Option<String>;

    /// Erase any strokes left from a previous drawing task.
    fn clear_canvas(&mut self);

    /// Current contents of the free-text answer field.
    fn variant_text(&self) -> String;

    fn clear_variant_text(&mut self);

    /// Ids of the answers whose like checkbox is ticked.
    fn checked_likes(&self) -> Vec<i64>;
}
