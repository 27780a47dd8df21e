use crate::UiState;

/// Something that displays the controller's state.
///
/// `render` is called after every state change with the complete state.
pub trait View {
    fn render(&mut self, state: &UiState);
}

impl<V: View + ?Sized> View for &mut V {
    fn render(&mut self, state: &UiState) {
        (**self).render(state);
    }
}
