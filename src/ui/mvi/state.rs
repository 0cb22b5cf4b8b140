/// Marker trait for view state.
///
/// State is replaced, never mutated in place, and compared with
/// `PartialEq` to tell whether an intent changed anything.
pub trait UiState: Clone + PartialEq + Default + Send + 'static {}
