/// Marker trait for intents: keystrokes and store pushes that a view
/// reacts to.
pub trait Intent: Send + 'static {}
