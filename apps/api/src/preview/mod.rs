// Page-list consumers: one-page-at-a-time navigation, export mode, live sessions.

pub mod handlers;
pub mod navigator;
pub mod session;
pub mod store;

pub use navigator::NavAction;
pub use session::PreviewView;
pub use store::SessionStore;
