mod content;
pub mod message;
pub mod view;

pub use content::get_panel_content;
pub use message::{InboundMessage, OutboundMessage};
pub use view::PanelView;
