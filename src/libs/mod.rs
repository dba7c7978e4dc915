pub mod panel_channels;
