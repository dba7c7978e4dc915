pub mod relay;

pub use relay::ChatRelay;
